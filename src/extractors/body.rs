//! Lenient JSON body extractor.
//!
//! A request without a JSON content type, or with an empty body, decodes as `{}`.
//! Handlers take `Result<JsonBody<T>, BodyError>` and pick the status a bad body maps to.

use crate::error::BodyError;
use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Clone, Debug)]
pub struct JsonBody<T>(pub T);

fn has_json_content_type(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| {
            let mime = mime.trim();
            mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

/// Decodes `bytes` as JSON, treating a blank body as an empty object.
pub fn decode<T: DeserializeOwned>(bytes: &[u8], is_json: bool) -> Result<T, BodyError> {
    let value = if is_json && !bytes.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_slice(bytes)?
    } else {
        Value::Object(serde_json::Map::new())
    };
    Ok(serde_json::from_value(value)?)
}

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = BodyError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = has_json_content_type(&req);
        let bytes = Bytes::from_request(req, state).await?;
        decode(&bytes, is_json).map(JsonBody)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewHouse, NewUser, UserChanges};

    #[test]
    fn blank_body_decodes_as_empty_object() {
        let house: NewHouse = decode(b"  \n", true).unwrap();
        assert_eq!(house, NewHouse::default());
        let changes: UserChanges = decode(b"", true).unwrap();
        assert_eq!(changes, UserChanges::default());
    }

    #[test]
    fn non_json_content_is_ignored() {
        let changes: UserChanges = decode(br#"{"age": 40}"#, false).unwrap();
        assert_eq!(changes.age, None);
    }

    #[test]
    fn missing_required_field_is_a_decode_error() {
        let err = decode::<NewUser>(br#"{"firstName": "A"}"#, true).unwrap_err();
        assert!(matches!(err, BodyError::Decode(_)));
    }

    #[test]
    fn object_where_list_expected_is_a_decode_error() {
        assert!(decode::<Vec<NewUser>>(b"{}", true).is_err());
    }
}
