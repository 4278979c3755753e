//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {var}: '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Failures raised by a store implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("constraint violated: {0}")]
    Constraint(String),
    #[error("database: {0}")]
    Database(#[source] sqlx::Error),
}

impl StoreError {
    /// Folds sqlx's "no row" and constraint failures into the matching variants.
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(ref db) if db.constraint().is_some() => {
                StoreError::Constraint(db.message().to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

/// A request body that could not be read or decoded.
#[derive(Error, Debug)]
pub enum BodyError {
    #[error("reading body: {0}")]
    Read(#[from] axum::extract::rejection::BytesRejection),
    #[error("decoding body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl IntoResponse for BodyError {
    fn into_response(self) -> Response {
        AppError::internal("Invalid request body")(self).into_response()
    }
}

/// Why a request failed. Logged server side, never sent to the client.
#[derive(Error, Debug)]
pub enum Cause {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Body(#[from] BodyError),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{message}")]
    Internal {
        message: &'static str,
        #[source]
        source: Cause,
    },
}

impl AppError {
    /// Lookup routes answer 404 for a missing row, a failing store call and an undecodable body alike.
    pub fn not_found<E: Into<Cause>>(message: &'static str) -> impl FnOnce(E) -> AppError {
        move |e| {
            let cause = e.into();
            if !matches!(cause, Cause::Store(StoreError::NotFound)) {
                tracing::warn!(error = %cause, "lookup failed");
            }
            AppError::NotFound(message)
        }
    }

    pub fn internal<E: Into<Cause>>(message: &'static str) -> impl FnOnce(E) -> AppError {
        move |e| AppError::Internal { message, source: e.into() }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Internal { source, .. } => {
                tracing::error!(error = %source, "{}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_error_hides_the_cause() {
        let err = AppError::internal("Failed to create user")(StoreError::Constraint(
            "duplicate key value violates unique constraint \"users_pkey\"".into(),
        ));
        assert_eq!(err.to_string(), "Failed to create user");
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn lookup_failure_maps_to_not_found() {
        let err = AppError::not_found("User not found")(StoreError::Database(sqlx::Error::PoolTimedOut));
        assert!(matches!(err, AppError::NotFound("User not found")));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn undecodable_body_is_internal() {
        let decode = serde_json::from_str::<Vec<i32>>("{}").unwrap_err();
        let err = AppError::internal("Failed to create users")(BodyError::from(decode));
        assert_eq!(err.to_string(), "Failed to create users");
        assert!(matches!(err, AppError::Internal { source: Cause::Body(BodyError::Decode(_)), .. }));
    }
}
