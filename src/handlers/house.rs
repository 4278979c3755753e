//! House handlers: list, read, create.

use crate::address::random_address;
use crate::error::{AppError, BodyError};
use crate::extractors::JsonBody;
use crate::ident::new_id;
use crate::model::{House, HouseFilter, HouseInclude, HouseView, NewHouse};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

const NOT_FOUND: &str = "House not found";

/// GET /houses — every house with its owner and builder.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<HouseView>>, AppError> {
    let houses = state
        .houses
        .find_many(HouseFilter::default(), HouseInclude::ALL)
        .await
        .map_err(AppError::internal("Failed to list houses"))?;
    Ok(Json(houses))
}

/// GET /house/:id
pub async fn read(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<HouseView>, AppError> {
    let house = state
        .houses
        .find_by_id(&id, HouseInclude::ALL)
        .await
        .map_err(AppError::not_found(NOT_FOUND))?
        .ok_or(AppError::NotFound(NOT_FOUND))?;
    Ok(Json(house))
}

/// POST /house — a missing address (or a missing body) gets a generated address.
pub async fn create(
    State(state): State<AppState>,
    body: Result<JsonBody<NewHouse>, BodyError>,
) -> Result<(StatusCode, Json<House>), AppError> {
    let JsonBody(body) = body.map_err(AppError::internal("Failed to create house"))?;
    let house = House {
        id: new_id(),
        address: body.address.unwrap_or_else(random_address),
        owner_id: body.owner_id,
        built_by_id: body.built_by_id,
    };
    let created = state
        .houses
        .create(house)
        .await
        .map_err(AppError::internal("Failed to create house"))?;
    tracing::info!(id = %created.id, address = %created.address, "house created");
    Ok((StatusCode::CREATED, Json(created)))
}
