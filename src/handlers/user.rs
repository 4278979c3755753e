//! User handlers: list, read, create, bulk create, update age, delete.

use crate::error::{AppError, BodyError};
use crate::extractors::JsonBody;
use crate::ident::new_id;
use crate::model::{BatchCount, NewUser, User, UserChanges, UserFilter, UserInclude, UserView};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

/// Users listed by `GET /` are those strictly older than this.
pub const LIST_MIN_AGE_EXCLUSIVE: i32 = 25;

const NOT_FOUND: &str = "User not found";

/// GET / — users older than 25, without relations.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    let filter = UserFilter { older_than: Some(LIST_MIN_AGE_EXCLUSIVE) };
    let users = state
        .users
        .find_many(filter)
        .await
        .map_err(AppError::internal("Failed to list users"))?;
    Ok(Json(users))
}

/// GET /:id — one user with the houses they own and built.
pub async fn read(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<UserView>, AppError> {
    let user = state
        .users
        .find_by_id(&id, UserInclude::ALL)
        .await
        .map_err(AppError::not_found(NOT_FOUND))?
        .ok_or(AppError::NotFound(NOT_FOUND))?;
    Ok(Json(user))
}

/// POST /user
pub async fn create(
    State(state): State<AppState>,
    body: Result<JsonBody<NewUser>, BodyError>,
) -> Result<Json<User>, AppError> {
    let JsonBody(body) = body.map_err(AppError::internal("Failed to create user"))?;
    let user = body.with_id(new_id());
    let created = state
        .users
        .create(user)
        .await
        .map_err(AppError::internal("Failed to create user"))?;
    tracing::info!(id = %created.id, "user created");
    Ok(Json(created))
}

/// POST /users — every element gets its own id; the batch is inserted all-or-nothing.
pub async fn bulk_create(
    State(state): State<AppState>,
    body: Result<JsonBody<Vec<NewUser>>, BodyError>,
) -> Result<(StatusCode, Json<BatchCount>), AppError> {
    let JsonBody(body) = body.map_err(AppError::internal("Failed to create users"))?;
    let users: Vec<User> = body.into_iter().map(|u| u.with_id(new_id())).collect();
    let count = state
        .users
        .create_many(users)
        .await
        .map_err(AppError::internal("Failed to create users"))?;
    tracing::info!(count = count.count, "users created");
    Ok((StatusCode::CREATED, Json(count)))
}

/// PUT /:id — only `age` is applied; a missing body changes nothing.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<JsonBody<UserChanges>, BodyError>,
) -> Result<Json<User>, AppError> {
    let JsonBody(changes) = body.map_err(AppError::not_found(NOT_FOUND))?;
    let user = state
        .users
        .update(&id, changes)
        .await
        .map_err(AppError::not_found(NOT_FOUND))?
        .ok_or(AppError::NotFound(NOT_FOUND))?;
    Ok(Json(user))
}

/// DELETE /:id — responds with the removed user.
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<User>, AppError> {
    let user = state
        .users
        .delete(&id)
        .await
        .map_err(AppError::not_found(NOT_FOUND))?
        .ok_or(AppError::NotFound(NOT_FOUND))?;
    tracing::info!(id = %user.id, "user deleted");
    Ok(Json(user))
}
