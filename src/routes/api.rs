//! User and house routes.
//! `/:id` matches any single segment, so it is registered after every fixed path.

use crate::handlers::{house, user};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(user::list))
        .route("/houses", get(house::list))
        .route("/house/:id", get(house::read))
        .route("/house", post(house::create))
        .route("/user", post(user::create))
        .route("/users", post(user::bulk_create))
        .route("/:id", get(user::read).put(user::update).delete(user::delete))
}
