//! Liveness and readiness checks.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
struct StatusBody {
    status: &'static str,
    #[serde(flatten)]
    detail: StatusDetail,
}

#[derive(Serialize)]
#[serde(untagged)]
enum StatusDetail {
    Build { name: &'static str, version: &'static str },
    Store { backend: &'static str, database: &'static str },
}

/// GET /health — the process is up; reports the running build.
async fn health() -> Json<StatusBody> {
    Json(StatusBody {
        status: "ok",
        detail: StatusDetail::Build {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
        },
    })
}

/// GET /ready — 503 while the store does not answer.
async fn ready(State(state): State<AppState>) -> (StatusCode, Json<StatusBody>) {
    let backend = state.store.backend();
    let (code, status, database) = match state.store.ping().await {
        Ok(()) => (StatusCode::OK, "ok", "ok"),
        Err(e) => {
            tracing::warn!(error = %e, backend, "readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unavailable")
        }
    };
    (code, Json(StatusBody { status, detail: StatusDetail::Store { backend, database } }))
}

pub fn common_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
}
