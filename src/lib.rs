//! Homestead: REST backend for users and the houses they own or build.

pub mod address;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod ident;
pub mod model;
pub mod routes;
pub mod state;
pub mod store;

pub use config::ServerConfig;
pub use error::{AppError, ConfigError, StoreError};
pub use routes::{api_routes, app, common_routes};
pub use state::AppState;
pub use store::{ensure_schema, HouseRepository, MemoryStore, PgStore, UserRepository};
