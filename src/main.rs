//! Server entrypoint: reads configuration, connects the store, mounts all routes.

use homestead::{app, ensure_schema, AppState, MemoryStore, PgStore, ServerConfig};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("homestead=info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let state = match config.database_url.as_deref() {
        Some(url) => {
            let store = PgStore::connect(url, config.max_connections).await?;
            ensure_schema(store.pool()).await?;
            AppState::new(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store; data is lost on exit");
            AppState::new(Arc::new(MemoryStore::new()))
        }
    };

    let listener = TcpListener::bind(config.listen_target()).await?;
    tracing::info!("Server is running on {}", listener.local_addr()?);
    axum::serve(listener, app(state, config.body_limit_bytes)).await?;
    Ok(())
}
