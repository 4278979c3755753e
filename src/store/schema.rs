//! Table bootstrap for the `users` and `houses` tables.

use crate::error::StoreError;
use sqlx::PgPool;

const DDL: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        age INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS houses (
        id TEXT PRIMARY KEY,
        address TEXT NOT NULL,
        owner_id TEXT REFERENCES users(id) ON DELETE SET NULL,
        built_by_id TEXT REFERENCES users(id) ON DELETE SET NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS users_age_idx ON users (age)",
    "CREATE INDEX IF NOT EXISTS houses_owner_id_idx ON houses (owner_id)",
    "CREATE INDEX IF NOT EXISTS houses_built_by_id_idx ON houses (built_by_id)",
];

/// Create both tables and their indexes if they do not exist. Safe to run on every start.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    for ddl in DDL {
        tracing::debug!(sql = %ddl.trim(), "ddl");
        sqlx::query(ddl).execute(pool).await.map_err(StoreError::from_sqlx)?;
    }
    tracing::info!("schema ready");
    Ok(())
}
