//! PostgreSQL backends for recipe and credential storage.
//!
//! Recipes live in a `recipes` table with array columns for tags,
//! ingredients, and instructions; credentials in a `users` table keyed by
//! username. The schema is ensured at startup so a fresh database works
//! without a separate migration step.

pub mod credentials;
pub mod storage;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use ladle_storage::StorageError;

pub use credentials::PostgresCredentialStorage;
pub use storage::PostgresStorage;

/// Connects a pool to the given database URL.
///
/// # Errors
///
/// Returns `StorageError::ConnectionError` if the database is unreachable.
pub async fn connect(url: &str, pool_size: u32) -> Result<PgPool, StorageError> {
    PgPoolOptions::new()
        .max_connections(pool_size)
        .connect(url)
        .await
        .map_err(|e| StorageError::connection_error(e.to_string()))
}

/// Creates the `recipes` and `users` tables when they do not exist yet.
///
/// # Errors
///
/// Returns `StorageError` if the DDL round trip fails.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StorageError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS recipes (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            tags TEXT[] NOT NULL DEFAULT '{}',
            ingredients TEXT[] NOT NULL DEFAULT '{}',
            instructions TEXT[] NOT NULL DEFAULT '{}',
            published_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(storage::map_sqlx_error)?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            username TEXT PRIMARY KEY,
            password_digest TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(storage::map_sqlx_error)?;

    tracing::debug!("postgres schema ensured");
    Ok(())
}
