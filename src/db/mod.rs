//! PostgreSQL pool and schema
//!
//! The server and the Postgres store tests both open their pool here and
//! apply the embedded `migrations/` before handing the pool to the stores.

use sqlx::migrate::MigrateError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database connection failed: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("Schema migration failed: {0}")]
    Migrate(#[from] MigrateError),

    #[error("Database unreachable: {0}")]
    Unreachable(#[source] sqlx::Error),
}

/// Open a pool of at most `max_connections` connections to `database_url`
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, DbError> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
        .map_err(DbError::Connect)
}

/// Create or upgrade the `users` and `contracts` tables
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Schema is up to date");
    Ok(())
}

/// `SELECT 1` round trip backing `GET /health`
pub async fn check_health(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(DbError::Unreachable)?;
    Ok(())
}
