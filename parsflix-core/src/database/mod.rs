//! Persistence: repository ports, PostgreSQL adapters, and pool bootstrap.

pub mod ports;
pub mod postgres;
mod store;

pub use store::CatalogStore;

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::error::{CatalogError, Result};

/// Embedded migrations; applied on startup and by `db migrate`.
pub static MIGRATOR: sqlx::migrate::Migrator =
    sqlx::migrate!("./migrations");

/// Connect a pool with the crate's standard options.
pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(url)
        .await
        .map_err(|err| {
            CatalogError::Database(format!("failed to connect: {err}"))
        })?;
    Ok(pool)
}

/// Round-trip a trivial query, for connectivity checks.
pub async fn ping(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(|err| CatalogError::Database(format!("ping failed: {err}")))?;
    Ok(())
}

/// Apply pending migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    MIGRATOR.run(pool).await.map_err(|err| {
        CatalogError::Database(format!("migration failed: {err}"))
    })
}
