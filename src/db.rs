use anyhow::{Context, Result, anyhow};
use diesel::{Connection, PgConnection};
use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::Pool;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness};

use crate::aliases::DbPool;

pub async fn build_pool(url: &str) -> Result<DbPool> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(url);
    let pool = Pool::builder()
        .build(manager)
        .await
        .context("Failed to build DB pool")?;
    Ok(pool)
}

/// Runs pending migrations on a dedicated blocking connection and returns how
/// many were applied.
pub async fn run_migrations_blocking(migrations: EmbeddedMigrations, url: &str) -> Result<usize> {
    let url = url.to_owned();
    tokio::task::spawn_blocking(move || {
        let mut conn = PgConnection::establish(&url).context("Failed to connect for migrations")?;
        let versions = conn
            .run_pending_migrations(migrations)
            .map_err(|err| anyhow!("Failed to run migrations: {err}"))?;
        Ok::<usize, anyhow::Error>(versions.len())
    })
    .await
    .context("Migration task panicked")?
}
