pub mod admins;
pub mod models;
pub mod plants;
pub mod query;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use crate::config::DatabaseConfig;

/// Build the process-wide connection pool.
///
/// The pool connects lazily: a store that is unreachable at startup leaves
/// the process running in degraded mode (surfaced by `/health`) instead of
/// aborting it. Individual acquisitions are bounded by the configured
/// timeout so no request blocks indefinitely.
pub fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect_lazy(&config.url)
}

/// Apply pending migrations from `./migrations`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Ping the store; used by the liveness endpoint.
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
