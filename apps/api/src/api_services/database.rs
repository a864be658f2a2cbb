use std::time::Duration;

use rolegate_core::AppError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

const MAX_CONNECTIONS: u32 = 10;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the pool and applies pending migrations from the infrastructure crate.
pub async fn connect_and_migrate(database_url: &str) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    let migrator = sqlx::migrate!("../../crates/infrastructure/migrations");
    migrator
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;
    info!(migrations = migrator.iter().count(), "database schema is current");

    Ok(pool)
}
