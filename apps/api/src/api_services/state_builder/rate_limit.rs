use std::sync::Arc;

use redis::aio::ConnectionManager;
use rolegate_application::{RateLimitRepository, RateLimitService};
use rolegate_core::{AppError, AppResult};
use rolegate_infrastructure::{PostgresRateLimitRepository, RedisRateLimitRepository};
use sqlx::PgPool;

use crate::api_config::{ApiConfig, RateLimitStoreConfig};

pub(super) fn build_rate_limit_service(
    pool: &PgPool,
    config: &ApiConfig,
    redis_connection: Option<ConnectionManager>,
) -> AppResult<RateLimitService> {
    let rate_limit_repository: Arc<dyn RateLimitRepository> = match config.rate_limit_store {
        RateLimitStoreConfig::Postgres => Arc::new(PostgresRateLimitRepository::new(pool.clone())),
        RateLimitStoreConfig::Redis => {
            let redis_connection = redis_connection.ok_or_else(|| {
                AppError::Validation("REDIS_URL is required when RATE_LIMIT_STORE=redis".to_owned())
            })?;
            Arc::new(RedisRateLimitRepository::new(
                redis_connection,
                "rolegate:rate_limit",
            ))
        }
    };

    Ok(RateLimitService::new(rate_limit_repository))
}
