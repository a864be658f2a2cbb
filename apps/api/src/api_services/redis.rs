use redis::aio::ConnectionManager;
use rolegate_core::AppError;

pub(super) async fn connect_redis(redis_url: &str) -> Result<ConnectionManager, AppError> {
    let client = redis::Client::open(redis_url)
        .map_err(|error| AppError::Validation(format!("invalid REDIS_URL: {error}")))?;

    ConnectionManager::new(client)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))
}
