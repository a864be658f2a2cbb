//! Redis-backed rate limit counters. Keys expire with their window.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use redis::Script;
use redis::aio::ConnectionManager;

use rolegate_application::{AttemptWindow, RateLimitRepository};
use rolegate_core::{AppError, AppResult};

// Returns the attempt count and the remaining window in seconds.
const RECORD_ATTEMPT_SCRIPT: &str = r#"
local count = redis.call('INCR', KEYS[1])
if count == 1 then
  redis.call('EXPIRE', KEYS[1], tonumber(ARGV[1]))
end
local ttl = redis.call('TTL', KEYS[1])
if ttl < 0 then
  redis.call('EXPIRE', KEYS[1], tonumber(ARGV[1]))
  ttl = tonumber(ARGV[1])
end
return {count, ttl}
"#;

/// Redis implementation of the rate limit repository port.
#[derive(Clone)]
pub struct RedisRateLimitRepository {
    connection: ConnectionManager,
    key_prefix: String,
}

impl RedisRateLimitRepository {
    /// Creates a repository over a shared connection manager.
    #[must_use]
    pub fn new(connection: ConnectionManager, key_prefix: impl Into<String>) -> Self {
        Self {
            connection,
            key_prefix: key_prefix.into(),
        }
    }

    fn redis_key(&self, key: &str) -> String {
        format!("{}:{key}", self.key_prefix)
    }
}

#[async_trait]
impl RateLimitRepository for RedisRateLimitRepository {
    async fn record_attempt(&self, key: &str, window_seconds: i64) -> AppResult<AttemptWindow> {
        if window_seconds <= 0 {
            return Err(AppError::Validation(
                "rate limit window must be greater than zero".to_owned(),
            ));
        }

        let mut connection = self.connection.clone();
        let (attempts, remaining_seconds): (i64, i64) = Script::new(RECORD_ATTEMPT_SCRIPT)
            .key(self.redis_key(key))
            .arg(window_seconds)
            .invoke_async(&mut connection)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to record rate limit attempt: {error}"))
            })?;

        let attempts = i32::try_from(attempts)
            .map_err(|error| AppError::Internal(format!("invalid attempt count: {error}")))?;
        let elapsed = window_seconds - remaining_seconds;
        let window_started_epoch = Utc::now().timestamp() - elapsed;
        let started_at = Utc
            .timestamp_opt(window_started_epoch, 0)
            .single()
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "invalid rate limit window start: {window_started_epoch}"
                ))
            })?;

        Ok(AttemptWindow {
            attempts,
            started_at,
        })
    }

    async fn cleanup_expired(&self, _cutoff: DateTime<Utc>) -> AppResult<u64> {
        Ok(0)
    }
}
