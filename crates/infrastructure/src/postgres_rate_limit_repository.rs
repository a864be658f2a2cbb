//! Fixed-window attempt counters stored in `auth_rate_limits`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use rolegate_application::{AttemptWindow, RateLimitRepository};
use rolegate_core::{AppError, AppResult};

/// PostgreSQL implementation of the rate limit repository port.
#[derive(Clone)]
pub struct PostgresRateLimitRepository {
    pool: PgPool,
}

impl PostgresRateLimitRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AttemptRow {
    attempt_count: i32,
    window_started_at: DateTime<Utc>,
}

#[async_trait]
impl RateLimitRepository for PostgresRateLimitRepository {
    async fn record_attempt(&self, key: &str, window_seconds: i64) -> AppResult<AttemptWindow> {
        if window_seconds <= 0 {
            return Err(AppError::Validation(
                "rate limit window must be greater than zero".to_owned(),
            ));
        }

        // An expired window restarts at one attempt.
        let row = sqlx::query_as::<_, AttemptRow>(
            r#"
            WITH window_state AS (
                SELECT now() - make_interval(secs => $2::float8) AS cutoff
            )
            INSERT INTO auth_rate_limits AS limits (key, window_started_at, attempt_count)
            VALUES ($1, now(), 1)
            ON CONFLICT (key) DO UPDATE
            SET
                attempt_count = CASE
                    WHEN limits.window_started_at < (SELECT cutoff FROM window_state) THEN 1
                    ELSE limits.attempt_count + 1
                END,
                window_started_at = CASE
                    WHEN limits.window_started_at < (SELECT cutoff FROM window_state) THEN now()
                    ELSE limits.window_started_at
                END
            RETURNING attempt_count, window_started_at
            "#,
        )
        .bind(key)
        .bind(window_seconds as f64)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to record rate limit attempt: {error}"))
        })?;

        Ok(AttemptWindow {
            attempts: row.attempt_count,
            started_at: row.window_started_at,
        })
    }

    async fn cleanup_expired(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM auth_rate_limits
            WHERE window_started_at < $1
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to remove expired rate limits: {error}"))
        })?
        .rows_affected();

        Ok(rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use rolegate_application::RateLimitRepository;
    use sqlx::migrate::Migrator;
    use sqlx::postgres::PgPoolOptions;

    use super::PostgresRateLimitRepository;

    static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

    #[tokio::test]
    async fn attempts_accumulate_within_one_window() {
        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            return;
        };
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(database_url.as_str())
            .await
            .unwrap_or_else(|error| panic!("failed to connect to DATABASE_URL: {error}"));
        if let Err(error) = MIGRATOR.run(&pool).await {
            panic!("failed to run migrations for rate limit tests: {error}");
        }
        let repository = PostgresRateLimitRepository::new(pool);
        let key = format!("test:{}", uuid::Uuid::new_v4());

        let first = repository.record_attempt(&key, 60).await;
        let second = repository.record_attempt(&key, 60).await;

        assert_eq!(first.map(|info| info.attempts).ok(), Some(1));
        assert_eq!(second.map(|info| info.attempts).ok(), Some(2));
        assert!(repository.record_attempt(&key, 0).await.is_err());
    }
}
