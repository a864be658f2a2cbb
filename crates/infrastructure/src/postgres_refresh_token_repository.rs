//! PostgreSQL-backed refresh token set.
//!
//! One row per stored token hash in `user_refresh_tokens`.

use async_trait::async_trait;
use sqlx::PgPool;

use rolegate_application::RefreshTokenRepository;
use rolegate_core::{AppError, AppResult};
use rolegate_domain::UserId;

mod rotation;


/// PostgreSQL implementation of the refresh token repository port.
#[derive(Clone)]
pub struct PostgresRefreshTokenRepository {
    pool: PgPool,
}

impl PostgresRefreshTokenRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepository for PostgresRefreshTokenRepository {
    async fn find_owner(&self, token_hash: &str) -> AppResult<Option<UserId>> {
        let owner = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            SELECT user_id
            FROM user_refresh_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find refresh token owner: {error}"))
        })?;

        Ok(owner.map(UserId::from_uuid))
    }

    async fn add(&self, user_id: UserId, token_hash: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_refresh_tokens (token_hash, user_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(token_hash)
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to store refresh token: {error}")))?;

        Ok(())
    }

    async fn swap(&self, user_id: UserId, old_hash: &str, new_hash: &str) -> AppResult<bool> {
        self.swap_impl(user_id, old_hash, new_hash).await
    }

    async fn remove(&self, user_id: UserId, token_hash: &str) -> AppResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM user_refresh_tokens
            WHERE user_id = $1 AND token_hash = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(token_hash)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to remove refresh token: {error}")))?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn revoke_all(&self, user_id: UserId) -> AppResult<u64> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM user_refresh_tokens
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to revoke refresh tokens: {error}"))
        })?
        .rows_affected();

        Ok(rows_affected)
    }

    async fn replace_all(&self, user_id: UserId, token_hash: &str) -> AppResult<()> {
        self.replace_all_impl(user_id, token_hash).await
    }

    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT token_hash
            FROM user_refresh_tokens
            WHERE user_id = $1
            ORDER BY token_hash
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list refresh tokens: {error}")))
    }
}
