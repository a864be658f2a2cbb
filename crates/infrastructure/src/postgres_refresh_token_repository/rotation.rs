use super::*;

impl PostgresRefreshTokenRepository {
    pub(super) async fn swap_impl(
        &self,
        user_id: UserId,
        old_hash: &str,
        new_hash: &str,
    ) -> AppResult<bool> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let removed = sqlx::query_scalar::<_, String>(
            r#"
            DELETE FROM user_refresh_tokens
            WHERE user_id = $1 AND token_hash = $2
            RETURNING token_hash
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(old_hash)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to rotate refresh token: {error}")))?;

        if removed.is_none() {
            transaction.rollback().await.map_err(|error| {
                AppError::Internal(format!("failed to roll back transaction: {error}"))
            })?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO user_refresh_tokens (token_hash, user_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(new_hash)
        .bind(user_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to store refresh token: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(true)
    }

    pub(super) async fn replace_all_impl(&self, user_id: UserId, token_hash: &str) -> AppResult<()> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        sqlx::query(
            r#"
            DELETE FROM user_refresh_tokens
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to revoke refresh tokens: {error}"))
        })?;

        sqlx::query(
            r#"
            INSERT INTO user_refresh_tokens (token_hash, user_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(token_hash)
        .bind(user_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to store refresh token: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(())
    }
}
