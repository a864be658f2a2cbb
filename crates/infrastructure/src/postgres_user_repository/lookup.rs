use super::*;

impl PostgresUserRepository {
    pub(super) async fn find_by_email_impl(&self, email: &str) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, verification_code_hash
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user by email: {error}")))?;

        Ok(row.map(UserRecord::from))
    }

    pub(super) async fn find_by_id_impl(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, verification_code_hash
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user by id: {error}")))?;

        Ok(row.map(UserRecord::from))
    }
}
