use super::*;

impl PostgresUserRepository {
    pub(super) async fn create_with_default_role_impl(
        &self,
        email: &str,
    ) -> AppResult<UserRecord> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email)
            VALUES ($1, LOWER($2))
            RETURNING id, email, verification_code_hash
            "#,
        )
        .bind(UserId::new().as_uuid())
        .bind(email)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| email_conflict_or_internal(error, "create user"))?;

        let assigned = sqlx::query(
            r#"
            INSERT INTO rbac_user_roles (user_id, role_id)
            SELECT $1, id
            FROM rbac_roles
            WHERE name = $2
            "#,
        )
        .bind(row.id)
        .bind(DEFAULT_ROLE)
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to assign default role: {error}")))?
        .rows_affected();

        if assigned == 0 {
            return Err(AppError::Internal(format!(
                "role '{DEFAULT_ROLE}' is missing; run the role bootstrap first"
            )));
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(UserRecord::from(row))
    }

    pub(super) async fn set_verification_code_hash_impl(
        &self,
        user_id: UserId,
        code_hash: &str,
    ) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE users
            SET verification_code_hash = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(code_hash)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to store login code hash: {error}"))
        })?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!("user '{user_id}' does not exist")));
        }

        Ok(())
    }

    pub(super) async fn consume_verification_code_impl(
        &self,
        user_id: UserId,
        expected_hash: &str,
        replacement_hash: &str,
    ) -> AppResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE users
            SET verification_code_hash = $3, updated_at = now()
            WHERE id = $1 AND verification_code_hash = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(expected_hash)
        .bind(replacement_hash)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to consume login code: {error}")))?
        .rows_affected();

        Ok(rows_affected > 0)
    }
}
