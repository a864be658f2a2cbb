use super::*;

impl PostgresSecurityAdminRepository {
    pub(super) async fn assign_role_to_user_impl(
        &self,
        user_id: UserId,
        role_name: &str,
    ) -> AppResult<()> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(internal("begin transaction"))?;

        let role_id = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            SELECT id
            FROM rbac_roles
            WHERE name = $1
            "#,
        )
        .bind(role_name)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(internal("resolve role"))?
        .ok_or_else(|| AppError::NotFound(format!("role '{role_name}' was not found")))?;

        let user_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)",
        )
        .bind(user_id.as_uuid())
        .fetch_one(&mut *transaction)
        .await
        .map_err(internal("resolve user"))?;

        if !user_exists {
            return Err(AppError::NotFound(format!("user '{user_id}' was not found")));
        }

        sqlx::query(
            r#"
            INSERT INTO rbac_user_roles (user_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, role_id) DO NOTHING
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_id)
        .execute(&mut *transaction)
        .await
        .map_err(internal("assign role"))?;

        transaction
            .commit()
            .await
            .map_err(internal("commit transaction"))?;

        Ok(())
    }

    pub(super) async fn remove_role_from_user_impl(
        &self,
        user_id: UserId,
        role_name: &str,
    ) -> AppResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM rbac_user_roles AS user_roles
            USING rbac_roles AS roles
            WHERE user_roles.role_id = roles.id
                AND user_roles.user_id = $1
                AND roles.name = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_name)
        .execute(&self.pool)
        .await
        .map_err(internal("remove role assignment"))?
        .rows_affected();

        Ok(rows_affected > 0)
    }
}
