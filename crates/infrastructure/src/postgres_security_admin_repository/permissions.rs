use super::*;

impl PostgresSecurityAdminRepository {
    pub(super) async fn list_permissions_impl(&self) -> AppResult<Vec<PermissionDefinition>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, name, description, is_system
            FROM rbac_permissions
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(internal("list permissions"))?;

        Ok(rows.into_iter().map(PermissionDefinition::from).collect())
    }

    pub(super) async fn save_permission_impl(
        &self,
        input: SavePermissionInput,
    ) -> AppResult<PermissionDefinition> {
        let row = sqlx::query_as::<_, PermissionRow>(
            r#"
            INSERT INTO rbac_permissions (name, description, is_system)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO UPDATE
            SET
                description = EXCLUDED.description,
                is_system = EXCLUDED.is_system,
                updated_at = now()
            RETURNING id, name, description, is_system
            "#,
        )
        .bind(input.name.as_str())
        .bind(input.description.trim())
        .bind(input.is_system)
        .fetch_one(&self.pool)
        .await
        .map_err(internal("save permission"))?;

        Ok(PermissionDefinition::from(row))
    }
}
