use std::collections::BTreeSet;

use super::*;

impl PostgresSecurityAdminRepository {
    pub(super) async fn save_role_impl(&self, input: SaveRoleInput) -> AppResult<RoleDefinition> {
        let permission_names: Vec<String> = input
            .permission_names
            .iter()
            .map(|name| name.as_str().to_owned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut seen = BTreeSet::new();
        let included_role_names: Vec<String> = input
            .included_role_names
            .iter()
            .map(|name| name.as_str().to_owned())
            .filter(|name| seen.insert(name.clone()))
            .collect();

        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(internal("begin transaction"))?;

        let permission_ids = sqlx::query_as::<_, (uuid::Uuid, String)>(
            r#"
            SELECT id, name
            FROM rbac_permissions
            WHERE name = ANY($1)
            "#,
        )
        .bind(&permission_names)
        .fetch_all(&mut *transaction)
        .await
        .map_err(internal("resolve permissions"))?;

        if permission_ids.len() < permission_names.len() {
            let known: BTreeSet<&str> = permission_ids
                .iter()
                .map(|(_, name)| name.as_str())
                .collect();
            let missing: Vec<&str> = permission_names
                .iter()
                .map(String::as_str)
                .filter(|name| !known.contains(name))
                .collect();
            return Err(AppError::Validation(format!(
                "unknown permissions: {}",
                missing.join(", ")
            )));
        }

        let role_id = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            INSERT INTO rbac_roles (name, description, is_system)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO UPDATE
            SET
                description = EXCLUDED.description,
                is_system = EXCLUDED.is_system,
                updated_at = now()
            RETURNING id
            "#,
        )
        .bind(input.name.as_str())
        .bind(input.description.trim())
        .bind(input.is_system)
        .fetch_one(&mut *transaction)
        .await
        .map_err(internal("save role"))?;

        sqlx::query("DELETE FROM rbac_role_permissions WHERE role_id = $1")
            .bind(role_id)
            .execute(&mut *transaction)
            .await
            .map_err(internal("clear role grants"))?;

        let ids: Vec<uuid::Uuid> = permission_ids.into_iter().map(|(id, _)| id).collect();
        sqlx::query(
            r#"
            INSERT INTO rbac_role_permissions (role_id, permission_id)
            SELECT $1, permission_id
            FROM UNNEST($2::uuid[]) AS permission_id
            "#,
        )
        .bind(role_id)
        .bind(&ids)
        .execute(&mut *transaction)
        .await
        .map_err(internal("persist role grants"))?;

        sqlx::query("DELETE FROM rbac_role_inclusions WHERE role_id = $1")
            .bind(role_id)
            .execute(&mut *transaction)
            .await
            .map_err(internal("clear role inclusions"))?;

        sqlx::query(
            r#"
            INSERT INTO rbac_role_inclusions (role_id, included_role_name, position)
            SELECT $1, included.name, included.position::int
            FROM UNNEST($2::text[]) WITH ORDINALITY AS included(name, position)
            "#,
        )
        .bind(role_id)
        .bind(&included_role_names)
        .execute(&mut *transaction)
        .await
        .map_err(internal("persist role inclusions"))?;

        transaction
            .commit()
            .await
            .map_err(internal("commit transaction"))?;

        let names = [input.name.as_str().to_owned()];
        load_roles(&self.pool, RoleScope::Names(&names))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Internal(format!("role '{}' vanished after save", input.name)))
    }

    pub(super) async fn delete_role_impl(&self, role_name: &str) -> AppResult<bool> {
        let rows_affected = sqlx::query("DELETE FROM rbac_roles WHERE name = $1")
            .bind(role_name)
            .execute(&self.pool)
            .await
            .map_err(internal("delete role"))?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    pub(super) async fn prune_system_entries_impl(
        &self,
        keep_role_names: &[String],
        keep_permission_names: &[String],
    ) -> AppResult<PruneSummary> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(internal("begin transaction"))?;

        let removed_roles = sqlx::query(
            r#"
            DELETE FROM rbac_roles
            WHERE is_system AND NOT (name = ANY($1))
            "#,
        )
        .bind(keep_role_names)
        .execute(&mut *transaction)
        .await
        .map_err(internal("prune system roles"))?
        .rows_affected();

        let removed_permissions = sqlx::query(
            r#"
            DELETE FROM rbac_permissions
            WHERE is_system AND NOT (name = ANY($1))
            "#,
        )
        .bind(keep_permission_names)
        .execute(&mut *transaction)
        .await
        .map_err(internal("prune system permissions"))?
        .rows_affected();

        transaction
            .commit()
            .await
            .map_err(internal("commit transaction"))?;

        Ok(PruneSummary {
            removed_roles,
            removed_permissions,
        })
    }
}
