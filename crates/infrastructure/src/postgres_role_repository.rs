//! Role lookups for graph resolution.
//!
//! Roles are read with their own grants and ordered inclusion names. The
//! same loader backs the admin repository listings.

use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use rolegate_application::{PermissionDefinition, RoleDefinition, RoleRepository};
use rolegate_core::{AppError, AppResult};
use rolegate_domain::UserId;

/// PostgreSQL implementation of the role lookup port.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn find_roles_by_names(&self, names: &[String]) -> AppResult<Vec<RoleDefinition>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        load_roles(&self.pool, RoleScope::Names(names)).await
    }

    async fn list_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleDefinition>> {
        load_roles(&self.pool, RoleScope::User(user_id)).await
    }
}

/// Which roles a [`load_roles`] call reads.
pub(crate) enum RoleScope<'a> {
    All,
    Names(&'a [String]),
    User(UserId),
}

#[derive(Debug, FromRow)]
struct RoleGrantRow {
    role_id: uuid::Uuid,
    role_name: String,
    role_description: String,
    role_is_system: bool,
    included_role_names: Vec<String>,
    permission_id: Option<uuid::Uuid>,
    permission_name: Option<String>,
    permission_description: Option<String>,
    permission_is_system: Option<bool>,
}

const ROLE_GRANT_SELECT: &str = r#"
    SELECT
        roles.id AS role_id,
        roles.name AS role_name,
        roles.description AS role_description,
        roles.is_system AS role_is_system,
        ARRAY(
            SELECT inclusions.included_role_name
            FROM rbac_role_inclusions AS inclusions
            WHERE inclusions.role_id = roles.id
            ORDER BY inclusions.position
        ) AS included_role_names,
        permissions.id AS permission_id,
        permissions.name AS permission_name,
        permissions.description AS permission_description,
        permissions.is_system AS permission_is_system
    FROM rbac_roles AS roles
    LEFT JOIN rbac_role_permissions AS grants
        ON grants.role_id = roles.id
    LEFT JOIN rbac_permissions AS permissions
        ON permissions.id = grants.permission_id
"#;

/// Loads roles in `scope` sorted by name, each with its grants sorted by name.
pub(crate) async fn load_roles(
    pool: &PgPool,
    scope: RoleScope<'_>,
) -> AppResult<Vec<RoleDefinition>> {
    let rows = match scope {
        RoleScope::All => {
            sqlx::query_as::<_, RoleGrantRow>(&format!(
                "{ROLE_GRANT_SELECT} ORDER BY roles.name, permissions.name"
            ))
            .fetch_all(pool)
            .await
        }
        RoleScope::Names(names) => {
            sqlx::query_as::<_, RoleGrantRow>(&format!(
                "{ROLE_GRANT_SELECT} WHERE roles.name = ANY($1) ORDER BY roles.name, permissions.name"
            ))
            .bind(names)
            .fetch_all(pool)
            .await
        }
        RoleScope::User(user_id) => {
            sqlx::query_as::<_, RoleGrantRow>(&format!(
                r#"{ROLE_GRANT_SELECT}
                WHERE roles.id IN (
                    SELECT role_id FROM rbac_user_roles WHERE user_id = $1
                )
                ORDER BY roles.name, permissions.name"#
            ))
            .bind(user_id.as_uuid())
            .fetch_all(pool)
            .await
        }
    }
    .map_err(|error| AppError::Internal(format!("failed to load roles: {error}")))?;

    Ok(aggregate_roles(rows))
}

fn aggregate_roles(rows: Vec<RoleGrantRow>) -> Vec<RoleDefinition> {
    let mut by_name: BTreeMap<String, RoleDefinition> = BTreeMap::new();

    for row in rows {
        let role = by_name
            .entry(row.role_name.clone())
            .or_insert_with(|| RoleDefinition {
                role_id: row.role_id.to_string(),
                name: row.role_name,
                description: row.role_description,
                is_system: row.role_is_system,
                permissions: Vec::new(),
                included_role_names: row.included_role_names,
            });

        if let (Some(permission_id), Some(name)) = (row.permission_id, row.permission_name) {
            role.permissions.push(PermissionDefinition {
                permission_id: permission_id.to_string(),
                name,
                description: row.permission_description.unwrap_or_default(),
                is_system: row.permission_is_system.unwrap_or(false),
            });
        }
    }

    by_name.into_values().collect()
}
