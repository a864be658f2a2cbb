use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use rolegate_application::{
    PermissionDefinition, PruneSummary, RoleDefinition, SavePermissionInput, SaveRoleInput,
    SecurityAdminRepository,
};
use rolegate_core::{AppError, AppResult};
use rolegate_domain::UserId;

use crate::postgres_role_repository::{RoleScope, load_roles};

mod assignments;
mod permissions;
mod roles;

#[cfg(test)]
mod tests;

/// PostgreSQL-backed repository for role, permission and assignment administration.
#[derive(Clone)]
pub struct PostgresSecurityAdminRepository {
    pool: PgPool,
}

impl PostgresSecurityAdminRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    id: uuid::Uuid,
    name: String,
    description: String,
    is_system: bool,
}

impl From<PermissionRow> for PermissionDefinition {
    fn from(row: PermissionRow) -> Self {
        Self {
            permission_id: row.id.to_string(),
            name: row.name,
            description: row.description,
            is_system: row.is_system,
        }
    }
}

#[async_trait]
impl SecurityAdminRepository for PostgresSecurityAdminRepository {
    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>> {
        load_roles(&self.pool, RoleScope::All).await
    }

    async fn save_role(&self, input: SaveRoleInput) -> AppResult<RoleDefinition> {
        self.save_role_impl(input).await
    }

    async fn delete_role(&self, role_name: &str) -> AppResult<bool> {
        self.delete_role_impl(role_name).await
    }

    async fn list_permissions(&self) -> AppResult<Vec<PermissionDefinition>> {
        self.list_permissions_impl().await
    }

    async fn save_permission(
        &self,
        input: SavePermissionInput,
    ) -> AppResult<PermissionDefinition> {
        self.save_permission_impl(input).await
    }

    async fn assign_role_to_user(&self, user_id: UserId, role_name: &str) -> AppResult<()> {
        self.assign_role_to_user_impl(user_id, role_name).await
    }

    async fn remove_role_from_user(&self, user_id: UserId, role_name: &str) -> AppResult<bool> {
        self.remove_role_from_user_impl(user_id, role_name).await
    }

    async fn prune_system_entries(
        &self,
        keep_role_names: &[String],
        keep_permission_names: &[String],
    ) -> AppResult<PruneSummary> {
        self.prune_system_entries_impl(keep_role_names, keep_permission_names)
            .await
    }
}

fn internal(operation: &str) -> impl FnOnce(sqlx::Error) -> AppError + '_ {
    move |error| AppError::Internal(format!("failed to {operation}: {error}"))
}
