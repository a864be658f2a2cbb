use async_trait::async_trait;

use rolegate_core::AppResult;
use rolegate_domain::{PermissionName, RoleName, UserId};

use crate::role_graph::{PermissionDefinition, RoleDefinition};

/// Role payload as submitted through the admin API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRoleRequest {
    /// Role name to create or update.
    pub name: String,
    /// Human readable description.
    pub description: String,
    /// Permission names granted by the role.
    pub permission_names: Vec<String>,
    /// Names of roles included by the role.
    pub included_role_names: Vec<String>,
}

/// Validated role upsert passed to the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRoleInput {
    /// Unique role name.
    pub name: RoleName,
    /// Human readable description.
    pub description: String,
    /// Grants attached to the role. Replaces the previous set.
    pub permission_names: Vec<PermissionName>,
    /// Included role names in order. Replaces the previous list.
    pub included_role_names: Vec<RoleName>,
    /// Marks a bootstrap-managed role.
    pub is_system: bool,
}

/// Validated permission upsert passed to the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavePermissionInput {
    /// Unique dotted permission name.
    pub name: PermissionName,
    /// Human readable description.
    pub description: String,
    /// Marks a bootstrap-managed permission.
    pub is_system: bool,
}

/// Counts of bootstrap-managed rows removed because they left the baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneSummary {
    /// Removed roles.
    pub removed_roles: u64,
    /// Removed permissions.
    pub removed_permissions: u64,
}

/// Repository port for role, permission and assignment administration.
#[async_trait]
pub trait SecurityAdminRepository: Send + Sync {
    /// Lists all roles with their own grants and inclusions.
    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>>;

    /// Creates or updates a role by name.
    ///
    /// Unknown permission names are a validation error.
    async fn save_role(&self, input: SaveRoleInput) -> AppResult<RoleDefinition>;

    /// Deletes a role and its assignments. Returns whether it existed.
    async fn delete_role(&self, role_name: &str) -> AppResult<bool>;

    /// Lists all permissions.
    async fn list_permissions(&self) -> AppResult<Vec<PermissionDefinition>>;

    /// Creates or updates a permission by name.
    async fn save_permission(&self, input: SavePermissionInput)
    -> AppResult<PermissionDefinition>;

    /// Assigns an existing role to a user. Assigning twice is a no-op.
    async fn assign_role_to_user(&self, user_id: UserId, role_name: &str) -> AppResult<()>;

    /// Removes a role assignment. Returns whether it existed.
    async fn remove_role_from_user(&self, user_id: UserId, role_name: &str) -> AppResult<bool>;

    /// Deletes bootstrap-managed roles and permissions whose names are not kept.
    async fn prune_system_entries(
        &self,
        keep_role_names: &[String],
        keep_permission_names: &[String],
    ) -> AppResult<PruneSummary>;
}
