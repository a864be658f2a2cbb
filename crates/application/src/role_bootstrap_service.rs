use std::sync::Arc;

use tracing::info;

use rolegate_core::AppResult;
use rolegate_domain::{
    ADMIN_ROLE, DEFAULT_ROLE, PermissionName, ROLE_ADMIN_ROLE, RoleName, USER_ADMIN_ROLE,
};

use crate::security_admin_ports::{
    PruneSummary, SavePermissionInput, SaveRoleInput, SecurityAdminRepository,
};

/// Permission that must exist after bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaselinePermission {
    /// Dotted permission name.
    pub name: &'static str,
    /// Human readable description.
    pub description: &'static str,
}

/// Role that must exist after bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaselineRole {
    /// Role name.
    pub name: &'static str,
    /// Human readable description.
    pub description: &'static str,
    /// Permissions granted directly.
    pub permission_names: &'static [&'static str],
    /// Included role names.
    pub included_role_names: &'static [&'static str],
}

/// Permissions seeded at startup.
pub const BASELINE_PERMISSIONS: &[BaselinePermission] = &[
    BaselinePermission {
        name: "user.read.all",
        description: "Read every user account",
    },
    BaselinePermission {
        name: "user.manage.all",
        description: "Manage every user account",
    },
    BaselinePermission {
        name: "role.read.all",
        description: "Read roles and permissions",
    },
    BaselinePermission {
        name: "role.manage.all",
        description: "Manage roles, permissions and assignments",
    },
    BaselinePermission {
        name: "profile.read.own",
        description: "Read the caller's own profile",
    },
];

/// Roles seeded at startup, in dependency order.
pub const BASELINE_ROLES: &[BaselineRole] = &[
    BaselineRole {
        name: DEFAULT_ROLE,
        description: "Assigned to every user",
        permission_names: &["profile.read.own"],
        included_role_names: &[],
    },
    BaselineRole {
        name: USER_ADMIN_ROLE,
        description: "Administers user accounts",
        permission_names: &["user.read.all", "user.manage.all"],
        included_role_names: &[DEFAULT_ROLE],
    },
    BaselineRole {
        name: ROLE_ADMIN_ROLE,
        description: "Administers roles and permissions",
        permission_names: &["role.read.all", "role.manage.all"],
        included_role_names: &[DEFAULT_ROLE],
    },
    BaselineRole {
        name: ADMIN_ROLE,
        description: "Holds every administrative role",
        permission_names: &[],
        included_role_names: &[USER_ADMIN_ROLE, ROLE_ADMIN_ROLE],
    },
];

/// Seeds baseline roles and permissions and prunes retired system entries.
#[derive(Clone)]
pub struct RoleBootstrapService {
    repository: Arc<dyn SecurityAdminRepository>,
}

impl RoleBootstrapService {
    /// Creates a new bootstrap service.
    #[must_use]
    pub fn new(repository: Arc<dyn SecurityAdminRepository>) -> Self {
        Self { repository }
    }

    /// Upserts the baseline and removes system entries outside it.
    ///
    /// Roles and permissions created through the admin API are kept.
    pub async fn ensure_baseline(&self) -> AppResult<PruneSummary> {
        for permission in BASELINE_PERMISSIONS {
            self.repository
                .save_permission(SavePermissionInput {
                    name: PermissionName::new(permission.name)?,
                    description: permission.description.to_owned(),
                    is_system: true,
                })
                .await?;
        }

        for role in BASELINE_ROLES {
            self.repository
                .save_role(SaveRoleInput {
                    name: RoleName::new(role.name)?,
                    description: role.description.to_owned(),
                    permission_names: role
                        .permission_names
                        .iter()
                        .map(|name| PermissionName::new(*name))
                        .collect::<AppResult<Vec<_>>>()?,
                    included_role_names: role
                        .included_role_names
                        .iter()
                        .map(|name| RoleName::new(*name))
                        .collect::<AppResult<Vec<_>>>()?,
                    is_system: true,
                })
                .await?;
        }

        let keep_roles: Vec<String> = BASELINE_ROLES
            .iter()
            .map(|role| role.name.to_owned())
            .collect();
        let keep_permissions: Vec<String> = BASELINE_PERMISSIONS
            .iter()
            .map(|permission| permission.name.to_owned())
            .collect();
        let summary = self
            .repository
            .prune_system_entries(&keep_roles, &keep_permissions)
            .await?;

        info!(
            roles = BASELINE_ROLES.len(),
            permissions = BASELINE_PERMISSIONS.len(),
            removed_roles = summary.removed_roles,
            removed_permissions = summary.removed_permissions,
            "ensured baseline roles and permissions"
        );

        Ok(summary)
    }
}
