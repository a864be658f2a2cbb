use rolegate_core::{AppError, AppResult, UserIdentity};
use rolegate_domain::{AuditAction, DEFAULT_ROLE, RoleName, UserId};

use crate::role_graph::RoleDefinition;

use super::SecurityAdminService;

impl SecurityAdminService {
    /// Returns the roles directly assigned to a user.
    pub async fn list_user_roles(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
    ) -> AppResult<Vec<RoleDefinition>> {
        self.require_role_manage_permission(actor)?;
        self.role_repository.list_roles_for_user(user_id).await
    }

    /// Assigns a role to a user and emits an audit event.
    pub async fn assign_role(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        role_name: &str,
    ) -> AppResult<()> {
        self.require_role_manage_permission(actor)?;

        let role_name = RoleName::new(role_name)?;
        self.repository
            .assign_role_to_user(user_id, role_name.as_str())
            .await?;

        self.append_audit(
            actor,
            AuditAction::SecurityRoleAssigned,
            "rbac_user_role",
            format!("{user_id}:{role_name}"),
            format!("assigned role '{role_name}' to '{user_id}'"),
        )
        .await
    }

    /// Removes a role from a user and emits an audit event.
    ///
    /// The `default` role cannot be removed.
    pub async fn unassign_role(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        role_name: &str,
    ) -> AppResult<()> {
        self.require_role_manage_permission(actor)?;

        let role_name = RoleName::new(role_name)?;
        if role_name.as_str() == DEFAULT_ROLE {
            return Err(AppError::Validation(format!(
                "role '{DEFAULT_ROLE}' cannot be removed from a user"
            )));
        }

        if !self
            .repository
            .remove_role_from_user(user_id, role_name.as_str())
            .await?
        {
            return Err(AppError::NotFound(format!(
                "user '{user_id}' does not have role '{role_name}'"
            )));
        }

        self.append_audit(
            actor,
            AuditAction::SecurityRoleUnassigned,
            "rbac_user_role",
            format!("{user_id}:{role_name}"),
            format!("removed role '{role_name}' from '{user_id}'"),
        )
        .await
    }
}
