use std::collections::BTreeSet;

use tracing::info;

use rolegate_core::{AppError, AppResult, UserIdentity};
use rolegate_domain::{AuditAction, PermissionName, RoleName};

use crate::role_graph::{PermissionDefinition, RoleDefinition};
use crate::security_admin_ports::{SaveRoleInput, SaveRoleRequest};

use super::SecurityAdminService;

impl SecurityAdminService {
    /// Returns all roles for administrative users.
    pub async fn list_roles(&self, actor: &UserIdentity) -> AppResult<Vec<RoleDefinition>> {
        self.require_role_manage_permission(actor)?;
        self.repository.list_roles().await
    }

    /// Returns all permissions for administrative users.
    pub async fn list_permissions(
        &self,
        actor: &UserIdentity,
    ) -> AppResult<Vec<PermissionDefinition>> {
        self.require_role_manage_permission(actor)?;
        self.repository.list_permissions().await
    }

    /// Creates or updates a custom role and emits an audit event.
    ///
    /// Baseline roles are rejected, as are self inclusion and inclusion of
    /// roles that do not exist.
    pub async fn save_role(
        &self,
        actor: &UserIdentity,
        request: SaveRoleRequest,
    ) -> AppResult<RoleDefinition> {
        self.require_role_manage_permission(actor)?;

        let name = editable_role_name(&request.name)?;
        let permission_names = request
            .permission_names
            .into_iter()
            .map(PermissionName::new)
            .collect::<AppResult<BTreeSet<_>>>()?;

        let mut included_role_names: Vec<RoleName> = Vec::new();
        for included in request.included_role_names {
            let included = RoleName::new(included)?;
            if included == name {
                return Err(AppError::Validation(format!(
                    "role '{name}' cannot include itself"
                )));
            }
            if !included_role_names.contains(&included) {
                included_role_names.push(included);
            }
        }
        self.ensure_roles_exist(&included_role_names).await?;

        let role = self
            .repository
            .save_role(SaveRoleInput {
                name,
                description: request.description.trim().to_owned(),
                permission_names: permission_names.into_iter().collect(),
                included_role_names,
                is_system: false,
            })
            .await?;

        info!(role = %role.name, subject = actor.subject(), "saved role");
        self.append_audit(
            actor,
            AuditAction::SecurityRoleSaved,
            "rbac_role",
            role.name.clone(),
            format!("saved role '{}'", role.name),
        )
        .await?;

        Ok(role)
    }

    /// Deletes a custom role and emits an audit event.
    pub async fn delete_role(&self, actor: &UserIdentity, role_name: &str) -> AppResult<()> {
        self.require_role_manage_permission(actor)?;

        let name = editable_role_name(role_name)?;
        if !self.repository.delete_role(name.as_str()).await? {
            return Err(AppError::NotFound(format!("role '{name}' does not exist")));
        }

        self.append_audit(
            actor,
            AuditAction::SecurityRoleDeleted,
            "rbac_role",
            name.to_string(),
            format!("deleted role '{name}'"),
        )
        .await
    }

    async fn ensure_roles_exist(&self, role_names: &[RoleName]) -> AppResult<()> {
        if role_names.is_empty() {
            return Ok(());
        }

        let requested: Vec<String> = role_names.iter().map(ToString::to_string).collect();
        let found: BTreeSet<String> = self
            .role_repository
            .find_roles_by_names(&requested)
            .await?
            .into_iter()
            .map(|role| role.name)
            .collect();

        let missing: Vec<&str> = requested
            .iter()
            .map(String::as_str)
            .filter(|name| !found.contains(*name))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }

        Err(AppError::Validation(format!(
            "included roles do not exist: {}",
            missing.join(", ")
        )))
    }
}

fn editable_role_name(value: &str) -> AppResult<RoleName> {
    let name = RoleName::new(value)?;
    if name.is_baseline() {
        return Err(AppError::Validation(format!(
            "baseline role '{name}' is managed by bootstrap"
        )));
    }

    Ok(name)
}
