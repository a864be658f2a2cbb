use std::sync::Arc;

use chrono::Utc;

use rolegate_core::{AppResult, UserIdentity};
use rolegate_domain::{AuditAction, ROLE_ADMIN_ROLE};

use crate::{
    AuditEvent, AuditRepository, AuthorizationService, RoleRepository, SecurityAdminRepository,
};

mod assignments;
mod roles;

#[cfg(test)]
mod tests;

/// Permission that grants role administration without the `role.admin` role.
const ROLE_MANAGE_PERMISSION: &str = "role.manage.all";

/// Application service for role, permission and assignment administration.
#[derive(Clone)]
pub struct SecurityAdminService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn SecurityAdminRepository>,
    role_repository: Arc<dyn RoleRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl SecurityAdminService {
    /// Creates a new security admin service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn SecurityAdminRepository>,
        role_repository: Arc<dyn RoleRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            role_repository,
            audit_repository,
        }
    }

    fn require_role_manage_permission(&self, actor: &UserIdentity) -> AppResult<()> {
        self.authorization_service
            .require_any(actor, &[ROLE_ADMIN_ROLE, ROLE_MANAGE_PERMISSION])
    }

    async fn append_audit(
        &self,
        actor: &UserIdentity,
        action: AuditAction,
        resource_type: &str,
        resource_id: String,
        detail: String,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.subject().to_owned(),
                action,
                resource_type: resource_type.to_owned(),
                resource_id,
                detail: Some(detail),
                occurred_at: Utc::now(),
            })
            .await
    }
}
