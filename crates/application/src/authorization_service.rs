use std::sync::Arc;

use rolegate_core::{AppError, AppResult, IdentityRole, UserIdentity};
use rolegate_domain::UserId;

use crate::role_graph::{EffectiveRoles, RoleGraphResolver, RoleRepository, permission_names};

/// Application service for building caller identities and checking grants.
#[derive(Clone)]
pub struct AuthorizationService {
    resolver: RoleGraphResolver,
    repository: Arc<dyn RoleRepository>,
}

impl AuthorizationService {
    /// Creates a new authorization service.
    #[must_use]
    pub fn new(resolver: RoleGraphResolver, repository: Arc<dyn RoleRepository>) -> Self {
        Self {
            resolver,
            repository,
        }
    }

    /// Returns the resolver used for role flattening.
    #[must_use]
    pub fn resolver(&self) -> &RoleGraphResolver {
        &self.resolver
    }

    /// Resolves the effective roles of a user from its direct assignments.
    pub async fn effective_roles_for_user(&self, user_id: UserId) -> AppResult<EffectiveRoles> {
        let direct_roles = self.repository.list_roles_for_user(user_id).await?;
        self.resolver.resolve_effective_roles(&direct_roles).await
    }

    /// Builds the authenticated identity for a user.
    pub async fn identity_for_user(&self, user_id: UserId, email: &str) -> AppResult<UserIdentity> {
        let resolved = self.effective_roles_for_user(user_id).await?;
        let roles = resolved.values().map(IdentityRole::from).collect();

        Ok(UserIdentity::new(
            user_id.to_string(),
            email,
            roles,
            permission_names(&resolved),
        ))
    }

    /// Ensures the caller holds at least one of the named permissions or roles.
    pub fn require_any(&self, identity: &UserIdentity, required: &[&str]) -> AppResult<()> {
        if identity.holds_any(required) {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "subject '{}' requires one of [{}]",
            identity.subject(),
            required.join(", ")
        )))
    }
}
