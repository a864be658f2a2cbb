//! Role graph resolution: flattens directly assigned roles through their
//! `included_role_names` into the effective role set and permission union.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use rolegate_core::{AppResult, IdentityRole};
use rolegate_domain::{InclusionDepth, UserId};

/// Permission definition as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionDefinition {
    /// Stable permission identifier.
    pub permission_id: String,
    /// Unique dotted permission name.
    pub name: String,
    /// Human readable description.
    pub description: String,
    /// Indicates a bootstrap-managed permission.
    pub is_system: bool,
}

/// Role definition with its own grants, not expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDefinition {
    /// Stable role identifier.
    pub role_id: String,
    /// Unique role name.
    pub name: String,
    /// Human readable description.
    pub description: String,
    /// Indicates a bootstrap-managed role.
    pub is_system: bool,
    /// Grants attached to this role only.
    pub permissions: Vec<PermissionDefinition>,
    /// Names of roles this role includes.
    pub included_role_names: Vec<String>,
}

/// Role entry in a resolved effective role map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveRole {
    /// Stable role identifier.
    pub role_id: String,
    /// Unique role name.
    pub name: String,
    /// Grants attached to this role.
    pub permissions: Vec<PermissionDefinition>,
}

impl From<&RoleDefinition> for EffectiveRole {
    fn from(role: &RoleDefinition) -> Self {
        Self {
            role_id: role.role_id.clone(),
            name: role.name.clone(),
            permissions: role.permissions.clone(),
        }
    }
}

impl From<&EffectiveRole> for IdentityRole {
    fn from(role: &EffectiveRole) -> Self {
        Self {
            id: role.role_id.clone(),
            name: role.name.clone(),
        }
    }
}

/// Effective roles keyed by role name.
pub type EffectiveRoles = BTreeMap<String, EffectiveRole>;

/// Read port for role lookups used during resolution.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Finds roles by name. Unknown names are omitted from the result.
    async fn find_roles_by_names(&self, names: &[String]) -> AppResult<Vec<RoleDefinition>>;

    /// Lists the roles directly assigned to a user.
    async fn list_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleDefinition>>;
}

/// Flattens role inclusion into effective roles and permissions.
#[derive(Clone)]
pub struct RoleGraphResolver {
    repository: Arc<dyn RoleRepository>,
    depth: InclusionDepth,
}

impl RoleGraphResolver {
    /// Creates a resolver with the configured inclusion depth.
    #[must_use]
    pub fn new(repository: Arc<dyn RoleRepository>, depth: InclusionDepth) -> Self {
        Self { repository, depth }
    }

    /// Returns the configured inclusion depth.
    #[must_use]
    pub fn depth(&self) -> InclusionDepth {
        self.depth
    }

    /// Resolves direct roles into the de-duplicated effective role map.
    ///
    /// Direct roles are always present in the result. Included names without a
    /// matching role record are skipped. Under [`InclusionDepth::Transitive`]
    /// every name is looked up at most once, so cyclic inclusion terminates.
    pub async fn resolve_effective_roles(
        &self,
        direct_roles: &[RoleDefinition],
    ) -> AppResult<EffectiveRoles> {
        let mut resolved = EffectiveRoles::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut frontier: BTreeSet<String> = BTreeSet::new();

        for role in direct_roles {
            visited.insert(role.name.clone());
            resolved.insert(role.name.clone(), EffectiveRole::from(role));
        }

        for role in direct_roles {
            frontier.extend(role.included_role_names.iter().cloned());
        }

        while !frontier.is_empty() {
            let pending: Vec<String> = frontier
                .into_iter()
                .filter(|name| visited.insert(name.clone()))
                .collect();
            if pending.is_empty() {
                break;
            }

            let found = self.repository.find_roles_by_names(&pending).await?;
            if found.len() < pending.len() {
                debug!(
                    requested = pending.len(),
                    found = found.len(),
                    "skipping included role names without a role record"
                );
            }

            let mut next = BTreeSet::new();
            for role in &found {
                next.extend(role.included_role_names.iter().cloned());
                resolved.insert(role.name.clone(), EffectiveRole::from(role));
            }

            if self.depth == InclusionDepth::SingleLevel {
                break;
            }
            frontier = next;
        }

        Ok(resolved)
    }

    /// Returns the union of permission names across the effective roles.
    pub async fn effective_permission_names(
        &self,
        direct_roles: &[RoleDefinition],
    ) -> AppResult<BTreeSet<String>> {
        let resolved = self.resolve_effective_roles(direct_roles).await?;
        Ok(permission_names(&resolved))
    }
}

/// Collects permission names from an already resolved role map.
#[must_use]
pub fn permission_names(resolved: &EffectiveRoles) -> BTreeSet<String> {
    resolved
        .values()
        .flat_map(|role| role.permissions.iter())
        .map(|permission| permission.name.clone())
        .collect()
}

#[cfg(test)]
mod tests;
