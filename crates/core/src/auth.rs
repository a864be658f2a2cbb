use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Role reference carried on an authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentityRole {
    /// Stable role identifier.
    pub id: String,
    /// Unique role name.
    pub name: String,
}

/// Authenticated caller with its effective (flattened) roles and permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    subject: String,
    email: String,
    roles: Vec<IdentityRole>,
    permissions: BTreeSet<String>,
}

impl UserIdentity {
    /// Creates an identity from a resolved role graph.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        email: impl Into<String>,
        roles: Vec<IdentityRole>,
        permissions: BTreeSet<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            email: email.into(),
            roles,
            permissions,
        }
    }

    /// Returns the user id the identity was issued for.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the canonical email address.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Returns the effective roles, ordered by name.
    #[must_use]
    pub fn roles(&self) -> &[IdentityRole] {
        self.roles.as_slice()
    }

    /// Returns the effective permission names.
    #[must_use]
    pub fn permissions(&self) -> &BTreeSet<String> {
        &self.permissions
    }

    /// Returns whether the identity holds the named effective role.
    #[must_use]
    pub fn has_role(&self, role_name: &str) -> bool {
        self.roles.iter().any(|role| role.name == role_name)
    }

    /// Returns whether the identity holds the named permission.
    #[must_use]
    pub fn has_permission(&self, permission_name: &str) -> bool {
        self.permissions.contains(permission_name)
    }

    /// Returns whether any of the names matches a held permission or role.
    #[must_use]
    pub fn holds_any(&self, names: &[&str]) -> bool {
        names
            .iter()
            .any(|name| self.has_permission(name) || self.has_role(name))
    }
}
