use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rolegate_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Role assigned to every newly created user.
pub const DEFAULT_ROLE: &str = "default";

/// Baseline role that includes every administrative role.
pub const ADMIN_ROLE: &str = "admin";

/// Baseline role for user administration.
pub const USER_ADMIN_ROLE: &str = "user.admin";

/// Baseline role for role and permission administration.
pub const ROLE_ADMIN_ROLE: &str = "role.admin";

const PERMISSION_NAME_MAX_LENGTH: usize = 128;
const ROLE_NAME_MAX_LENGTH: usize = 64;

/// Dotted permission name in `resource.action.scope` form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionName(String);

impl PermissionName {
    /// Creates a validated permission name.
    ///
    /// Requires at least two non-empty segments separated by `.`, each made of
    /// lowercase ASCII letters, digits, `_` or `-`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into().trim().to_owned();

        if value.is_empty() || value.len() > PERMISSION_NAME_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "permission name must be between 1 and {PERMISSION_NAME_MAX_LENGTH} characters"
            )));
        }

        let segments: Vec<&str> = value.split('.').collect();
        if segments.len() < 2 {
            return Err(AppError::Validation(format!(
                "permission name '{value}' must use dotted resource.action form"
            )));
        }

        if segments.iter().any(|segment| !is_valid_segment(segment)) {
            return Err(AppError::Validation(format!(
                "permission name '{value}' contains an empty or invalid segment"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for PermissionName {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PermissionName> for String {
    fn from(value: PermissionName) -> Self {
        value.0
    }
}

impl Display for PermissionName {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Globally unique role name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleName(String);

impl RoleName {
    /// Creates a validated role name such as `default` or `user.admin`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into().trim().to_owned();

        if value.is_empty() || value.len() > ROLE_NAME_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "role name must be between 1 and {ROLE_NAME_MAX_LENGTH} characters"
            )));
        }

        if value.split('.').any(|segment| !is_valid_segment(segment)) {
            return Err(AppError::Validation(format!(
                "role name '{value}' may only contain lowercase letters, digits, '_', '-' and inner dots"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns whether the role is part of the bootstrap baseline.
    #[must_use]
    pub fn is_baseline(&self) -> bool {
        matches!(
            self.0.as_str(),
            DEFAULT_ROLE | ADMIN_ROLE | USER_ADMIN_ROLE | ROLE_ADMIN_ROLE
        )
    }
}

impl TryFrom<String> for RoleName {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoleName> for String {
    fn from(value: RoleName) -> Self {
        value.0
    }
}

impl Display for RoleName {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment.chars().all(|character| {
            character.is_ascii_lowercase()
                || character.is_ascii_digit()
                || character == '_'
                || character == '-'
        })
}

/// How far role inclusion is followed when flattening a user's roles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InclusionDepth {
    /// Only roles named directly by an assigned role are expanded.
    #[default]
    SingleLevel,
    /// Inclusions are followed until the closure is complete.
    Transitive,
}

impl InclusionDepth {
    /// Returns the configuration value for this depth.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleLevel => "single",
            Self::Transitive => "transitive",
        }
    }
}

impl FromStr for InclusionDepth {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "single" | "single_level" => Ok(Self::SingleLevel),
            "transitive" => Ok(Self::Transitive),
            other => Err(AppError::Validation(format!(
                "unknown role inclusion depth '{other}'"
            ))),
        }
    }
}

/// Stable audit actions emitted by role administration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a role is created or updated.
    SecurityRoleSaved,
    /// Emitted when a role is deleted.
    SecurityRoleDeleted,
    /// Emitted when a role is assigned to a user.
    SecurityRoleAssigned,
    /// Emitted when a role is removed from a user.
    SecurityRoleUnassigned,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SecurityRoleSaved => "security.role.saved",
            Self::SecurityRoleDeleted => "security.role.deleted",
            Self::SecurityRoleAssigned => "security.role.assigned",
            Self::SecurityRoleUnassigned => "security.role.unassigned",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use proptest::prelude::*;

    use super::{InclusionDepth, PermissionName, RoleName};

    #[test]
    fn permission_name_accepts_dotted_form() {
        let name = PermissionName::new("user.read.all");
        assert!(name.is_ok());
    }

    #[test]
    fn permission_name_rejects_single_segment() {
        assert!(PermissionName::new("admin").is_err());
    }

    #[test]
    fn permission_name_rejects_empty_segment() {
        assert!(PermissionName::new("user..all").is_err());
        assert!(PermissionName::new("user.read.").is_err());
    }

    #[test]
    fn permission_name_rejects_uppercase() {
        assert!(PermissionName::new("User.Read.All").is_err());
    }

    #[test]
    fn role_name_accepts_plain_and_dotted_names() {
        assert!(RoleName::new("default").is_ok());
        assert!(RoleName::new("user.admin").is_ok());
    }

    #[test]
    fn role_name_rejects_leading_dot() {
        assert!(RoleName::new(".admin").is_err());
    }

    #[test]
    fn baseline_roles_are_recognized() {
        let role = RoleName::new("admin").unwrap_or_else(|_| panic!("test"));
        assert!(role.is_baseline());
        let custom = RoleName::new("support").unwrap_or_else(|_| panic!("test"));
        assert!(!custom.is_baseline());
    }

    #[test]
    fn inclusion_depth_parses_configuration_values() {
        assert_eq!(
            InclusionDepth::from_str("single").ok(),
            Some(InclusionDepth::SingleLevel)
        );
        assert_eq!(
            InclusionDepth::from_str("Transitive").ok(),
            Some(InclusionDepth::Transitive)
        );
        assert!(InclusionDepth::from_str("recursive").is_err());
    }

    #[test]
    fn inclusion_depth_defaults_to_single_level() {
        assert_eq!(InclusionDepth::default(), InclusionDepth::SingleLevel);
    }

    proptest! {
        #[test]
        fn generated_dotted_names_are_accepted(
            segments in proptest::collection::vec("[a-z0-9_-]{1,12}", 2..5)
        ) {
            let value = segments.join(".");
            let parsed = PermissionName::new(value.clone());
            prop_assert!(parsed.is_ok());
            prop_assert_eq!(parsed.map(String::from).ok(), Some(value));
        }

        #[test]
        fn names_with_whitespace_inside_are_rejected(
            left in "[a-z]{1,8}",
            right in "[a-z]{1,8}"
        ) {
            let value = format!("{left} x.{right}");
            prop_assert!(PermissionName::new(value).is_err());
        }
    }
}
