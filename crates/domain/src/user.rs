//! User identity types and credential formats.

use rolegate_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of digits in a one-time login code.
pub const LOGIN_CODE_LENGTH: usize = 6;

const EMAIL_MAX_LENGTH: usize = 254;

/// Unique identifier for a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a user identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Parses a token subject into a user identifier.
    pub fn parse(value: &str) -> AppResult<Self> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|error| AppError::Validation(format!("invalid user id '{value}': {error}")))
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Validated, lowercased email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// The value is trimmed and lowercased so lookups are case-insensitive.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into().trim().to_lowercase();

        if value.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        if value.len() > EMAIL_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "email address must not exceed {EMAIL_MAX_LENGTH} characters"
            )));
        }

        let Some((local, domain)) = value.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        };

        if local.is_empty() || domain.contains('@') {
            return Err(AppError::Validation(
                "email address must contain exactly one '@' and a local part".to_owned(),
            ));
        }

        if !domain.contains('.')
            || domain.starts_with('.')
            || domain.ends_with('.')
            || domain.contains("..")
        {
            return Err(AppError::Validation(format!(
                "email domain '{domain}' is malformed"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the domain part after `@`.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0
            .split_once('@')
            .map(|(_, domain)| domain)
            .unwrap_or_default()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// One-time login code as typed by the user.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCode(String);

impl LoginCode {
    /// Parses a code of exactly [`LOGIN_CODE_LENGTH`] ASCII digits.
    pub fn parse(value: &str) -> AppResult<Self> {
        let value = value.trim();
        if value.len() != LOGIN_CODE_LENGTH || !value.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::Validation(format!(
                "login code must be {LOGIN_CODE_LENGTH} digits"
            )));
        }

        Ok(Self(value.to_owned()))
    }

    /// Returns the code digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for LoginCode {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("LoginCode(******)")
    }
}
