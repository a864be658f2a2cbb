//! Shared primitives for all Rust crates in Rolegate.

#![forbid(unsafe_code)]

/// Authentication primitives shared across services.
pub mod auth;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::{IdentityRole, UserIdentity};

/// Result type used across Rolegate crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string, trimming surrounding whitespace.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Caller presented no credential or an unverifiable one.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller presented a credential that is stale, reused, or lacks a grant.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Caller exceeded a rate limit window.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}
