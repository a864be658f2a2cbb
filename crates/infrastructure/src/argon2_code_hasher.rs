//! Argon2id hashing for one-time login codes.
//!
//! Parameters: m=19456 (19 MiB), t=2, p=1.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};

use rolegate_application::CodeHasher;
use rolegate_core::{AppError, AppResult};

/// Argon2id login code hasher.
#[derive(Clone)]
pub struct Argon2CodeHasher {
    argon2: Argon2<'static>,
}

impl Argon2CodeHasher {
    /// Creates a hasher with the default cost parameters.
    #[must_use]
    pub fn new() -> Self {
        let params = Params::new(19456, 2, 1, None).unwrap_or_else(|_| Params::default());
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }
}

impl Default for Argon2CodeHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeHasher for Argon2CodeHasher {
    fn hash_code(&self, code: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(code.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|error| AppError::Internal(format!("failed to hash login code: {error}")))
    }

    fn verify_code(&self, code: &str, hash: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(hash).map_err(|error| {
            AppError::Internal(format!("failed to parse login code hash: {error}"))
        })?;

        match self.argon2.verify_password(code.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(error) => Err(AppError::Internal(format!(
                "login code verification failed: {error}"
            ))),
        }
    }
}
