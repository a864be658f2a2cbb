use rolegate_core::{AppError, AppResult};
use rolegate_domain::LOGIN_CODE_LENGTH;

/// Generates a random numeric login code.
pub(super) fn generate_login_code() -> AppResult<String> {
    let mut bytes = [0u8; 8];
    getrandom::fill(&mut bytes)
        .map_err(|error| AppError::Internal(format!("failed to generate login code: {error}")))?;

    let modulus = 10_u64.pow(LOGIN_CODE_LENGTH as u32);
    let value = u64::from_le_bytes(bytes) % modulus;
    Ok(format!("{value:0width$}", width = LOGIN_CODE_LENGTH))
}

/// Computes the SHA-256 hash of a token string for storage.
pub(super) fn hash_token(raw_token: &str) -> String {
    use sha2::{Digest, Sha256};
    use std::fmt::Write;

    let mut hasher = Sha256::new();
    hasher.update(raw_token.as_bytes());
    let result = hasher.finalize();

    result
        .iter()
        .fold(String::with_capacity(64), |mut acc, byte| {
            let _ = write!(acc, "{byte:02x}");
            acc
        })
}
