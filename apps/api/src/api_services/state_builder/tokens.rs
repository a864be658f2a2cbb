use std::sync::Arc;

use rolegate_application::{CodeHasher, TokenSigner};
use rolegate_infrastructure::{Argon2CodeHasher, JwtTokenSigner, TokenKeyConfig};

use crate::api_config::{ApiConfig, TokenRuntimeConfig};

pub(super) fn build_token_signer(config: &ApiConfig) -> Arc<dyn TokenSigner> {
    Arc::new(JwtTokenSigner::new(
        key_config(&config.access_token),
        key_config(&config.refresh_token),
    ))
}

pub(super) fn build_code_hasher() -> Arc<dyn CodeHasher> {
    Arc::new(Argon2CodeHasher::new())
}

fn key_config(config: &TokenRuntimeConfig) -> TokenKeyConfig {
    TokenKeyConfig {
        secret: config.secret.clone(),
        ttl_seconds: config.ttl_seconds,
    }
}
