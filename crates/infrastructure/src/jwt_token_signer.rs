//! HS256 JSON Web Tokens for access and refresh credentials.
//!
//! Access and refresh tokens use distinct secrets and carry a `typ` claim,
//! so a token of one kind never verifies as the other.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use rolegate_application::{TokenClaims, TokenKind, TokenSigner};
use rolegate_core::{AppError, AppResult};

/// Secret and lifetime for one token kind.
#[derive(Clone)]
pub struct TokenKeyConfig {
    /// HMAC secret bytes.
    pub secret: String,
    /// Lifetime in seconds.
    pub ttl_seconds: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct JwtClaims {
    sub: String,
    iat: i64,
    exp: i64,
    jti: String,
    typ: String,
}

#[derive(Clone)]
struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: i64,
}

impl TokenKeys {
    fn new(config: &TokenKeyConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl_seconds: config.ttl_seconds,
        }
    }
}

/// `jsonwebtoken` implementation of the token signer port.
#[derive(Clone)]
pub struct JwtTokenSigner {
    access: TokenKeys,
    refresh: TokenKeys,
    validation: Validation,
}

impl JwtTokenSigner {
    /// Creates a signer from per-kind secrets and lifetimes.
    #[must_use]
    pub fn new(access: TokenKeyConfig, refresh: TokenKeyConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub", "iat"]);

        Self {
            access: TokenKeys::new(&access),
            refresh: TokenKeys::new(&refresh),
            validation,
        }
    }

    fn keys(&self, kind: TokenKind) -> &TokenKeys {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }
}

impl TokenSigner for JwtTokenSigner {
    fn sign(&self, subject: &str, kind: TokenKind) -> AppResult<String> {
        let keys = self.keys(kind);
        let issued_at = Utc::now().timestamp();
        let claims = JwtClaims {
            sub: subject.to_owned(),
            iat: issued_at,
            exp: issued_at + keys.ttl_seconds,
            jti: uuid::Uuid::new_v4().to_string(),
            typ: kind.as_str().to_owned(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding).map_err(|error| {
            AppError::Internal(format!("failed to sign {} token: {error}", kind.as_str()))
        })
    }

    fn verify(&self, token: &str, kind: TokenKind) -> AppResult<TokenClaims> {
        let data = decode::<JwtClaims>(token, &self.keys(kind).decoding, &self.validation)
            .map_err(|error| {
                AppError::Unauthorized(format!("invalid {} token: {error}", kind.as_str()))
            })?;
        let claims = data.claims;

        if claims.typ != kind.as_str() {
            return Err(AppError::Unauthorized(format!(
                "expected {} token",
                kind.as_str()
            )));
        }

        Ok(TokenClaims {
            subject: claims.sub,
            issued_at: claims.iat,
            expires_at: claims.exp,
            token_id: claims.jti,
        })
    }

    fn lifetime_seconds(&self, kind: TokenKind) -> i64 {
        self.keys(kind).ttl_seconds
    }
}
