use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use rolegate_core::AppError;
use rolegate_domain::InclusionDepth;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::auth::ClientAddressSource;

const MIN_TOKEN_SECRET_LENGTH: usize = 32;
const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 8 * 60 * 60;
const DEFAULT_REFRESH_TOKEN_TTL_SECONDS: i64 = 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct SmtpRuntimeConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

#[derive(Debug, Clone)]
pub enum EmailProviderConfig {
    Console,
    Smtp(SmtpRuntimeConfig),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitStoreConfig {
    Postgres,
    Redis,
}

#[derive(Clone)]
pub struct TokenRuntimeConfig {
    pub secret: String,
    pub ttl_seconds: i64,
}

impl std::fmt::Debug for TokenRuntimeConfig {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("TokenRuntimeConfig")
            .field("secret", &"<redacted>")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub frontend_url: String,
    pub access_token: TokenRuntimeConfig,
    pub refresh_token: TokenRuntimeConfig,
    pub cookie_domain: Option<String>,
    pub cookie_secure: bool,
    pub inclusion_depth: InclusionDepth,
    pub allowed_email_domains: Vec<String>,
    pub email_provider: EmailProviderConfig,
    pub redis_url: Option<String>,
    pub rate_limit_store: RateLimitStoreConfig,
    pub client_address_source: ClientAddressSource,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Self::from_lookup(migrate_only, |name| env::var(name).ok())
    }

    /// Builds the configuration from a variable lookup.
    pub fn from_lookup(
        migrate_only: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let optional = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let required = |name: &str| {
            optional(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))
        };

        let database_url = required("DATABASE_URL")?;
        if migrate_only {
            return Ok(Self::migrate_only(database_url));
        }

        let frontend_url =
            optional("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_owned());
        Url::parse(&frontend_url)
            .map_err(|error| AppError::Validation(format!("invalid FRONTEND_URL: {error}")))?;

        let api_host = optional("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = match optional("API_PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|error| AppError::Validation(format!("invalid API_PORT: {error}")))?,
            None => 3001,
        };

        let access_token = TokenRuntimeConfig {
            secret: token_secret("ACCESS_TOKEN_SECRET", required("ACCESS_TOKEN_SECRET")?)?,
            ttl_seconds: ttl_seconds(
                "ACCESS_TOKEN_TTL_SECONDS",
                optional("ACCESS_TOKEN_TTL_SECONDS"),
                DEFAULT_ACCESS_TOKEN_TTL_SECONDS,
            )?,
        };
        let refresh_token = TokenRuntimeConfig {
            secret: token_secret("REFRESH_TOKEN_SECRET", required("REFRESH_TOKEN_SECRET")?)?,
            ttl_seconds: ttl_seconds(
                "REFRESH_TOKEN_TTL_SECONDS",
                optional("REFRESH_TOKEN_TTL_SECONDS"),
                DEFAULT_REFRESH_TOKEN_TTL_SECONDS,
            )?,
        };
        if access_token.secret == refresh_token.secret {
            return Err(AppError::Validation(
                "ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must differ".to_owned(),
            ));
        }

        let cookie_secure = optional("COOKIE_SECURE")
            .map(|value| value.eq_ignore_ascii_case("true"))
            .unwrap_or(true);
        let inclusion_depth = optional("ROLE_INCLUSION_DEPTH")
            .map(|value| InclusionDepth::from_str(&value))
            .transpose()?
            .unwrap_or_default();
        let allowed_email_domains = optional("ALLOWED_EMAIL_DOMAINS")
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|domain| !domain.is_empty())
                    .map(str::to_lowercase)
                    .collect()
            })
            .unwrap_or_default();

        let email_provider = match optional("EMAIL_PROVIDER")
            .unwrap_or_else(|| "console".to_owned())
            .as_str()
        {
            "console" => EmailProviderConfig::Console,
            "smtp" => {
                let port = required("SMTP_PORT")?
                    .parse::<u16>()
                    .map_err(|error| AppError::Validation(format!("invalid SMTP_PORT: {error}")))?;
                EmailProviderConfig::Smtp(SmtpRuntimeConfig {
                    host: required("SMTP_HOST")?,
                    port,
                    username: required("SMTP_USERNAME")?,
                    password: required("SMTP_PASSWORD")?,
                    from_address: required("SMTP_FROM_ADDRESS")?,
                })
            }
            other => {
                return Err(AppError::Validation(format!(
                    "EMAIL_PROVIDER must be either 'console' or 'smtp', got '{other}'"
                )));
            }
        };

        let redis_url = optional("REDIS_URL");
        let rate_limit_store = match optional("RATE_LIMIT_STORE")
            .unwrap_or_else(|| "postgres".to_owned())
            .as_str()
        {
            "postgres" => RateLimitStoreConfig::Postgres,
            "redis" => RateLimitStoreConfig::Redis,
            other => {
                return Err(AppError::Validation(format!(
                    "RATE_LIMIT_STORE must be either 'postgres' or 'redis', got '{other}'"
                )));
            }
        };
        if rate_limit_store == RateLimitStoreConfig::Redis && redis_url.is_none() {
            return Err(AppError::Validation(
                "REDIS_URL is required when RATE_LIMIT_STORE=redis".to_owned(),
            ));
        }

        // Only a proxy that appends its own hop makes x-forwarded-for trustworthy.
        let client_address_source = match optional("TRUST_PROXY_HEADERS") {
            Some(value) if value.eq_ignore_ascii_case("true") => ClientAddressSource::TrustedProxy,
            Some(value) if value.eq_ignore_ascii_case("false") => ClientAddressSource::Peer,
            Some(other) => {
                return Err(AppError::Validation(format!(
                    "TRUST_PROXY_HEADERS must be either 'true' or 'false', got '{other}'"
                )));
            }
            None => ClientAddressSource::Peer,
        };

        Ok(Self {
            migrate_only,
            database_url,
            api_host,
            api_port,
            frontend_url,
            access_token,
            refresh_token,
            cookie_domain: optional("COOKIE_DOMAIN"),
            cookie_secure,
            inclusion_depth,
            allowed_email_domains,
            email_provider,
            redis_url,
            rate_limit_store,
            client_address_source,
        })
    }

    // `migrate` needs nothing but the database.
    fn migrate_only(database_url: String) -> Self {
        let unused_token = TokenRuntimeConfig {
            secret: String::new(),
            ttl_seconds: 0,
        };

        Self {
            migrate_only: true,
            database_url,
            api_host: String::new(),
            api_port: 0,
            frontend_url: String::new(),
            access_token: unused_token.clone(),
            refresh_token: unused_token,
            cookie_domain: None,
            cookie_secure: true,
            inclusion_depth: InclusionDepth::default(),
            allowed_email_domains: Vec::new(),
            email_provider: EmailProviderConfig::Console,
            redis_url: None,
            rate_limit_store: RateLimitStoreConfig::Postgres,
            client_address_source: ClientAddressSource::Peer,
        }
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Validation(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn token_secret(name: &str, secret: String) -> Result<String, AppError> {
    if secret.chars().count() < MIN_TOKEN_SECRET_LENGTH {
        return Err(AppError::Validation(format!(
            "{name} must be at least {MIN_TOKEN_SECRET_LENGTH} characters"
        )));
    }

    Ok(secret)
}

fn ttl_seconds(name: &str, value: Option<String>, default: i64) -> Result<i64, AppError> {
    let Some(value) = value else {
        return Ok(default);
    };

    match value.parse::<i64>() {
        Ok(seconds) if seconds > 0 => Ok(seconds),
        Ok(_) => Err(AppError::Validation(format!("{name} must be positive"))),
        Err(error) => Err(AppError::Validation(format!("invalid {name}: {error}"))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rolegate_core::AppError;
    use rolegate_domain::InclusionDepth;

    use super::{ApiConfig, EmailProviderConfig, RateLimitStoreConfig};
    use crate::auth::ClientAddressSource;

    fn base_env() -> HashMap<&'static str, String> {
        HashMap::from([
            ("DATABASE_URL", "postgres://localhost/rolegate".to_owned()),
            ("ACCESS_TOKEN_SECRET", "a".repeat(32)),
            ("REFRESH_TOKEN_SECRET", "r".repeat(32)),
        ])
    }

    fn load(env: &HashMap<&'static str, String>) -> Result<ApiConfig, AppError> {
        ApiConfig::from_lookup(false, |name| env.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_optional_values_are_missing() {
        let config = load(&base_env()).unwrap_or_else(|error| panic!("config: {error}"));

        assert_eq!(config.access_token.ttl_seconds, 8 * 60 * 60);
        assert_eq!(config.refresh_token.ttl_seconds, 24 * 60 * 60);
        assert_eq!(config.api_port, 3001);
        assert!(config.cookie_secure);
        assert_eq!(config.cookie_domain, None);
        assert_eq!(config.inclusion_depth, InclusionDepth::SingleLevel);
        assert!(config.allowed_email_domains.is_empty());
        assert!(matches!(config.email_provider, EmailProviderConfig::Console));
        assert_eq!(config.rate_limit_store, RateLimitStoreConfig::Postgres);
        assert_eq!(config.client_address_source, ClientAddressSource::Peer);
    }

    #[test]
    fn proxy_headers_are_trusted_only_when_enabled() {
        let mut env = base_env();
        env.insert("TRUST_PROXY_HEADERS", "TRUE".to_owned());
        let config = load(&env).unwrap_or_else(|error| panic!("config: {error}"));
        assert_eq!(config.client_address_source, ClientAddressSource::TrustedProxy);

        env.insert("TRUST_PROXY_HEADERS", "yes".to_owned());
        assert!(matches!(load(&env), Err(AppError::Validation(_))));
    }

    #[test]
    fn short_or_shared_secrets_are_rejected() {
        let mut env = base_env();
        env.insert("ACCESS_TOKEN_SECRET", "short".to_owned());
        assert!(matches!(load(&env), Err(AppError::Validation(_))));

        let mut env = base_env();
        env.insert("REFRESH_TOKEN_SECRET", "a".repeat(32));
        assert!(matches!(load(&env), Err(AppError::Validation(_))));
    }

    #[test]
    fn parses_depth_domains_and_cookie_settings() {
        let mut env = base_env();
        env.insert("ROLE_INCLUSION_DEPTH", "transitive".to_owned());
        env.insert("ALLOWED_EMAIL_DOMAINS", "Example.com, corp.test ,".to_owned());
        env.insert("COOKIE_DOMAIN", ".example.com".to_owned());
        env.insert("COOKIE_SECURE", "false".to_owned());

        let config = load(&env).unwrap_or_else(|error| panic!("config: {error}"));

        assert_eq!(config.inclusion_depth, InclusionDepth::Transitive);
        assert_eq!(
            config.allowed_email_domains,
            vec!["example.com".to_owned(), "corp.test".to_owned()]
        );
        assert_eq!(config.cookie_domain.as_deref(), Some(".example.com"));
        assert!(!config.cookie_secure);
    }

    #[test]
    fn redis_store_requires_redis_url() {
        let mut env = base_env();
        env.insert("RATE_LIMIT_STORE", "redis".to_owned());
        assert!(load(&env).is_err());

        env.insert("REDIS_URL", "redis://127.0.0.1:6379".to_owned());
        let config = load(&env).unwrap_or_else(|error| panic!("config: {error}"));
        assert_eq!(config.rate_limit_store, RateLimitStoreConfig::Redis);
    }

    #[test]
    fn migrate_only_needs_only_the_database() {
        let env = HashMap::from([("DATABASE_URL", "postgres://localhost/rolegate".to_owned())]);
        let config = ApiConfig::from_lookup(true, |name| env.get(name).cloned());
        assert!(config.is_ok_and(|config| config.migrate_only));
    }

    #[test]
    fn non_positive_ttl_is_rejected() {
        let mut env = base_env();
        env.insert("ACCESS_TOKEN_TTL_SECONDS", "0".to_owned());
        assert!(load(&env).is_err());
    }
}
