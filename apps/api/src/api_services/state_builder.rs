use rolegate_application::{AuthSessionPorts, AuthSessionService, EmailDomainPolicy};
use rolegate_core::AppError;
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::auth::RefreshCookieSettings;
use crate::state::AppState;

use super::email::build_email_service;
use super::redis::connect_redis;

mod rate_limit;
mod repositories;
mod security;
mod tokens;

/// Wires adapters and services, then seeds the baseline roles.
pub async fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let redis_connection = match config.redis_url.as_deref() {
        Some(redis_url) => Some(connect_redis(redis_url).await?),
        None => None,
    };

    let repositories = repositories::build_repository_set(&pool);
    let security_services = security::build_security_services(&repositories, config);
    security_services.role_bootstrap_service.ensure_baseline().await?;

    let rate_limit_service =
        rate_limit::build_rate_limit_service(&pool, config, redis_connection.clone())?;

    let auth_session_service = AuthSessionService::new(
        AuthSessionPorts {
            user_repository: repositories.user_repository.clone(),
            refresh_tokens: repositories.refresh_token_repository.clone(),
            code_hasher: tokens::build_code_hasher(),
            token_signer: tokens::build_token_signer(config),
            email_service: build_email_service(config)?,
        },
        security_services.authorization_service.clone(),
        security_services.auth_event_service.clone(),
        EmailDomainPolicy::new(config.allowed_email_domains.clone()),
    );

    Ok(AppState {
        auth_session_service,
        security_admin_service: security_services.security_admin_service,
        rate_limit_service,
        refresh_cookie: RefreshCookieSettings {
            domain: config.cookie_domain.clone(),
            secure: config.cookie_secure,
        },
        client_address_source: config.client_address_source,
        postgres_pool: pool,
        redis_connection,
    })
}
