use redis::aio::ConnectionManager;
use rolegate_application::{AuthSessionService, RateLimitService, SecurityAdminService};
use sqlx::PgPool;

use crate::auth::{ClientAddressSource, RefreshCookieSettings};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_session_service: AuthSessionService,
    pub security_admin_service: SecurityAdminService,
    pub rate_limit_service: RateLimitService,
    pub refresh_cookie: RefreshCookieSettings,
    pub client_address_source: ClientAddressSource,
    pub postgres_pool: PgPool,
    pub redis_connection: Option<ConnectionManager>,
}
