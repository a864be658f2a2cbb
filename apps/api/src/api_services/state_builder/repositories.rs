use std::sync::Arc;

use rolegate_application::{
    AuditRepository, AuthEventRepository, RefreshTokenRepository, RoleRepository,
    SecurityAdminRepository, UserRepository,
};
use rolegate_infrastructure::{
    PostgresEventLog, PostgresRefreshTokenRepository, PostgresRoleRepository,
    PostgresSecurityAdminRepository, PostgresUserRepository,
};
use sqlx::PgPool;

pub(super) struct RepositorySet {
    pub(super) user_repository: Arc<dyn UserRepository>,
    pub(super) refresh_token_repository: Arc<dyn RefreshTokenRepository>,
    pub(super) role_repository: Arc<dyn RoleRepository>,
    pub(super) security_admin_repository: Arc<dyn SecurityAdminRepository>,
    pub(super) audit_repository: Arc<dyn AuditRepository>,
    pub(super) auth_event_repository: Arc<dyn AuthEventRepository>,
}

pub(super) fn build_repository_set(pool: &PgPool) -> RepositorySet {
    let event_log = Arc::new(PostgresEventLog::new(pool.clone()));
    RepositorySet {
        user_repository: Arc::new(PostgresUserRepository::new(pool.clone())),
        refresh_token_repository: Arc::new(PostgresRefreshTokenRepository::new(pool.clone())),
        role_repository: Arc::new(PostgresRoleRepository::new(pool.clone())),
        security_admin_repository: Arc::new(PostgresSecurityAdminRepository::new(pool.clone())),
        audit_repository: event_log.clone(),
        auth_event_repository: event_log,
    }
}
