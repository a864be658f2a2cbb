use rolegate_application::{
    AuthEventService, AuthorizationService, RoleBootstrapService, RoleGraphResolver,
    SecurityAdminService,
};

use crate::api_config::ApiConfig;

use super::repositories::RepositorySet;

pub(super) struct SecurityServices {
    pub(super) authorization_service: AuthorizationService,
    pub(super) security_admin_service: SecurityAdminService,
    pub(super) auth_event_service: AuthEventService,
    pub(super) role_bootstrap_service: RoleBootstrapService,
}

pub(super) fn build_security_services(
    repositories: &RepositorySet,
    config: &ApiConfig,
) -> SecurityServices {
    let resolver = RoleGraphResolver::new(
        repositories.role_repository.clone(),
        config.inclusion_depth,
    );
    let authorization_service =
        AuthorizationService::new(resolver, repositories.role_repository.clone());

    let security_admin_service = SecurityAdminService::new(
        authorization_service.clone(),
        repositories.security_admin_repository.clone(),
        repositories.role_repository.clone(),
        repositories.audit_repository.clone(),
    );

    SecurityServices {
        authorization_service,
        security_admin_service,
        auth_event_service: AuthEventService::new(repositories.auth_event_repository.clone()),
        role_bootstrap_service: RoleBootstrapService::new(
            repositories.security_admin_repository.clone(),
        ),
    }
}
