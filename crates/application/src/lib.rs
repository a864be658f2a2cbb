//! Application services and ports.

#![forbid(unsafe_code)]

mod audit_ports;
mod auth_event_service;
mod auth_session_ports;
mod auth_session_service;
mod authorization_service;
mod rate_limit_service;
mod role_bootstrap_service;
mod role_graph;
mod security_admin_ports;
mod security_admin_service;
mod user_ports;

pub use audit_ports::{AuditEvent, AuditRepository};
pub use auth_event_service::{
    AuthEvent, AuthEventRepository, AuthEventService, AuthEventType, RequestContext,
};
pub use auth_session_ports::{
    EmailService, RefreshTokenRepository, TokenClaims, TokenKind, TokenSigner,
};
pub use auth_session_service::{
    AuthSessionPorts, AuthSessionService, EmailDomainPolicy, IssuedSession, SessionUser,
};
pub use authorization_service::AuthorizationService;
pub use rate_limit_service::{
    AttemptWindow, RateLimitRepository, RateLimitRule, RateLimitScope, RateLimitService,
};
pub use role_bootstrap_service::{
    BASELINE_PERMISSIONS, BASELINE_ROLES, BaselinePermission, BaselineRole, RoleBootstrapService,
};
pub use role_graph::{
    EffectiveRole, EffectiveRoles, PermissionDefinition, RoleDefinition, RoleGraphResolver,
    RoleRepository, permission_names,
};
pub use security_admin_ports::{
    PruneSummary, SavePermissionInput, SaveRoleInput, SaveRoleRequest, SecurityAdminRepository,
};
pub use security_admin_service::SecurityAdminService;
pub use user_ports::{CodeHasher, UserRecord, UserRepository};
