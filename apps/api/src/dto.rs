mod auth;
mod common;
mod security;

pub use auth::{
    GetTokenRequest, PrincipalResponse, RequestCodeRequest, RoleRefResponse, SessionResponse,
    SessionUserResponse,
};
pub use common::{GenericMessageResponse, HealthDependencyStatus, HealthResponse};
pub use security::{AssignRoleRequest, PermissionResponse, RoleResponse, SaveRoleRequest};
