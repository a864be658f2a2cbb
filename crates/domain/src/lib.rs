//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod security;
mod user;

pub use security::{
    ADMIN_ROLE, AuditAction, DEFAULT_ROLE, InclusionDepth, PermissionName, ROLE_ADMIN_ROLE,
    RoleName, USER_ADMIN_ROLE,
};
pub use user::{EmailAddress, LOGIN_CODE_LENGTH, LoginCode, UserId};
