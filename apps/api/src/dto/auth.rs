use rolegate_application::{IssuedSession, SessionUser};
use rolegate_core::{IdentityRole, UserIdentity};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for a login code request.
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "request-code-request.ts")]
pub struct RequestCodeRequest {
    pub email: String,
}

/// Incoming payload for code login.
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "get-token-request.ts")]
pub struct GetTokenRequest {
    pub email: String,
    pub code: String,
}

/// Role reference in session and principal payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "role-ref-response.ts")]
pub struct RoleRefResponse {
    pub id: String,
    pub name: String,
}

impl From<&IdentityRole> for RoleRefResponse {
    fn from(role: &IdentityRole) -> Self {
        Self {
            id: role.id.clone(),
            name: role.name.clone(),
        }
    }
}

/// User summary returned with a session.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "session-user-response.ts")]
pub struct SessionUserResponse {
    pub id: String,
    pub email: String,
    pub roles: Vec<RoleRefResponse>,
}

impl From<SessionUser> for SessionUserResponse {
    fn from(user: SessionUser) -> Self {
        Self {
            roles: user.roles.iter().map(RoleRefResponse::from).collect(),
            id: user.id,
            email: user.email,
        }
    }
}

/// Body of `/auth/gettoken` and `/auth/refreshtoken` responses.
///
/// The refresh token travels only in the cookie.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "session-response.ts")]
pub struct SessionResponse {
    pub access_token: String,
    pub user: SessionUserResponse,
    pub permissions: Vec<String>,
}

impl From<IssuedSession> for SessionResponse {
    fn from(session: IssuedSession) -> Self {
        Self {
            access_token: session.access_token,
            user: SessionUserResponse::from(session.user),
            permissions: session.permissions,
        }
    }
}

/// Authenticated caller summary returned by `/auth/me`.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "principal-response.ts")]
pub struct PrincipalResponse {
    pub id: String,
    pub email: String,
    pub roles: Vec<RoleRefResponse>,
    pub permissions: Vec<String>,
}

impl From<&UserIdentity> for PrincipalResponse {
    fn from(identity: &UserIdentity) -> Self {
        Self {
            id: identity.subject().to_owned(),
            email: identity.email().to_owned(),
            roles: identity.roles().iter().map(RoleRefResponse::from).collect(),
            permissions: identity.permissions().iter().cloned().collect(),
        }
    }
}
