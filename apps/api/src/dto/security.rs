use rolegate_application::{PermissionDefinition, RoleDefinition};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// API representation of a permission.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "permission-response.ts")]
pub struct PermissionResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub is_system: bool,
}

impl From<PermissionDefinition> for PermissionResponse {
    fn from(permission: PermissionDefinition) -> Self {
        Self {
            id: permission.permission_id,
            name: permission.name,
            description: permission.description,
            is_system: permission.is_system,
        }
    }
}

/// API representation of a role with its own grants and inclusions.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "role-response.ts")]
pub struct RoleResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub is_system: bool,
    pub permissions: Vec<PermissionResponse>,
    pub included_role_names: Vec<String>,
}

impl From<RoleDefinition> for RoleResponse {
    fn from(role: RoleDefinition) -> Self {
        Self {
            id: role.role_id,
            name: role.name,
            description: role.description,
            is_system: role.is_system,
            permissions: role
                .permissions
                .into_iter()
                .map(PermissionResponse::from)
                .collect(),
            included_role_names: role.included_role_names,
        }
    }
}

/// Incoming payload for role creation or update.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "save-role-request.ts")]
pub struct SaveRoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permission_names: Vec<String>,
    #[serde(default)]
    pub included_role_names: Vec<String>,
}

impl From<SaveRoleRequest> for rolegate_application::SaveRoleRequest {
    fn from(request: SaveRoleRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            permission_names: request.permission_names,
            included_role_names: request.included_role_names,
        }
    }
}

/// Incoming payload for assigning a role to a user.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "assign-role-request.ts")]
pub struct AssignRoleRequest {
    pub role_name: String,
}

#[cfg(test)]
mod tests {
    use super::SaveRoleRequest;

    #[test]
    fn save_role_request_defaults_optional_lists() {
        let request: SaveRoleRequest = serde_json::from_str(r#"{"name": "support"}"#)
            .unwrap_or_else(|error| panic!("deserialize: {error}"));

        assert_eq!(request.name, "support");
        assert!(request.permission_names.is_empty());
        assert!(request.included_role_names.is_empty());
    }
}
