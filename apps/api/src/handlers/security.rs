use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use rolegate_core::UserIdentity;
use rolegate_domain::UserId;

use crate::dto::{AssignRoleRequest, PermissionResponse, RoleResponse, SaveRoleRequest};
use crate::error::ApiResult;
use crate::state::AppState;

mod assignments;
mod roles;

pub use assignments::{assign_role_handler, list_user_roles_handler, unassign_role_handler};
pub use roles::{
    delete_role_handler, list_permissions_handler, list_roles_handler, save_role_handler,
};
