use super::*;

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = state
        .security_admin_service
        .list_roles(&user)
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn save_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<SaveRoleRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state
        .security_admin_service
        .save_role(&user, payload.into())
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_name): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .security_admin_service
        .delete_role(&user, role_name.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let permissions = state
        .security_admin_service
        .list_permissions(&user)
        .await?
        .into_iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}
