use super::*;

pub async fn list_user_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = state
        .security_admin_service
        .list_user_roles(&user, UserId::parse(&user_id)?)
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn assign_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
    Json(payload): Json<AssignRoleRequest>,
) -> ApiResult<StatusCode> {
    state
        .security_admin_service
        .assign_role(&user, UserId::parse(&user_id)?, payload.role_name.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn unassign_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((user_id, role_name)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .security_admin_service
        .unassign_role(&user, UserId::parse(&user_id)?, role_name.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
