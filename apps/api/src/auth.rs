use axum::Json;
use axum::extract::{Extension, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use rolegate_application::IssuedSession;
use rolegate_core::UserIdentity;

use crate::dto::{
    GenericMessageResponse, GetTokenRequest, PrincipalResponse, RequestCodeRequest,
    SessionResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

mod cookies;
pub mod rate_limits;
mod request_context;

pub use cookies::{RefreshCookieSettings, read_refresh_cookie};
pub use request_context::{ClientAddressSource, ClientContext, client_context};

const LOGIN_CODE_SENT_MESSAGE: &str = "if this address may sign in, a login code has been sent";

type SessionReply = ([(HeaderName, HeaderValue); 1], Json<SessionResponse>);

pub async fn request_code_handler(
    State(state): State<AppState>,
    ClientContext(context): ClientContext,
    Json(payload): Json<RequestCodeRequest>,
) -> ApiResult<Json<GenericMessageResponse>> {
    state
        .rate_limit_service
        .check_rate_limit(
            &rate_limits::REQUEST_CODE_PER_EMAIL,
            &context,
            Some(&payload.email),
        )
        .await?;
    state
        .auth_session_service
        .request_login_code(&payload.email, &context)
        .await?;

    Ok(Json(GenericMessageResponse {
        message: LOGIN_CODE_SENT_MESSAGE.to_owned(),
    }))
}

pub async fn get_token_handler(
    State(state): State<AppState>,
    ClientContext(context): ClientContext,
    headers: HeaderMap,
    Json(payload): Json<GetTokenRequest>,
) -> ApiResult<SessionReply> {
    state
        .rate_limit_service
        .check_rate_limit(
            &rate_limits::GET_TOKEN_PER_EMAIL,
            &context,
            Some(&payload.email),
        )
        .await?;
    let presented = read_refresh_cookie(&headers);
    let session = state
        .auth_session_service
        .login_with_code(
            &payload.email,
            &payload.code,
            presented.as_deref(),
            &context,
        )
        .await?;

    session_reply(&state.refresh_cookie, session)
}

pub async fn refresh_token_handler(
    State(state): State<AppState>,
    ClientContext(context): ClientContext,
    headers: HeaderMap,
) -> ApiResult<SessionReply> {
    let presented = read_refresh_cookie(&headers);
    let session = state
        .auth_session_service
        .refresh(presented.as_deref(), &context)
        .await?;

    session_reply(&state.refresh_cookie, session)
}

pub async fn logout_handler(
    State(state): State<AppState>,
    ClientContext(context): ClientContext,
    headers: HeaderMap,
) -> ApiResult<(StatusCode, [(HeaderName, HeaderValue); 1])> {
    let presented = read_refresh_cookie(&headers);
    state
        .auth_session_service
        .logout(presented.as_deref(), &context)
        .await?;

    Ok((
        StatusCode::NO_CONTENT,
        [(SET_COOKIE, state.refresh_cookie.clear()?)],
    ))
}

pub async fn me_handler(Extension(user): Extension<UserIdentity>) -> Json<PrincipalResponse> {
    Json(PrincipalResponse::from(&user))
}

fn session_reply(
    cookie: &RefreshCookieSettings,
    session: IssuedSession,
) -> ApiResult<SessionReply> {
    let set_cookie = cookie.issue(&session.refresh_token, session.refresh_max_age_seconds)?;
    Ok(([(SET_COOKIE, set_cookie)], Json(SessionResponse::from(session))))
}
