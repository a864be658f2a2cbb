use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rolegate_core::AppError;
use tracing::error;

mod types;

pub use types::ErrorResponse;

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);

        // Internal details stay in the log.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self.0, "request failed");
            "internal server error".to_owned()
        } else {
            self.0.to_string()
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

fn status_for(error: &AppError) -> StatusCode {
    match error {
        AppError::Validation(_) => StatusCode::BAD_REQUEST,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::Conflict(_) => StatusCode::CONFLICT,
        AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        AppError::Forbidden(_) => StatusCode::FORBIDDEN,
        AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use rolegate_core::AppError;

    use super::ApiError;

    #[test]
    fn maps_error_taxonomy_to_status_codes() {
        let cases = [
            (AppError::Validation("x".to_owned()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("x".to_owned()), StatusCode::NOT_FOUND),
            (AppError::Conflict("x".to_owned()), StatusCode::CONFLICT),
            (AppError::Unauthorized("x".to_owned()), StatusCode::UNAUTHORIZED),
            (AppError::Forbidden("x".to_owned()), StatusCode::FORBIDDEN),
            (
                AppError::RateLimited("x".to_owned()),
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                AppError::Internal("x".to_owned()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(ApiError(error).into_response().status(), status);
        }
    }
}
