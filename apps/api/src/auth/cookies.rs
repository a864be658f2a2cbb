//! The `rt` refresh cookie.

use axum::http::header::COOKIE;
use axum::http::{HeaderMap, HeaderValue};
use rolegate_core::{AppError, AppResult};
use tower_sessions::cookie::time::Duration;
use tower_sessions::cookie::{Cookie, SameSite};

pub const REFRESH_COOKIE_NAME: &str = "rt";

/// Attributes of the refresh cookie. It is always HttpOnly with `SameSite=None`.
#[derive(Debug, Clone)]
pub struct RefreshCookieSettings {
    pub domain: Option<String>,
    pub secure: bool,
}

impl RefreshCookieSettings {
    /// Returns a `Set-Cookie` value carrying `token` for `max_age_seconds`.
    pub fn issue(&self, token: &str, max_age_seconds: i64) -> AppResult<HeaderValue> {
        let cookie = self.build(token.to_owned(), Duration::seconds(max_age_seconds));
        header_value(&cookie)
    }

    /// Returns a `Set-Cookie` value that removes the cookie.
    pub fn clear(&self) -> AppResult<HeaderValue> {
        let mut cookie = self.build(String::new(), Duration::ZERO);
        cookie.make_removal();
        header_value(&cookie)
    }

    fn build(&self, value: String, max_age: Duration) -> Cookie<'static> {
        let mut builder = Cookie::build((REFRESH_COOKIE_NAME, value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::None)
            .max_age(max_age);
        if let Some(domain) = &self.domain {
            builder = builder.domain(domain.clone());
        }

        builder.build()
    }
}

fn header_value(cookie: &Cookie<'_>) -> AppResult<HeaderValue> {
    HeaderValue::from_str(&cookie.to_string())
        .map_err(|error| AppError::Internal(format!("invalid refresh cookie header: {error}")))
}

/// Reads a non-empty `rt` cookie from the request headers.
pub fn read_refresh_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| Cookie::parse(pair.trim()).ok())
        .find(|cookie| cookie.name() == REFRESH_COOKIE_NAME)
        .map(|cookie| cookie.value().to_owned())
        .filter(|value| !value.is_empty())
}
