//! Attempt budgets for the login endpoints, per 15 minute window.

use rolegate_application::RateLimitRule;

const WINDOW_SECONDS: i64 = 15 * 60;

pub const REQUEST_CODE_PER_CLIENT: RateLimitRule =
    RateLimitRule::per_client("request_code", 5, WINDOW_SECONDS);

/// Bounds how many code emails one mailbox receives.
pub const REQUEST_CODE_PER_EMAIL: RateLimitRule =
    RateLimitRule::per_email("request_code", 3, WINDOW_SECONDS);

pub const GET_TOKEN_PER_CLIENT: RateLimitRule =
    RateLimitRule::per_client("get_token", 10, WINDOW_SECONDS);

/// Bounds code guesses against one account across client addresses.
pub const GET_TOKEN_PER_EMAIL: RateLimitRule =
    RateLimitRule::per_email("get_token", 5, WINDOW_SECONDS);
