//! Session token and cookie settings.
//!
//! - `SESSION_SECRET` (falls back to `JWT_SECRET`): HMAC key for session tokens
//! - `SESSION_MAX_AGE_SECS`: Token and cookie lifetime (default 7 days)
//! - `COOKIE_SECURE`: Mark cookies `Secure` (default: true outside development)

use std::env;

use crate::{env_flag, env_or};

pub const SESSION_COOKIE: &str = "session_token";
pub const USER_INFO_COOKIE: &str = "user_info";

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub secret: String,
    pub max_age_secs: i64,
    pub secure_cookies: bool,
}

impl SessionConfig {
    pub fn from_env() -> Self {
        let production = env::var("ENVIRONMENT")
            .map(|e| e.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        Self {
            secret: env::var("SESSION_SECRET")
                .or_else(|_| env::var("JWT_SECRET"))
                .unwrap_or_else(|_| "change-me-in-production".into()),
            max_age_secs: env_or("SESSION_MAX_AGE_SECS", 7 * 24 * 60 * 60),
            secure_cookies: env_flag("COOKIE_SECURE", production),
        }
    }
}
