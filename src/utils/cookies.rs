//! Session cookies.
//!
//! `session_token` is httpOnly and carries the signed session token.
//! `user_info` is readable by the browser and holds the normalized user as
//! percent-encoded JSON.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::Value;
use time::Duration;

use seitech_config::SessionConfig;
use seitech_config::session::{SESSION_COOKIE, USER_INFO_COOKIE};

use crate::utils::url::encode_component;

fn build(name: &'static str, value: String, http_only: bool, max_age: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .max_age(Duration::seconds(max_age))
        .same_site(SameSite::Lax)
        .http_only(http_only)
        .secure(secure)
        .build()
}

pub fn session_cookie(token: &str, config: &SessionConfig) -> Cookie<'static> {
    build(
        SESSION_COOKIE,
        token.to_string(),
        true,
        config.max_age_secs,
        config.secure_cookies,
    )
}

pub fn user_info_cookie(user: &Value, config: &SessionConfig) -> Cookie<'static> {
    build(
        USER_INFO_COOKIE,
        encode_component(&user.to_string()),
        false,
        config.max_age_secs,
        config.secure_cookies,
    )
}

/// Both cookies for a fresh session.
pub fn with_session(jar: CookieJar, token: &str, user: &Value, config: &SessionConfig) -> CookieJar {
    jar.add(session_cookie(token, config))
        .add(user_info_cookie(user, config))
}

/// Expire both session cookies.
pub fn clear_session(jar: CookieJar, config: &SessionConfig) -> CookieJar {
    jar.add(build(SESSION_COOKIE, String::new(), true, 0, config.secure_cookies))
        .add(build(USER_INFO_COOKIE, String::new(), false, 0, config.secure_cookies))
}
