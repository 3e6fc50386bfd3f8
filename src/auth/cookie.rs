//! Session cookies: parsing the `Cookie` header and building `Set-Cookie` values.
//!
//! The cookie lifetimes are independent of the tokens' own expiry. The access
//! cookie lives 5 minutes although the token inside is valid for 10.

use axum::http::header;

use crate::jwt::REFRESH_TOKEN_DURATION_SECS;

/// Cookie name for the access token (site-wide, 5 minutes).
pub const ACCESS_COOKIE_NAME: &str = "access_token";

/// Cookie name for the refresh token (refresh endpoint only, 7 days).
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// The only path the browser sends the refresh cookie to.
pub const REFRESH_COOKIE_PATH: &str = "/auth/refresh";

pub const ACCESS_COOKIE_MAX_AGE_SECS: u64 = 5 * 60;

pub const REFRESH_COOKIE_MAX_AGE_SECS: u64 = REFRESH_TOKEN_DURATION_SECS;

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a axum::http::HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                let value = value.trim();
                return (!value.is_empty()).then_some(value);
            }
        }
    }
    None
}

fn build(name: &str, value: &str, path: &str, max_age: u64, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path={}; Max-Age={}{}",
        name, value, path, max_age, secure
    )
}

/// `Set-Cookie` value carrying a fresh access token.
pub fn access_cookie(token: &str, secure: bool) -> String {
    build(
        ACCESS_COOKIE_NAME,
        token,
        "/",
        ACCESS_COOKIE_MAX_AGE_SECS,
        secure,
    )
}

/// `Set-Cookie` value carrying a fresh refresh token.
pub fn refresh_cookie(token: &str, secure: bool) -> String {
    build(
        REFRESH_COOKIE_NAME,
        token,
        REFRESH_COOKIE_PATH,
        REFRESH_COOKIE_MAX_AGE_SECS,
        secure,
    )
}

/// Expire the access cookie. Path must match the one it was set with.
pub fn clear_access_cookie(secure: bool) -> String {
    build(ACCESS_COOKIE_NAME, "", "/", 0, secure)
}

/// Expire the refresh cookie. Path must match the one it was set with.
pub fn clear_refresh_cookie(secure: bool) -> String {
    build(REFRESH_COOKIE_NAME, "", REFRESH_COOKIE_PATH, 0, secure)
}
