//! Where the gate looks for the access token.

use axum::http::{HeaderMap, header};

use super::cookie::{ACCESS_COOKIE_NAME, get_cookie};

/// Access-token carrier accepted by the authorization gate.
///
/// A deployment that requires one carrier never falls back to the other.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TokenTransport {
    /// `access_token` cookie only.
    #[default]
    Cookie,
    /// `Authorization: Bearer` header only.
    Bearer,
    /// Cookie first, then the header.
    Either,
}

impl TokenTransport {
    /// Extract the access token from the configured carrier(s).
    pub fn access_token<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        match self {
            TokenTransport::Cookie => get_cookie(headers, ACCESS_COOKIE_NAME),
            TokenTransport::Bearer => bearer_token(headers),
            TokenTransport::Either => {
                get_cookie(headers, ACCESS_COOKIE_NAME).or_else(|| bearer_token(headers))
            }
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
