//! Session endpoints.
//!
//! - POST `/register` - Create a principal (no tokens issued)
//! - POST `/login` - Verify credentials, set access and refresh cookies
//! - POST `/logout` - Revoke the stored session and clear both cookies
//! - POST `/refresh` - Exchange the refresh cookie for a new access cookie
//!
//! When the gate accepts bearer tokens, login and refresh also return the
//! access token in the body as `access_token`.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
    routing::post,
};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::auth::{
    AuthService, REFRESH_COOKIE_NAME, Registration, TokenTransport, access_cookie,
    clear_access_cookie, clear_refresh_cookie, get_cookie, refresh_cookie,
};
use crate::db::{Profile, UserRole};

#[derive(Clone)]
pub struct AuthState {
    pub service: AuthService,
    pub secure_cookies: bool,
    pub transport: TokenTransport,
}

impl AuthState {
    /// The token goes in the body only when a client could present it as a header.
    fn body_token(&self, token: &str) -> Option<String> {
        (self.transport != TokenTransport::Cookie).then(|| token.to_string())
    }
}

pub fn router(state: AuthState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/refresh", post(refresh))
        .with_state(state)
}

#[derive(Deserialize)]
struct RegisterRequest {
    email: String,
    password: String,
    #[serde(alias = "name", default)]
    full_name: String,
    phone: Option<String>,
    role: Option<UserRole>,
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

async fn register(
    State(state): State<AuthState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .service
        .register(Registration {
            email: &payload.email,
            password: &payload.password,
            full_name: payload.full_name.trim(),
            phone: payload.phone.as_deref(),
            role: payload.role,
        })
        .await?;

    Ok(Json(MessageResponse {
        message: "User created successfully",
    }))
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .service
        .login(&payload.email, &payload.password)
        .await?;

    Ok((
        AppendHeaders([
            (
                SET_COOKIE,
                refresh_cookie(&outcome.refresh.token, state.secure_cookies),
            ),
            (
                SET_COOKIE,
                access_cookie(&outcome.access.token, state.secure_cookies),
            ),
        ]),
        Json(LoginResponse {
            access_token: state.body_token(&outcome.access.token),
            profile: outcome.profile,
        }),
    ))
}

#[derive(Serialize)]
struct LoginResponse {
    #[serde(flatten)]
    profile: Profile,
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
}

#[derive(Serialize)]
struct SuccessResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
}

/// Always succeeds. Both cookies are cleared whether or not a session existed.
///
/// Browsers never send the refresh cookie here (it is scoped to `/auth/refresh`),
/// so the access token identifies whose stored session to revoke.
async fn logout(State(state): State<AuthState>, headers: HeaderMap) -> impl IntoResponse {
    state
        .service
        .logout(
            get_cookie(&headers, REFRESH_COOKIE_NAME),
            state.transport.access_token(&headers),
        )
        .await;

    (
        AppendHeaders([
            (SET_COOKIE, clear_access_cookie(state.secure_cookies)),
            (SET_COOKIE, clear_refresh_cookie(state.secure_cookies)),
        ]),
        Json(SuccessResponse {
            success: true,
            access_token: None,
        }),
    )
}

async fn refresh(
    State(state): State<AuthState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let access = state
        .service
        .refresh(get_cookie(&headers, REFRESH_COOKIE_NAME))
        .await?;

    Ok((
        [(SET_COOKIE, access_cookie(&access.token, state.secure_cookies))],
        Json(SuccessResponse {
            success: true,
            access_token: state.body_token(&access.token),
        }),
    ))
}
