//! Guest directory: principals' public profiles, admin-only.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;

use super::error::{ApiError, ResultExt, validate_uuid};
use crate::auth::{AdminOnly, Auth, TokenTransport};
use crate::db::{Database, Profile};
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;

#[derive(Clone)]
pub struct GuestsState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub transport: TokenTransport,
}

impl_has_auth_backend!(GuestsState);

pub fn router(state: GuestsState) -> Router {
    Router::new()
        .route("/", get(list_guests))
        .route("/{id}", get(get_guest))
        .with_state(state)
}

#[derive(Serialize)]
struct GuestListResponse {
    guests: Vec<Profile>,
}

#[derive(Serialize)]
struct GuestResponse {
    guest: Profile,
}

async fn list_guests(
    State(state): State<GuestsState>,
    _auth: Auth<AdminOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let guests = state
        .db
        .users()
        .list()
        .await
        .db_err("Failed to list guests")?
        .iter()
        .map(|user| user.profile())
        .collect();

    Ok(Json(GuestListResponse { guests }))
}

async fn get_guest(
    State(state): State<GuestsState>,
    _auth: Auth<AdminOnly>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    validate_uuid(&id)?;

    let guest = state
        .db
        .users()
        .get_by_id(&id)
        .await
        .db_err("Failed to get guest")?
        .ok_or_else(|| ApiError::not_found("Guest not found"))?
        .profile();

    Ok(Json(GuestResponse { guest }))
}
