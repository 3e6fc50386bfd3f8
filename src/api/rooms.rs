//! Room endpoints. Listing is open to any principal, writes are admin-only.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use serde::Serialize;
use std::sync::Arc;

use super::error::{ApiError, ResultExt, validate_uuid};
use crate::auth::{AdminOnly, AnyRole, Auth, TokenTransport};
use crate::db::{Database, NewRoom, Room, RoomUpdate, is_unique_violation};
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;

#[derive(Clone)]
pub struct RoomsState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub transport: TokenTransport,
}

impl_has_auth_backend!(RoomsState);

pub fn router(state: RoomsState) -> Router {
    Router::new()
        .route("/", get(list_rooms).post(create_room))
        .route("/{id}", put(update_room).delete(delete_room))
        .with_state(state)
}

fn room_exists() -> ApiError {
    ApiError::bad_request("Room already exists")
}

#[derive(Serialize)]
struct RoomListResponse {
    rooms: Vec<Room>,
}

#[derive(Serialize)]
struct RoomMessageResponse {
    message: &'static str,
    room: Room,
}

async fn list_rooms(
    State(state): State<RoomsState>,
    _auth: Auth<AnyRole>,
) -> Result<impl IntoResponse, ApiError> {
    let rooms = state
        .db
        .rooms()
        .list()
        .await
        .db_err("Failed to list rooms")?;

    Ok(Json(RoomListResponse { rooms }))
}

async fn create_room(
    State(state): State<RoomsState>,
    _auth: Auth<AdminOnly>,
    Json(payload): Json<NewRoom>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.room_number.trim().is_empty() {
        return Err(ApiError::bad_request("Room number is required"));
    }

    let existing = state
        .db
        .rooms()
        .get_by_number(&payload.room_number)
        .await
        .db_err("Failed to check room number")?;
    if existing.is_some() {
        return Err(room_exists());
    }

    let room = match state.db.rooms().create(&payload).await {
        Ok(room) => room,
        Err(e) if is_unique_violation(&e) => return Err(room_exists()),
        Err(e) => return Err(ApiError::db_error("Failed to create room", e)),
    };

    Ok((
        StatusCode::CREATED,
        Json(RoomMessageResponse {
            message: "Room created successfully",
            room,
        }),
    ))
}

async fn update_room(
    State(state): State<RoomsState>,
    _auth: Auth<AdminOnly>,
    Path(id): Path<String>,
    Json(payload): Json<RoomUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    validate_uuid(&id)?;

    let room = match state.db.rooms().update(&id, &payload).await {
        Ok(room) => room,
        Err(e) if is_unique_violation(&e) => return Err(room_exists()),
        Err(e) => return Err(ApiError::db_error("Failed to update room", e)),
    }
    .ok_or_else(|| ApiError::not_found("Room not found"))?;

    Ok(Json(RoomMessageResponse {
        message: "Room updated successfully",
        room,
    }))
}

async fn delete_room(
    State(state): State<RoomsState>,
    _auth: Auth<AdminOnly>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    validate_uuid(&id)?;

    let room = state
        .db
        .rooms()
        .delete(&id)
        .await
        .db_err("Failed to delete room")?
        .ok_or_else(|| ApiError::not_found("Room not found"))?;

    Ok(Json(RoomMessageResponse {
        message: "Room deleted successfully",
        room,
    }))
}
