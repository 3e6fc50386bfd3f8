//! Reservation endpoints. Listing is open to any principal, writes are admin-only.
//!
//! A reservation must reference an existing room and an existing principal
//! (the guest). Updates replace the whole record.

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
use crate::db::{Database, NewReservation, Reservation};
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;

#[derive(Clone)]
pub struct ReservationsState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub transport: TokenTransport,
}

impl_has_auth_backend!(ReservationsState);

pub fn router(state: ReservationsState) -> Router {
    Router::new()
        .route("/", get(list_reservations).post(create_reservation))
        .route("/{id}", put(update_reservation).delete(delete_reservation))
        .with_state(state)
}

#[derive(Serialize)]
struct ReservationListResponse {
    reservations: Vec<Reservation>,
}

#[derive(Serialize)]
struct ReservationMessageResponse {
    message: &'static str,
    reservation: Reservation,
}

/// Both the room and the guest must exist.
async fn check_references(db: &Database, reservation: &NewReservation) -> Result<(), ApiError> {
    let room = db
        .rooms()
        .get(&reservation.room_id)
        .await
        .db_err("Failed to look up room")?;
    if room.is_none() {
        return Err(ApiError::bad_request("Room does not exist"));
    }

    let guest = db
        .users()
        .get_by_id(&reservation.guest_id)
        .await
        .db_err("Failed to look up guest")?;
    if guest.is_none() {
        return Err(ApiError::bad_request("Guest does not exist"));
    }

    Ok(())
}

async fn list_reservations(
    State(state): State<ReservationsState>,
    _auth: Auth<AnyRole>,
) -> Result<impl IntoResponse, ApiError> {
    let reservations = state
        .db
        .reservations()
        .list()
        .await
        .db_err("Failed to list reservations")?;

    Ok(Json(ReservationListResponse { reservations }))
}

async fn create_reservation(
    State(state): State<ReservationsState>,
    _auth: Auth<AdminOnly>,
    Json(payload): Json<NewReservation>,
) -> Result<impl IntoResponse, ApiError> {
    check_references(&state.db, &payload).await?;

    let reservation = state
        .db
        .reservations()
        .create(&payload)
        .await
        .db_err("Failed to create reservation")?;

    Ok((
        StatusCode::CREATED,
        Json(ReservationMessageResponse {
            message: "Reservation created successfully",
            reservation,
        }),
    ))
}

async fn update_reservation(
    State(state): State<ReservationsState>,
    _auth: Auth<AdminOnly>,
    Path(id): Path<String>,
    Json(payload): Json<NewReservation>,
) -> Result<impl IntoResponse, ApiError> {
    validate_uuid(&id)?;
    check_references(&state.db, &payload).await?;

    let reservation = state
        .db
        .reservations()
        .replace(&id, &payload)
        .await
        .db_err("Failed to update reservation")?
        .ok_or_else(|| ApiError::not_found("Reservation not found"))?;

    Ok(Json(ReservationMessageResponse {
        message: "Reservation updated successfully",
        reservation,
    }))
}

async fn delete_reservation(
    State(state): State<ReservationsState>,
    _auth: Auth<AdminOnly>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    validate_uuid(&id)?;

    let reservation = state
        .db
        .reservations()
        .delete(&id)
        .await
        .db_err("Failed to delete reservation")?
        .ok_or_else(|| ApiError::not_found("Reservation not found"))?;

    Ok(Json(ReservationMessageResponse {
        message: "Reservation deleted successfully",
        reservation,
    }))
}
