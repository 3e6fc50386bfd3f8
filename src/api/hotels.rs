//! Hotel endpoints. Reads are open to any principal, writes are admin-only.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;

use super::error::{ApiError, ResultExt, validate_uuid};
use crate::auth::{AdminOnly, AnyRole, Auth, TokenTransport};
use crate::db::{Database, Hotel, HotelUpdate, NewHotel, is_unique_violation};
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;

#[derive(Clone)]
pub struct HotelsState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub transport: TokenTransport,
}

impl_has_auth_backend!(HotelsState);

pub fn router(state: HotelsState) -> Router {
    Router::new()
        .route("/", get(list_hotels).post(create_hotel))
        .route(
            "/{id}",
            get(get_hotel).put(update_hotel).delete(delete_hotel),
        )
        .with_state(state)
}

fn validate_star_rating(rating: i64) -> Result<(), ApiError> {
    if !(1..=5).contains(&rating) {
        return Err(ApiError::bad_request("Star rating must be between 1 and 5"));
    }
    Ok(())
}

#[derive(Serialize)]
struct HotelListResponse {
    hotels: Vec<Hotel>,
}

#[derive(Serialize)]
struct HotelResponse {
    hotel: Hotel,
}

#[derive(Serialize)]
struct HotelMessageResponse {
    message: &'static str,
    hotel: Hotel,
}

async fn list_hotels(
    State(state): State<HotelsState>,
    _auth: Auth<AnyRole>,
) -> Result<impl IntoResponse, ApiError> {
    let hotels = state
        .db
        .hotels()
        .list()
        .await
        .db_err("Failed to list hotels")?;

    Ok(Json(HotelListResponse { hotels }))
}

async fn get_hotel(
    State(state): State<HotelsState>,
    _auth: Auth<AnyRole>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    validate_uuid(&id)?;

    let hotel = state
        .db
        .hotels()
        .get(&id)
        .await
        .db_err("Failed to get hotel")?
        .ok_or_else(|| ApiError::not_found("Hotel not found"))?;

    Ok(Json(HotelResponse { hotel }))
}

async fn create_hotel(
    State(state): State<HotelsState>,
    auth: Auth<AdminOnly>,
    Json(payload): Json<NewHotel>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.name.trim().is_empty() || payload.address.trim().is_empty() {
        return Err(ApiError::bad_request("Name and address are required"));
    }
    validate_star_rating(payload.star_rating)?;

    let exists = state
        .db
        .hotels()
        .exists_with_name_and_address(&payload.name, &payload.address)
        .await
        .db_err("Failed to check for existing hotel")?;
    if exists {
        return Err(ApiError::bad_request(
            "Hotel with this name and address already exists",
        ));
    }

    let hotel = match state.db.hotels().create(&payload).await {
        Ok(hotel) => hotel,
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::bad_request(
                "Hotel with this name and address already exists",
            ));
        }
        Err(e) => return Err(ApiError::db_error("Failed to create hotel", e)),
    };

    tracing::info!(hotel_id = %hotel.id, admin_id = %auth.user.user_id, "Hotel created");

    Ok((
        StatusCode::CREATED,
        Json(HotelMessageResponse {
            message: "Hotel created successfully",
            hotel,
        }),
    ))
}

async fn update_hotel(
    State(state): State<HotelsState>,
    _auth: Auth<AdminOnly>,
    Path(id): Path<String>,
    Json(payload): Json<HotelUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    validate_uuid(&id)?;
    if let Some(rating) = payload.star_rating {
        validate_star_rating(rating)?;
    }

    let hotel = match state.db.hotels().update(&id, &payload).await {
        Ok(hotel) => hotel,
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::bad_request(
                "Hotel with this name and address already exists",
            ));
        }
        Err(e) => return Err(ApiError::db_error("Failed to update hotel", e)),
    }
    .ok_or_else(|| ApiError::not_found("Hotel not found"))?;

    Ok(Json(HotelMessageResponse {
        message: "Hotel updated successfully",
        hotel,
    }))
}

async fn delete_hotel(
    State(state): State<HotelsState>,
    _auth: Auth<AdminOnly>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    validate_uuid(&id)?;

    let hotel = state
        .db
        .hotels()
        .delete(&id)
        .await
        .db_err("Failed to delete hotel")?
        .ok_or_else(|| ApiError::not_found("Hotel not found"))?;

    Ok(Json(HotelMessageResponse {
        message: "Hotel deleted successfully",
        hotel,
    }))
}
