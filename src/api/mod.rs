mod auth;
mod error;
mod guests;
mod health;
mod hotels;
mod reservations;
mod rooms;

use axum::Router;
use std::sync::Arc;

use crate::auth::{AuthService, TokenTransport};
use crate::db::Database;
use crate::jwt::JwtConfig;

pub use error::ApiError;

/// Create the API router.
pub fn create_api_router(
    db: Database,
    jwt: Arc<JwtConfig>,
    transport: TokenTransport,
    secure_cookies: bool,
) -> Router {
    let auth_state = auth::AuthState {
        service: AuthService::new(db.clone(), jwt.clone()),
        secure_cookies,
        transport,
    };

    let hotels_state = hotels::HotelsState {
        db: db.clone(),
        jwt: jwt.clone(),
        transport,
    };

    let rooms_state = rooms::RoomsState {
        db: db.clone(),
        jwt: jwt.clone(),
        transport,
    };

    let reservations_state = reservations::ReservationsState {
        db: db.clone(),
        jwt: jwt.clone(),
        transport,
    };

    let guests_state = guests::GuestsState {
        db: db.clone(),
        jwt,
        transport,
    };

    let health_state = health::HealthState { db };

    Router::new()
        .nest("/auth", auth::router(auth_state))
        .nest("/hotels", hotels::router(hotels_state))
        .nest("/rooms", rooms::router(rooms_state))
        .nest("/reservations", reservations::router(reservations_state))
        .nest("/guests", guests::router(guests_state))
        .nest("/health", health::router(health_state))
}
