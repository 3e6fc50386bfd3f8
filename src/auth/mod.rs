//! Session authentication with role-based access control.
//!
//! Dual-token system: short-lived access tokens (10 min, stateless, checked
//! by the gate) and long-lived refresh tokens (7 days, one stored per
//! principal). The client renews an expired access token through
//! `/auth/refresh`; the server never refreshes implicitly.

mod cookie;
mod errors;
mod extractors;
mod service;
mod state;
mod transport;
mod types;

pub use cookie::{
    ACCESS_COOKIE_MAX_AGE_SECS, ACCESS_COOKIE_NAME, REFRESH_COOKIE_MAX_AGE_SECS,
    REFRESH_COOKIE_NAME, REFRESH_COOKIE_PATH, access_cookie, clear_access_cookie,
    clear_refresh_cookie, get_cookie, refresh_cookie,
};
pub use errors::{ApiAuthError, AuthErrorKind};
pub use extractors::{AdminOnly, AnyRole, Auth, RoleConstraint, RoleSet, authorize};
pub use service::{AuthError, AuthService, LoginOutcome, Registration, UnauthorizedReason};
pub use state::HasAuthBackend;
pub use transport::{TokenTransport, bearer_token};
pub use types::AuthenticatedUser;
