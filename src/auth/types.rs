//! Authentication user types.

use crate::db::UserRole;
use crate::jwt::AccessClaims;

/// Caller identity established by the authorization gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub role: UserRole,
}

impl From<AccessClaims> for AuthenticatedUser {
    fn from(claims: AccessClaims) -> Self {
        Self {
            user_id: claims.user_id,
            role: claims.role,
        }
    }
}
