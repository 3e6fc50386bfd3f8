//! The authorization gate and its axum extractor.
//!
//! The gate is stateless: it verifies the access token and checks the role,
//! and never consults the credential store. A revoked session is caught at
//! the next refresh, at most one access-token lifetime later.

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::HeaderMap, http::request::Parts};

use super::errors::{ApiAuthError, AuthErrorKind};
use super::state::HasAuthBackend;
use super::types::AuthenticatedUser;
use crate::db::UserRole;

/// A set of roles allowed through the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleSet(u8);

impl RoleSet {
    const fn bit(role: UserRole) -> u8 {
        match role {
            UserRole::User => 1,
            UserRole::Admin => 2,
        }
    }

    pub const fn of(roles: &[UserRole]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < roles.len() {
            bits |= Self::bit(roles[i]);
            i += 1;
        }
        RoleSet(bits)
    }

    pub const fn contains(self, role: UserRole) -> bool {
        self.0 & Self::bit(role) != 0
    }
}

/// Type-level role set for the `Auth` extractor.
pub trait RoleConstraint: Send + Sync + 'static {
    const ALLOWED: RoleSet;
}

/// Any authenticated principal (`user` or `admin`).
pub struct AnyRole;

impl RoleConstraint for AnyRole {
    const ALLOWED: RoleSet = RoleSet::of(&[UserRole::User, UserRole::Admin]);
}

/// Admins only.
pub struct AdminOnly;

impl RoleConstraint for AdminOnly {
    const ALLOWED: RoleSet = RoleSet::of(&[UserRole::Admin]);
}

/// Authenticate a request and check its role against `allowed`.
pub fn authorize<S>(
    headers: &HeaderMap,
    state: &S,
    allowed: RoleSet,
) -> Result<AuthenticatedUser, ApiAuthError>
where
    S: HasAuthBackend + ?Sized,
{
    let token = state
        .transport()
        .access_token(headers)
        .ok_or(ApiAuthError::new(AuthErrorKind::MissingToken))?;

    let claims = state
        .jwt()
        .verify_access(token)
        .map_err(|_| ApiAuthError::new(AuthErrorKind::InvalidToken))?;

    if !allowed.contains(claims.role) {
        tracing::debug!(user_id = %claims.user_id, role = %claims.role, "Role not permitted");
        return Err(ApiAuthError::new(AuthErrorKind::InsufficientRole));
    }

    Ok(claims.into())
}

/// Extractor for routes guarded by the authorization gate.
///
/// ```ignore
/// async fn delete_hotel(auth: Auth<AdminOnly>, ...) { let id = auth.user.user_id; }
/// ```
pub struct Auth<R: RoleConstraint = AnyRole> {
    pub user: AuthenticatedUser,
    _role: PhantomData<R>,
}

impl<S, R> FromRequestParts<S> for Auth<R>
where
    S: HasAuthBackend + Send + Sync,
    R: RoleConstraint,
{
    type Rejection = ApiAuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = authorize(&parts.headers, state, R::ALLOWED)?;
        Ok(Auth {
            user,
            _role: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenTransport;
    use crate::jwt::JwtConfig;
    use axum::http::{HeaderValue, header};

    struct Backend {
        jwt: JwtConfig,
        transport: TokenTransport,
    }

    impl HasAuthBackend for Backend {
        fn jwt(&self) -> &JwtConfig {
            &self.jwt
        }
        fn transport(&self) -> TokenTransport {
            self.transport
        }
    }

    fn backend() -> Backend {
        Backend {
            jwt: JwtConfig::new(
                b"access-secret-key-for-testing-0000",
                b"refresh-secret-key-for-testing-000",
            ),
            transport: TokenTransport::Cookie,
        }
    }

    fn cookie_headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("access_token={}", token)).unwrap(),
        );
        headers
    }

    #[test]
    fn test_role_set() {
        assert!(AnyRole::ALLOWED.contains(UserRole::User));
        assert!(AnyRole::ALLOWED.contains(UserRole::Admin));
        assert!(!AdminOnly::ALLOWED.contains(UserRole::User));
        assert!(!RoleSet::of(&[]).contains(UserRole::Admin));
        assert_eq!(
            RoleSet::of(&[UserRole::Admin, UserRole::User]),
            AnyRole::ALLOWED
        );
    }

    #[test]
    fn test_missing_token() {
        let err = authorize(&HeaderMap::new(), &backend(), AnyRole::ALLOWED).unwrap_err();
        assert_eq!(err.kind, AuthErrorKind::MissingToken);
    }

    #[test]
    fn test_invalid_token() {
        let err = authorize(&cookie_headers("garbage"), &backend(), AnyRole::ALLOWED).unwrap_err();
        assert_eq!(err.kind, AuthErrorKind::InvalidToken);
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let backend = backend();
        let refresh = backend.jwt.issue_refresh("user-1").unwrap();

        let err = authorize(
            &cookie_headers(&refresh.token),
            &backend,
            AnyRole::ALLOWED,
        )
        .unwrap_err();
        assert_eq!(err.kind, AuthErrorKind::InvalidToken);
    }

    #[test]
    fn test_insufficient_role() {
        let backend = backend();
        let access = backend.jwt.issue_access("user-1", UserRole::User).unwrap();

        let err = authorize(&cookie_headers(&access.token), &backend, AdminOnly::ALLOWED)
            .unwrap_err();
        assert_eq!(err.kind, AuthErrorKind::InsufficientRole);
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_allowed_role_passes_identity_through() {
        let backend = backend();
        let access = backend.jwt.issue_access("admin-1", UserRole::Admin).unwrap();

        let user = authorize(&cookie_headers(&access.token), &backend, AdminOnly::ALLOWED)
            .unwrap();
        assert_eq!(user.user_id, "admin-1");
        assert_eq!(user.role, UserRole::Admin);
    }
}
