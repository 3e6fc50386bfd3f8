//! Register, login, logout and refresh.
//!
//! There is no server-side session object. The only mutable state is the
//! refresh token stored on the principal's record, which makes refresh
//! tokens dual-gated: a presented token must verify *and* match the stored
//! value. Clearing or overwriting the stored value revokes it.

use std::sync::Arc;

use tracing::{debug, info};

use crate::db::{Database, NewUser, Profile, UserRole, is_unique_violation};
use crate::jwt::{IssuedToken, JwtConfig, TokenError};
use crate::password::{PasswordError, hash_password, verify_password};

/// Why a refresh was refused. The client reacts differently to each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UnauthorizedReason {
    #[error("No refresh token sent")]
    NoTokenSent,
    #[error("Invalid refresh token")]
    InvalidToken,
    /// The token verifies but is no longer the one stored for the principal.
    #[error("No refresh token, please login again")]
    Revoked,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    BadRequest(&'static str),
    #[error("User already exists")]
    Conflict,
    #[error("User not found")]
    NotFound,
    #[error("Invalid password")]
    Forbidden,
    #[error("{0}")]
    Unauthorized(UnauthorizedReason),
    #[error("storage error: {0}")]
    Store(#[from] sqlx::Error),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Registration input. `role` defaults to `user`.
#[derive(Debug, Clone)]
pub struct Registration<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub full_name: &'a str,
    pub phone: Option<&'a str>,
    pub role: Option<UserRole>,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub profile: Profile,
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

#[derive(Clone)]
pub struct AuthService {
    db: Database,
    jwt: Arc<JwtConfig>,
}

impl AuthService {
    pub fn new(db: Database, jwt: Arc<JwtConfig>) -> Self {
        Self { db, jwt }
    }

    /// Create a principal. Issues no tokens; the caller logs in separately.
    pub async fn register(&self, registration: Registration<'_>) -> Result<Profile, AuthError> {
        if registration.email.is_empty() {
            return Err(AuthError::BadRequest("Email is required"));
        }
        if registration.password.is_empty() {
            return Err(AuthError::BadRequest("Password is required"));
        }
        if registration.full_name.trim().is_empty() {
            return Err(AuthError::BadRequest("Full name is required"));
        }

        if self
            .db
            .users()
            .get_by_email(registration.email)
            .await?
            .is_some()
        {
            return Err(AuthError::Conflict);
        }

        let password_hash = hash_password(registration.password)?;
        let new_user = NewUser {
            full_name: registration.full_name,
            email: registration.email,
            password_hash: &password_hash,
            phone: registration.phone,
            role: registration.role.unwrap_or_default(),
        };

        // A concurrent registration can still win the race to the UNIQUE index
        let user = self.db.users().create(&new_user).await.map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::Conflict
            } else {
                AuthError::Store(e)
            }
        })?;

        info!(user_id = %user.id, role = %user.role, "Registered principal");
        Ok(user.profile())
    }

    /// Verify credentials and start a new session, replacing any previous one.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let user = self
            .db
            .users()
            .get_by_email(email)
            .await?
            .ok_or(AuthError::NotFound)?;

        if !verify_password(password, &user.password_hash) {
            debug!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AuthError::Forbidden);
        }

        let access = self.jwt.issue_access(&user.id, user.role)?;
        let refresh = self.jwt.issue_refresh(&user.id)?;

        // Overwrites the previous token: only the latest login can refresh
        if !self
            .db
            .users()
            .set_refresh_token(&user.id, &refresh.token)
            .await?
        {
            return Err(AuthError::NotFound);
        }

        info!(user_id = %user.id, "Logged in");
        Ok(LoginOutcome {
            profile: user.profile(),
            access,
            refresh,
        })
    }

    /// End the caller's session. Never fails; returns whether a stored
    /// session was actually cleared.
    ///
    /// The refresh cookie is scoped to the refresh path, so a browser only
    /// sends the access token here. A verified access token revokes the
    /// principal's stored session by id.
    pub async fn logout(&self, refresh_token: Option<&str>, access_token: Option<&str>) -> bool {
        if let Some(token) = refresh_token {
            match self.db.users().clear_refresh_token(token).await {
                Ok(true) => {
                    info!("Logged out, refresh token revoked");
                    return true;
                }
                Ok(false) => {}
                Err(e) => tracing::error!(error = %e, "Failed to revoke refresh token"),
            }
        }

        let Some(claims) = access_token.and_then(|t| self.jwt.verify_access(t).ok()) else {
            return false;
        };

        match self.db.users().clear_refresh_token_for(&claims.user_id).await {
            Ok(revoked) => {
                if revoked {
                    info!(user_id = %claims.user_id, "Logged out, session revoked");
                }
                revoked
            }
            Err(e) => {
                tracing::error!(user_id = %claims.user_id, error = %e, "Failed to revoke session");
                false
            }
        }
    }

    /// Mint a new access token from a refresh token. The refresh token is not rotated.
    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<IssuedToken, AuthError> {
        let token =
            refresh_token.ok_or(AuthError::Unauthorized(UnauthorizedReason::NoTokenSent))?;

        let claims = self
            .jwt
            .verify_refresh(token)
            .map_err(|_| AuthError::Unauthorized(UnauthorizedReason::InvalidToken))?;

        let user = self
            .db
            .users()
            .get_by_id(&claims.user_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        if !user.holds_refresh_token(token) {
            debug!(user_id = %user.id, "Refresh rejected: session revoked or superseded");
            return Err(AuthError::Unauthorized(UnauthorizedReason::Revoked));
        }

        Ok(self.jwt.issue_access(&user.id, user.role)?)
    }
}
