//! Access and refresh token issuing and validation.
//!
//! The two token kinds are signed with distinct secrets, so a refresh token
//! can never be replayed as an access token and vice versa.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::db::UserRole;

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Principal id
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Principal role at issuance
    pub role: UserRole,
    /// Random token id, keeps tokens minted in the same second distinct
    pub jti: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Claims carried by a refresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Principal id
    #[serde(rename = "userId")]
    pub user_id: String,
    pub jti: String,
    pub iat: u64,
    pub exp: u64,
}

/// Access token lifetime: 10 minutes
pub const ACCESS_TOKEN_DURATION_SECS: u64 = 10 * 60;

/// Refresh token lifetime: 7 days
pub const REFRESH_TOKEN_DURATION_SECS: u64 = 7 * 24 * 60 * 60;

/// A freshly signed token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: u64,
}

/// Errors that can occur during token operations.
///
/// Every verification failure (bad signature, malformed payload, expiry)
/// surfaces as `Invalid`.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("failed to encode token: {0}")]
    Encoding(jsonwebtoken::errors::Error),
    #[error("invalid signature or expired token")]
    Invalid,
    #[error("system time error")]
    Time,
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// Token issuer configured once at startup with both signing secrets.
pub struct JwtConfig {
    access: KeyPair,
    refresh: KeyPair,
}

impl JwtConfig {
    /// Build an issuer from the access and refresh secrets.
    /// The caller is responsible for ensuring the secrets differ.
    pub fn new(access_secret: &[u8], refresh_secret: &[u8]) -> Self {
        Self {
            access: KeyPair::new(access_secret),
            refresh: KeyPair::new(refresh_secret),
        }
    }

    /// Sign `{userId, role}` with the access secret, valid for 10 minutes.
    pub fn issue_access(&self, user_id: &str, role: UserRole) -> Result<IssuedToken, TokenError> {
        let now = unix_now()?;
        let claims = AccessClaims {
            user_id: user_id.to_string(),
            role,
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now,
            exp: now + ACCESS_TOKEN_DURATION_SECS,
        };
        sign(&claims, &self.access.encoding, claims.exp)
    }

    /// Sign `{userId}` with the refresh secret, valid for 7 days.
    pub fn issue_refresh(&self, user_id: &str) -> Result<IssuedToken, TokenError> {
        let now = unix_now()?;
        let claims = RefreshClaims {
            user_id: user_id.to_string(),
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now,
            exp: now + REFRESH_TOKEN_DURATION_SECS,
        };
        sign(&claims, &self.refresh.encoding, claims.exp)
    }

    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        verify(token, &self.access.decoding)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        verify(token, &self.refresh.decoding)
    }
}

fn unix_now() -> Result<u64, TokenError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| TokenError::Time)
}

fn sign<T: Serialize>(
    claims: &T,
    key: &EncodingKey,
    expires_at: u64,
) -> Result<IssuedToken, TokenError> {
    let token = jsonwebtoken::encode(&Header::default(), claims, key).map_err(TokenError::Encoding)?;
    Ok(IssuedToken { token, expires_at })
}

fn verify<T: DeserializeOwned>(token: &str, key: &DecodingKey) -> Result<T, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    jsonwebtoken::decode::<T>(token, key, &validation)
        .map(|data| data.claims)
        .map_err(|_| TokenError::Invalid)
}
