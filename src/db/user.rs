//! Credential store: one record per principal.

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePool;
use std::str::FromStr;

#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

/// User role for authorization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }
}

/// Returned when a role name is neither `user` nor `admin`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for UserRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub role: UserRole,
    /// The single refresh token currently honoured for this principal.
    pub refresh_token: Option<String>,
}

/// Public view of a principal. Never carries the password hash or refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: UserRole,
}

impl User {
    pub fn profile(&self) -> Profile {
        Profile {
            id: self.id.clone(),
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            role: self.role,
        }
    }

    /// Whether `token` is the refresh token currently stored for this principal.
    pub fn holds_refresh_token(&self, token: &str) -> bool {
        self.refresh_token.as_deref() == Some(token)
    }
}

/// Fields needed to create a principal.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub full_name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub phone: Option<&'a str>,
    pub role: UserRole,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    full_name: String,
    email: String,
    password_hash: String,
    phone: Option<String>,
    role: String,
    refresh_token: Option<String>,
}

/// A stored role outside {user, admin} is a corrupt row, not a `user`.
impl TryFrom<UserRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row.role.parse().map_err(|e: UnknownRole| {
            tracing::error!(user_id = %row.id, role = %e.0, "Stored principal has an unknown role");
            sqlx::Error::Decode(Box::new(e))
        })?;
        Ok(Self {
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            password_hash: row.password_hash,
            phone: row.phone,
            role,
            // An empty string is treated the same as no token
            refresh_token: row.refresh_token.filter(|t| !t.is_empty()),
        })
    }
}

macro_rules! user_columns {
    () => {
        "id, full_name, email, password_hash, phone, role, refresh_token"
    };
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a principal with no active session.
    pub async fn create(&self, new: &NewUser<'_>) -> Result<User, sqlx::Error> {
        let id = uuid::Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO users (id, full_name, email, password_hash, phone, role) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(new.full_name)
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.phone)
        .bind(new.role.as_str())
        .execute(&self.pool)
        .await?;

        Ok(User {
            id,
            full_name: new.full_name.to_string(),
            email: new.email.to_string(),
            password_hash: new.password_hash.to_string(),
            phone: new.phone.map(str::to_string),
            role: new.role,
            refresh_token: None,
        })
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> =
            sqlx::query_as(concat!("SELECT ", user_columns!(), " FROM users WHERE email = ?"))
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        row.map(User::try_from).transpose()
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> =
            sqlx::query_as(concat!("SELECT ", user_columns!(), " FROM users WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(User::try_from).transpose()
    }

    pub async fn get_by_refresh_token(&self, token: &str) -> Result<Option<User>, sqlx::Error> {
        if token.is_empty() {
            return Ok(None);
        }
        let row: Option<UserRow> = sqlx::query_as(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE refresh_token = ?"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        row.map(User::try_from).transpose()
    }

    /// Store `token` as the principal's only refresh token, replacing any previous one.
    /// A single keyed UPDATE, so concurrent logins resolve last-write-wins.
    pub async fn set_refresh_token(&self, id: &str, token: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET refresh_token = ? WHERE id = ?")
            .bind(token)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Revoke a refresh token. Returns whether a principal was holding it.
    pub async fn clear_refresh_token(&self, token: &str) -> Result<bool, sqlx::Error> {
        if token.is_empty() {
            return Ok(false);
        }
        let result = sqlx::query("UPDATE users SET refresh_token = NULL WHERE refresh_token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// End whatever session the principal holds. Returns whether one was live.
    pub async fn clear_refresh_token_for(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET refresh_token = NULL WHERE id = ? AND refresh_token IS NOT NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List all principals, oldest first.
    pub async fn list(&self) -> Result<Vec<User>, sqlx::Error> {
        let rows: Vec<UserRow> = sqlx::query_as(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users ORDER BY created_at, email"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(User::try_from).collect()
    }

    pub async fn delete(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!("user".parse::<UserRole>(), Ok(UserRole::User));
        assert_eq!("admin".parse::<UserRole>(), Ok(UserRole::Admin));
        assert_eq!(
            "staff".parse::<UserRole>(),
            Err(UnknownRole("staff".to_string()))
        );
        assert_eq!(UserRole::default(), UserRole::User);
    }

    #[test]
    fn test_profile_omits_secrets() {
        let user = User {
            id: "id-1".to_string(),
            full_name: "Alice".to_string(),
            email: "alice@test.com".to_string(),
            password_hash: "hash".to_string(),
            phone: None,
            role: UserRole::User,
            refresh_token: Some("tok".to_string()),
        };

        let json = serde_json::to_value(user.profile()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("refresh_token").is_none());
        assert_eq!(json["role"], "user");
        assert!(user.holds_refresh_token("tok"));
        assert!(!user.holds_refresh_token("other"));
    }
}
