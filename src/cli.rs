//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::auth::TokenTransport;
use crate::db::Database;
use clap::Parser;
use tracing::{error, info};
use url::Url;

const MIN_TOKEN_SECRET_LENGTH: usize = 32;

pub const ACCESS_TOKEN_SECRET_ENV: &str = "ACCESS_TOKEN_SECRET";
pub const REFRESH_TOKEN_SECRET_ENV: &str = "REFRESH_TOKEN_SECRET";

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "HotelHub",
    about = "Hotel management backend with cookie-based sessions"
)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, default_value = "hotelhub.db")]
    pub database: String,

    /// Public origin the service is reached at (e.g., "https://hotel.example.com").
    /// An https origin turns on the Secure cookie flag
    #[arg(long, default_value = "http://localhost:3000")]
    pub public_origin: String,

    /// Where the authorization gate reads access tokens from
    #[arg(long, value_enum, default_value = "cookie")]
    pub token_transport: TokenTransport,

    /// Path to file containing the access token secret. Prefer ACCESS_TOKEN_SECRET instead
    #[arg(long)]
    pub access_token_secret_file: Option<String>,

    /// Path to file containing the refresh token secret. Prefer REFRESH_TOKEN_SECRET instead
    #[arg(long)]
    pub refresh_token_secret_file: Option<String>,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Both signing secrets, validated.
pub struct TokenSecrets {
    pub access: String,
    pub refresh: String,
}

/// Load one secret from its environment variable or file.
fn load_secret(env_var: &str, file: Option<&str>, flag: &str) -> Option<String> {
    let secret = if let Ok(secret) = std::env::var(env_var) {
        // Clear the environment variable to prevent leaking
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var(env_var) };
        secret
    } else if let Some(path) = file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read {} file", env_var);
                return None;
            }
        }
    } else {
        error!(
            "{} is required. Set the environment variable (recommended) or use {}",
            env_var, flag
        );
        return None;
    };

    if secret.len() < MIN_TOKEN_SECRET_LENGTH {
        error!(
            "{} is shorter than {} characters. Use a longer secret",
            env_var, MIN_TOKEN_SECRET_LENGTH
        );
        return None;
    }

    Some(secret)
}

/// Load the access and refresh token secrets from environment variables or files.
/// Returns None and logs an error if either is missing, too short, or if they are equal.
pub fn load_token_secrets(
    access_file: Option<&str>,
    refresh_file: Option<&str>,
) -> Option<TokenSecrets> {
    let access = load_secret(
        ACCESS_TOKEN_SECRET_ENV,
        access_file,
        "--access-token-secret-file",
    )?;
    let refresh = load_secret(
        REFRESH_TOKEN_SECRET_ENV,
        refresh_file,
        "--refresh-token-secret-file",
    )?;

    if access == refresh {
        error!("Access and refresh token secrets must differ");
        return None;
    }

    Some(TokenSecrets { access, refresh })
}

/// Parse and validate the public origin URL.
/// Returns None and logs an error if validation fails.
pub fn validate_public_origin(origin: &str) -> Option<Url> {
    let url = match Url::parse(origin) {
        Ok(url) => url,
        Err(e) => {
            error!(origin = %origin, error = %e, "Invalid public-origin URL");
            return None;
        }
    };

    if url.scheme() != "https" && url.scheme() != "http" {
        error!(origin = %origin, "public-origin must be an http or https URL");
        return None;
    }

    Some(url)
}

/// Build ServerConfig from validated arguments.
pub fn build_config(
    db: Database,
    public_origin: &Url,
    secrets: TokenSecrets,
    transport: TokenTransport,
) -> ServerConfig {
    let secure_cookies = public_origin.scheme() == "https";

    ServerConfig {
        db,
        access_token_secret: secrets.access.into_bytes(),
        refresh_token_secret: secrets.refresh.into_bytes(),
        secure_cookies,
        transport,
    }
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}
