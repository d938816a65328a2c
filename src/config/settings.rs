//! Application settings loaded from environment variables.

use std::env;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_REDIS_URL, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    DEFAULT_SESSION_EXPIRATION_HOURS, MIN_AUTH_SECRET_LENGTH,
};
use crate::errors::{AppError, AppResult};

/// Insecure secret used only by debug builds when `AUTH_SECRET` is unset.
const DEV_AUTH_SECRET: &str = "dev-secret-key-minimum-32-chars!!";

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    /// Require TLS on the Postgres connection (`sslmode=require`)
    pub database_ssl: bool,
    pub redis_url: String,
    auth_secret: String,
    pub session_expiration_hours: i64,
    /// Mark the session cookie `Secure` (HTTPS only)
    pub cookie_secure: bool,
    pub server_host: String,
    pub server_port: u16,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("database_ssl", &self.database_ssl)
            .field("redis_url", &"[REDACTED]")
            .field("auth_secret", &"[REDACTED]")
            .field("session_expiration_hours", &self.session_expiration_hours)
            .field("cookie_secure", &self.cookie_secure)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `POSTGRES_URL` takes precedence over `DATABASE_URL`. Release builds
    /// refuse to start without `AUTH_SECRET`.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let auth_secret = match env::var("AUTH_SECRET") {
            Ok(secret) => secret,
            Err(_) if cfg!(debug_assertions) => {
                tracing::warn!("AUTH_SECRET not set, using insecure default for development");
                DEV_AUTH_SECRET.to_string()
            }
            Err(_) => {
                return Err(AppError::internal(
                    "AUTH_SECRET environment variable must be set in production",
                ))
            }
        };

        Self::new(
            env::var("POSTGRES_URL")
                .or_else(|_| env::var("DATABASE_URL"))
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string()),
            auth_secret,
        )
        .map(|config| Self {
            database_ssl: parse_flag("DATABASE_SSL", config.database_ssl),
            session_expiration_hours: env::var("SESSION_EXPIRATION_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(config.session_expiration_hours),
            cookie_secure: parse_flag("COOKIE_SECURE", config.cookie_secure),
            server_host: env::var("SERVER_HOST").unwrap_or(config.server_host.clone()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(config.server_port),
            ..config
        })
    }

    /// Build a configuration with defaults for everything but the connection
    /// strings and the auth secret.
    pub fn new(
        database_url: impl Into<String>,
        redis_url: impl Into<String>,
        auth_secret: impl Into<String>,
    ) -> AppResult<Self> {
        let auth_secret = auth_secret.into();
        if auth_secret.len() < MIN_AUTH_SECRET_LENGTH {
            return Err(AppError::internal(format!(
                "AUTH_SECRET must be at least {} characters long",
                MIN_AUTH_SECRET_LENGTH
            )));
        }

        Ok(Self {
            database_url: database_url.into(),
            database_ssl: !cfg!(debug_assertions),
            redis_url: redis_url.into(),
            auth_secret,
            session_expiration_hours: DEFAULT_SESSION_EXPIRATION_HOURS,
            cookie_secure: !cfg!(debug_assertions),
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
        })
    }

    /// Get the auth secret bytes for session signing/verification.
    pub fn auth_secret_bytes(&self) -> &[u8] {
        self.auth_secret.as_bytes()
    }

    /// Database URL with `sslmode=require` appended when TLS is required and
    /// the URL does not already choose a mode.
    pub fn connection_url(&self) -> String {
        if !self.database_ssl || self.database_url.contains("sslmode=") {
            return self.database_url.clone();
        }
        let separator = if self.database_url.contains('?') { '&' } else { '?' };
        format!("{}{}sslmode=require", self.database_url, separator)
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_flag(name: &str, default: bool) -> bool {
    match env::var(name).map(|v| v.to_ascii_lowercase()) {
        Ok(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Ok(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        _ => default,
    }
}
