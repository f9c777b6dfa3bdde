//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MERCATO_DATABASE_URL` - `PostgreSQL` or `SQLite` connection string
//!   (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `MERCATO_HOST` - Bind address (default: 127.0.0.1)
//! - `MERCATO_PORT` - Listen port (default: 3000)
//! - `MERCATO_DB_MAX_CONNECTIONS` - Pool size (default: 10)
//! - `MERCATO_RUN_MIGRATIONS` - Apply migrations on startup (default: false)
//! - `MERCATO_LOG_FORMAT` - `json` for one JSON object per log line
//! - `RUST_LOG` - Log filter (default: `mercato_api=info,tower_http=debug`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.1)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::db::StoreEngine;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// API application configuration.
///
/// Implements `Debug` manually to redact the database URL, which usually
/// carries a password.
#[derive(Clone)]
pub struct ApiConfig {
    /// Database connection URL (may contain a password)
    pub database_url: SecretString,
    /// Engine selected by the URL scheme
    pub engine: StoreEngine,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Whether to apply migrations before serving
    pub run_migrations: bool,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced by Sentry
    pub sentry_traces_sample_rate: f32,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("database_url", &"[REDACTED]")
            .field("engine", &self.engine)
            .field("max_connections", &self.max_connections)
            .field("run_migrations", &self.run_migrations)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[REDACTED]"))
            .field("sentry_environment", &self.sentry_environment)
            .field("sentry_sample_rate", &self.sentry_sample_rate)
            .field("sentry_traces_sample_rate", &self.sentry_traces_sample_rate)
            .finish()
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// including a database URL whose scheme is neither `PostgreSQL` nor `SQLite`.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("MERCATO_DATABASE_URL")?;
        let engine = StoreEngine::from_url(database_url.expose_secret()).ok_or_else(|| {
            ConfigError::InvalidEnvVar(
                "MERCATO_DATABASE_URL".to_string(),
                "scheme must be postgres://, postgresql:// or sqlite:".to_string(),
            )
        })?;

        Ok(Self {
            database_url,
            engine,
            max_connections: get_parsed_env("MERCATO_DB_MAX_CONNECTIONS", 10)?,
            run_migrations: get_parsed_env("MERCATO_RUN_MIGRATIONS", false)?,
            host: get_parsed_env("MERCATO_HOST", IpAddr::from([127, 0, 0, 1]))?,
            port: get_parsed_env("MERCATO_PORT", 3000)?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_parsed_env("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: get_parsed_env("SENTRY_TRACES_SAMPLE_RATE", 0.1)?,
        })
    }

    /// Configuration for an in-memory `SQLite` store, used by tests and local demos.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            database_url: SecretString::from("sqlite::memory:"),
            engine: StoreEngine::Sqlite,
            max_connections: 1,
            run_migrations: true,
            host: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable parsed into `T`, or `default` if unset.
fn get_parsed_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| parse_value(key, &raw))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
