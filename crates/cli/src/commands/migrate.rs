//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! mercato-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `MERCATO_DATABASE_URL` - `PostgreSQL` or `SQLite` connection string
//!   (falls back to `DATABASE_URL`)
//!
//! The URL scheme selects the migration set:
//! `crates/api/migrations/postgres/` or `crates/api/migrations/sqlite/`.

use mercato_api::config::{ApiConfig, ConfigError};
use mercato_api::db;
use thiserror::Error;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply every pending migration for the configured engine.
///
/// # Errors
///
/// Returns `MigrationError` if configuration is missing, the database is
/// unreachable, or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let config = ApiConfig::from_env()?;

    tracing::info!(engine = ?config.engine, "Connecting to database...");
    let pool = db::create_pool(&config).await?;

    tracing::info!("Running migrations...");
    db::run_migrations(&pool, config.engine).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
