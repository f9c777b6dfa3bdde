//! Database access for the Mercato API.
//!
//! # Engines
//!
//! The API talks to the store through sqlx's `Any` driver, so the same binary
//! runs against `PostgreSQL` (production) or `SQLite` (embedded, tests). Engine
//! differences are confined to three places:
//!
//! - migrations (`migrations/postgres`, `migrations/sqlite`)
//! - connection setup (`SQLite` needs `PRAGMA foreign_keys = ON`)
//! - constraint-error decoding ([`constraint`])
//!
//! ## Tables
//!
//! - `addresses` - Postal addresses, referenced by customers
//! - `customers` - Customers, `email` unique, `address_id` set to NULL when
//!   the address is deleted
//!
//! # Migrations
//!
//! Applied on startup when `MERCATO_RUN_MIGRATIONS=true`, or explicitly via:
//! ```bash
//! cargo run -p mercato-cli -- migrate
//! ```

pub mod addresses;
pub mod constraint;
pub mod customers;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::any::AnyPoolOptions;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::{Any, AnyConnection, AnyPool, Transaction};
use thiserror::Error;

pub use addresses::AddressRepository;
pub use constraint::{ConstraintKind, ConstraintViolation};
pub use customers::CustomerRepository;

use crate::config::ApiConfig;

static POSTGRES_MIGRATOR: Migrator = sqlx::migrate!("./migrations/postgres");
static SQLITE_MIGRATOR: Migrator = sqlx::migrate!("./migrations/sqlite");

/// The relational engine behind a database URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEngine {
    /// `PostgreSQL` (`postgres://` or `postgresql://`).
    Postgres,
    /// `SQLite` (`sqlite:`), file-backed or in-memory.
    Sqlite,
}

impl StoreEngine {
    /// Detect the engine from a connection URL scheme.
    #[must_use]
    pub fn from_url(url: &str) -> Option<Self> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Some(Self::Postgres)
        } else if url.starts_with("sqlite:") {
            Some(Self::Sqlite)
        } else {
            None
        }
    }

    /// Migrations written for this engine.
    #[must_use]
    pub fn migrator(self) -> &'static Migrator {
        match self {
            Self::Postgres => &POSTGRES_MIGRATOR,
            Self::Sqlite => &SQLITE_MIGRATOR,
        }
    }
}

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The store rejected a write because of a declared constraint.
    #[error("constraint violation: {0}")]
    Constraint(ConstraintViolation),

    /// Any other database error from sqlx.
    #[error("database error: {0}")]
    Database(sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,
}

impl From<sqlx::Error> for RepositoryError {
    fn from(error: sqlx::Error) -> Self {
        match ConstraintViolation::from_sqlx(&error) {
            Some(violation) => Self::Constraint(violation),
            None => Self::Database(error),
        }
    }
}

/// Errors that can occur while opening the store.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("database connection failed: {0}")]
    Connect(#[from] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migrate(#[from] MigrateError),
}

/// Create a connection pool for the configured engine.
///
/// `SQLite` connections get `PRAGMA foreign_keys = ON` on connect, since
/// `SQLite` does not enforce foreign keys by default. An in-memory `SQLite`
/// database lives only as long as its connection, so the pool is pinned to a
/// single connection that is never recycled.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(config: &ApiConfig) -> Result<AnyPool, sqlx::Error> {
    sqlx::any::install_default_drivers();

    let url = config.database_url.expose_secret();
    let engine = config.engine;

    let mut options = AnyPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                if engine == StoreEngine::Sqlite {
                    sqlx::query("PRAGMA foreign_keys = ON")
                        .execute(&mut *conn)
                        .await?;
                }
                Ok(())
            })
        });

    if engine == StoreEngine::Sqlite && is_in_memory(url) {
        options = options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    options.connect(url).await
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Apply the engine's pending migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the applied history
/// diverges from the embedded migrations.
pub async fn run_migrations(pool: &AnyPool, engine: StoreEngine) -> Result<(), MigrateError> {
    engine.migrator().run(pool).await
}

/// Create the pool and, if configured, bring the schema up to date.
///
/// # Errors
///
/// Returns `ConnectError` if connecting or migrating fails.
pub async fn connect(config: &ApiConfig) -> Result<AnyPool, ConnectError> {
    let pool = create_pool(config).await?;
    tracing::info!(engine = ?config.engine, "Database pool created");

    if config.run_migrations {
        run_migrations(&pool, config.engine).await?;
        tracing::info!(engine = ?config.engine, "Database migrations applied");
    }

    Ok(pool)
}

/// One request's atomic write.
///
/// Everything done through [`UnitOfWork::connection`] becomes visible only if
/// [`UnitOfWork::finish`] receives `Ok`; any `Err` rolls the whole unit back.
///
/// On `SQLite` the unit takes the write lock up front (`BEGIN IMMEDIATE`), so
/// concurrent writers queue on the busy timeout rather than failing with
/// `SQLITE_BUSY` on a lock upgrade.
pub struct UnitOfWork {
    tx: Transaction<'static, Any>,
}

impl UnitOfWork {
    /// Begin a write transaction on a pooled connection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if no connection can be acquired
    /// or the write lock is not granted within the busy timeout.
    pub async fn begin(pool: &AnyPool, engine: StoreEngine) -> Result<Self, RepositoryError> {
        let tx = match engine {
            StoreEngine::Postgres => pool.begin().await?,
            StoreEngine::Sqlite => pool.begin_with("BEGIN IMMEDIATE").await?,
        };
        Ok(Self { tx })
    }

    /// The transaction's connection, for repositories and schema lookups.
    pub fn connection(&mut self) -> &mut AnyConnection {
        &mut self.tx
    }

    /// Commit on `Ok`, roll back on `Err`.
    ///
    /// A failed commit is returned as a [`RepositoryError`] (deferred
    /// constraints surface here). A failed rollback is logged and the
    /// original error is returned.
    ///
    /// # Errors
    ///
    /// Returns the operation's own error, or the commit error.
    pub async fn finish<T, E>(self, result: Result<T, E>) -> Result<T, E>
    where
        E: From<RepositoryError>,
    {
        match result {
            Ok(value) => {
                self.tx.commit().await.map_err(RepositoryError::from)?;
                Ok(value)
            }
            Err(error) => {
                if let Err(rollback_error) = self.tx.rollback().await {
                    tracing::error!(error = %rollback_error, "Rollback failed");
                }
                Err(error)
            }
        }
    }
}
