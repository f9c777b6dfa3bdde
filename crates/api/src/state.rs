//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::AnyPool;

use crate::config::ApiConfig;
use crate::db::{self, ConnectError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the connection pool and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: AnyPool,
}

impl AppState {
    /// Create application state around an existing pool.
    #[must_use]
    pub fn new(config: ApiConfig, pool: AnyPool) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, pool }),
        }
    }

    /// Open the store described by `config` and build the state around it.
    ///
    /// # Errors
    ///
    /// Returns `ConnectError` if the pool cannot be created or migrations fail.
    pub async fn connect(config: ApiConfig) -> Result<Self, ConnectError> {
        let pool = db::connect(&config).await?;
        Ok(Self::new(config, pool))
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &AnyPool {
        &self.inner.pool
    }
}
