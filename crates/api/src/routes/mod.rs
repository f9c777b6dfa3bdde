//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health              - Liveness check
//! GET    /health/ready        - Readiness check (store reachable)
//!
//! # Addresses
//! POST   /addresses           - Create an address
//! GET    /addresses           - List addresses
//! GET    /addresses/{id}      - Show an address
//! DELETE /addresses/{id}      - Delete an address, detaching its customers
//!
//! # Customers
//! POST   /customers           - Create a customer
//! GET    /customers           - List customers
//! GET    /customers/{id}      - Show a customer
//! ```

pub mod addresses;
pub mod customers;

use axum::{Router, extract::State, http::StatusCode, routing::get};
use sqlx::{Any, pool::PoolConnection};

use crate::db::RepositoryError;
use crate::error::{ApiError, Resource};
use crate::state::AppState;

/// Create the address routes router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(addresses::index).post(addresses::create))
        .route("/{id}", get(addresses::show).delete(addresses::delete))
}

/// Create the customer routes router.
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(customers::index).post(customers::create))
        .route("/{id}", get(customers::show))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/addresses", address_routes())
        .nest("/customers", customer_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").execute(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Take a pooled connection for a read-only handler.
async fn acquire(state: &AppState, resource: Resource) -> Result<PoolConnection<Any>, ApiError> {
    state
        .pool()
        .acquire()
        .await
        .map_err(|e| ApiError::translate(resource, RepositoryError::from(e)))
}
