//! Customer route handlers.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Map, Value};
use sqlx::AnyConnection;
use tracing::instrument;

use mercato_core::CustomerId;

use super::acquire;
use crate::db::{CustomerRepository, UnitOfWork};
use crate::error::{ApiError, Resource, WriteError};
use crate::models::Customer;
use crate::schemas::{self, CustomerSchema};
use crate::state::AppState;

/// Create a customer from a JSON body.
///
/// The referenced address is resolved in the same transaction as the
/// insert, so it cannot vanish in between without the insert failing.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let customer = create_customer(&state, &body)
        .await
        .map_err(|e| ApiError::translate(Resource::Customer, e))?;

    tracing::info!(customer_id = %customer.id, "Customer created");
    Ok((StatusCode::CREATED, Json(CustomerSchema::dump(&customer))))
}

async fn create_customer(state: &AppState, body: &[u8]) -> Result<Customer, WriteError> {
    let payload = schemas::parse_body(body)?;

    let mut uow = UnitOfWork::begin(state.pool(), state.config().engine).await?;
    let result = insert_customer(uow.connection(), &payload).await;
    uow.finish(result).await
}

async fn insert_customer(
    conn: &mut AnyConnection,
    payload: &Map<String, Value>,
) -> Result<Customer, WriteError> {
    let new_customer = CustomerSchema::load(conn, payload).await?;
    Ok(CustomerRepository::new(conn).create(&new_customer).await?)
}

/// List all customers.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Value>>, ApiError> {
    let mut conn = acquire(&state, Resource::Customer).await?;
    let customers = CustomerRepository::new(&mut conn)
        .list()
        .await
        .map_err(|e| ApiError::translate(Resource::Customer, e))?;

    Ok(Json(customers.iter().map(CustomerSchema::dump).collect()))
}

/// Show one customer.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = acquire(&state, Resource::Customer).await?;
    let customer = CustomerRepository::new(&mut conn)
        .get_by_id(CustomerId::new(id))
        .await
        .map_err(|e| ApiError::translate(Resource::Customer, e))?
        .ok_or_else(|| ApiError::not_found(Resource::Customer))?;

    Ok(Json(CustomerSchema::dump(&customer)))
}
