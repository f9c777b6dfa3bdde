//! Address route handlers.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Map, Value};
use sqlx::AnyConnection;
use tracing::instrument;

use mercato_core::AddressId;

use super::acquire;
use crate::db::{AddressRepository, UnitOfWork};
use crate::error::{ApiError, Resource, WriteError};
use crate::models::Address;
use crate::schemas::{self, AddressSchema};
use crate::state::AppState;

/// Create an address from a JSON body.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let address = create_address(&state, &body)
        .await
        .map_err(|e| ApiError::translate(Resource::Address, e))?;

    tracing::info!(address_id = %address.id, "Address created");
    Ok((StatusCode::CREATED, Json(AddressSchema::dump(&address))))
}

async fn create_address(state: &AppState, body: &[u8]) -> Result<Address, WriteError> {
    let payload = schemas::parse_body(body)?;

    let mut uow = UnitOfWork::begin(state.pool(), state.config().engine).await?;
    let result = insert_address(uow.connection(), &payload).await;
    uow.finish(result).await
}

async fn insert_address(
    conn: &mut AnyConnection,
    payload: &Map<String, Value>,
) -> Result<Address, WriteError> {
    let new_address = AddressSchema::load(payload)?;
    Ok(AddressRepository::new(conn).create(&new_address).await?)
}

/// List all addresses.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Value>>, ApiError> {
    let mut conn = acquire(&state, Resource::Address).await?;
    let addresses = AddressRepository::new(&mut conn)
        .list()
        .await
        .map_err(|e| ApiError::translate(Resource::Address, e))?;

    Ok(Json(addresses.iter().map(AddressSchema::dump).collect()))
}

/// Show one address.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = acquire(&state, Resource::Address).await?;
    let address = AddressRepository::new(&mut conn)
        .get_by_id(AddressId::new(id))
        .await
        .map_err(|e| ApiError::translate(Resource::Address, e))?
        .ok_or_else(|| ApiError::not_found(Resource::Address))?;

    Ok(Json(AddressSchema::dump(&address)))
}

/// Delete an address. Customers that referenced it keep existing without one.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    delete_address(&state, AddressId::new(id))
        .await
        .map_err(|e| ApiError::translate(Resource::Address, e))?;

    tracing::info!(address_id = id, "Address deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_address(state: &AppState, id: AddressId) -> Result<(), WriteError> {
    let mut uow = UnitOfWork::begin(state.pool(), state.config().engine).await?;
    let result = AddressRepository::new(uow.connection())
        .delete(id)
        .await
        .map_err(WriteError::from);
    uow.finish(result).await
}
