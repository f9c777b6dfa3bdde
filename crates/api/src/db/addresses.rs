//! Address repository for database operations.
//!
//! Queries are built at runtime (not with `query!`) because the same SQL runs
//! on every engine behind the `Any` driver.

use sqlx::AnyConnection;

use mercato_core::{AddressId, CountryCode, StateCode};

use super::RepositoryError;
use crate::models::address::{Address, AddressRef, NewAddress};

const ADDRESS_COLUMNS: &str = "id, country_code, state_code, city, street, postcode";

#[derive(sqlx::FromRow)]
struct AddressRow {
    id: i64,
    country_code: String,
    state_code: String,
    city: Option<String>,
    street: String,
    postcode: String,
}

impl TryFrom<AddressRow> for Address {
    type Error = RepositoryError;

    fn try_from(row: AddressRow) -> Result<Self, Self::Error> {
        let country_code = CountryCode::parse(&row.country_code).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid country code in database: {e}"))
        })?;
        let state_code = StateCode::parse(&row.state_code).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid state code in database: {e}"))
        })?;

        Ok(Self {
            id: AddressId::new(row.id),
            country_code,
            state_code,
            city: row.city,
            street: row.street,
            postcode: row.postcode,
        })
    }
}

/// Repository for address database operations.
pub struct AddressRepository<'c> {
    conn: &'c mut AnyConnection,
}

impl<'c> AddressRepository<'c> {
    /// Create a repository over a connection or an open transaction.
    #[must_use]
    pub const fn new(conn: &'c mut AnyConnection) -> Self {
        Self { conn }
    }

    /// Insert a validated address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Constraint` if the store rejects the row.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&mut self, address: &NewAddress) -> Result<Address, RepositoryError> {
        let row: AddressRow = sqlx::query_as(&format!(
            "INSERT INTO addresses (country_code, state_code, city, street, postcode) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(address.country_code.as_str())
        .bind(address.state_code.as_str())
        .bind(address.city.as_deref())
        .bind(address.street.as_str())
        .bind(address.postcode.as_str())
        .fetch_one(&mut *self.conn)
        .await?;

        row.try_into()
    }

    /// Get an address by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored code is invalid.
    pub async fn get_by_id(&mut self, id: AddressId) -> Result<Option<Address>, RepositoryError> {
        let row: Option<AddressRow> = sqlx::query_as(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&mut *self.conn)
        .await?;

        row.map(Address::try_from).transpose()
    }

    /// List all addresses, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored code is invalid.
    pub async fn list(&mut self) -> Result<Vec<Address>, RepositoryError> {
        let rows: Vec<AddressRow> = sqlx::query_as(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses ORDER BY id"
        ))
        .fetch_all(&mut *self.conn)
        .await?;

        rows.into_iter().map(Address::try_from).collect()
    }

    /// Look up an address id, returning a reference only if it exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn resolve(&mut self, id: AddressId) -> Result<Option<AddressRef>, RepositoryError> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM addresses WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(found.map(|(id,)| AddressRef::resolved(AddressId::new(id))))
    }

    /// Delete an address. Customers referencing it keep existing with no address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no address has this id.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&mut self, id: AddressId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = $1")
            .bind(id.as_i64())
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
