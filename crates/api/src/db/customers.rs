//! Customer repository for database operations.

use sqlx::AnyConnection;

use mercato_core::{AddressId, CustomerId, Email, PhoneNumber};

use super::RepositoryError;
use crate::models::customer::{Customer, NewCustomer};

const CUSTOMER_COLUMNS: &str = "id, f_name, l_name, email, phone, address_id";

#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: i64,
    f_name: String,
    l_name: Option<String>,
    email: String,
    phone: Option<String>,
    address_id: Option<i64>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let phone = row
            .phone
            .as_deref()
            .map(PhoneNumber::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid phone in database: {e}"))
            })?;

        Ok(Self {
            id: CustomerId::new(row.id),
            f_name: row.f_name,
            l_name: row.l_name,
            email,
            phone,
            address_id: row.address_id.map(AddressId::new),
        })
    }
}

/// Repository for customer database operations.
pub struct CustomerRepository<'c> {
    conn: &'c mut AnyConnection,
}

impl<'c> CustomerRepository<'c> {
    /// Create a repository over a connection or an open transaction.
    #[must_use]
    pub const fn new(conn: &'c mut AnyConnection) -> Self {
        Self { conn }
    }

    /// Insert a validated customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Constraint` if the email is taken or the
    /// address no longer exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&mut self, customer: &NewCustomer) -> Result<Customer, RepositoryError> {
        let row: CustomerRow = sqlx::query_as(&format!(
            "INSERT INTO customers (f_name, l_name, email, phone, address_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(customer.f_name.as_str())
        .bind(customer.l_name.as_deref())
        .bind(customer.email.as_str())
        .bind(customer.phone.as_ref().map(PhoneNumber::as_str))
        .bind(customer.address_id.map(|id| id.as_i64()))
        .fetch_one(&mut *self.conn)
        .await?;

        row.try_into()
    }

    /// Get a customer by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored value is invalid.
    pub async fn get_by_id(&mut self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row: Option<CustomerRow> = sqlx::query_as(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&mut *self.conn)
        .await?;

        row.map(Customer::try_from).transpose()
    }

    /// List all customers, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored value is invalid.
    pub async fn list(&mut self) -> Result<Vec<Customer>, RepositoryError> {
        let rows: Vec<CustomerRow> = sqlx::query_as(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY id"
        ))
        .fetch_all(&mut *self.conn)
        .await?;

        rows.into_iter().map(Customer::try_from).collect()
    }
}
