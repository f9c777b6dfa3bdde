//! Customer payload schema.

use serde_json::{Map, Value, json};
use sqlx::AnyConnection;

use mercato_core::{AddressId, Email, PhoneNumber};

use super::FieldReader;
use crate::db::AddressRepository;
use crate::error::WriteError;
use crate::models::customer::{Customer, CustomerFields, NewCustomer};

/// Maps customer payloads to [`NewCustomer`] and stored customers back to JSON.
pub struct CustomerSchema;

impl CustomerSchema {
    pub const NAME_MAX: usize = 50;
    pub const EMAIL_MAX: usize = Email::MAX_LENGTH;
    pub const PHONE_MAX: usize = 20;

    /// Load a customer from a payload.
    ///
    /// `address_id` is looked up on `conn`, which should be the write's own
    /// transaction, and must name an existing address.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError::Schema`] with every structural problem,
    /// [`WriteError::Field`] from the first failing field validator, or
    /// [`WriteError::Repository`] if the lookup fails.
    pub async fn load(
        conn: &mut AnyConnection,
        payload: &Map<String, Value>,
    ) -> Result<NewCustomer, WriteError> {
        let mut reader = FieldReader::new(payload);
        let f_name = reader.required_string("f_name", Self::NAME_MAX);
        let l_name = reader.optional_string("l_name", Self::NAME_MAX);
        let email = reader.required_string("email", Self::EMAIL_MAX);
        let phone = reader.optional_string("phone", Self::PHONE_MAX);

        let address = match reader.optional_integer("address_id") {
            Some(id) => {
                let found = AddressRepository::new(conn)
                    .resolve(AddressId::new(id))
                    .await?;
                if found.is_none() {
                    reader.add_error("address_id", format!("Address with id {id} does not exist."));
                }
                found
            }
            None => None,
        };
        reader.finish()?;

        Ok(NewCustomer::new(CustomerFields {
            f_name,
            l_name,
            email,
            phone,
            address,
        })?)
    }

    /// Render a stored customer, including its generated `id`.
    #[must_use]
    pub fn dump(customer: &Customer) -> Value {
        json!({
            "id": customer.id,
            "f_name": customer.f_name,
            "l_name": customer.l_name,
            "email": customer.email.as_str(),
            "phone": customer.phone.as_ref().map(PhoneNumber::as_str),
            "address_id": customer.address_id,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::db::tests::memory_pool;

    fn object(value: Value) -> Map<String, Value> {
        let Value::Object(map) = value else {
            panic!("test payload must be an object");
        };
        map
    }

    async fn seed_address(conn: &mut AnyConnection) -> i64 {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO addresses (country_code, state_code, street, postcode) \
             VALUES ('US', 'WA', '400 Broad St', '98109') RETURNING id",
        )
        .fetch_one(conn)
        .await
        .unwrap();
        id
    }

    #[tokio::test]
    async fn test_load_resolves_address() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let address_id = seed_address(&mut conn).await;

        let payload = object(json!({
            "f_name": "Ada",
            "email": "ada@example.com",
            "address_id": address_id,
        }));
        let customer = CustomerSchema::load(&mut conn, &payload).await.unwrap();

        assert_eq!(customer.address_id, Some(AddressId::new(address_id)));
        assert_eq!(customer.phone, None);
        assert_eq!(customer.l_name, None);
    }

    #[tokio::test]
    async fn test_load_unknown_address() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let payload = object(json!({
            "f_name": "Ada",
            "email": "ada@example.com",
            "address_id": 77,
        }));
        let Err(WriteError::Schema(err)) = CustomerSchema::load(&mut conn, &payload).await else {
            panic!("expected schema error");
        };

        assert_eq!(err.errors["address_id"], vec!["Address with id 77 does not exist."]);
    }

    #[tokio::test]
    async fn test_load_missing_address_fails_field_validation() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let payload = object(json!({ "f_name": "Ada", "email": "ada@example.com" }));
        let Err(WriteError::Field(err)) = CustomerSchema::load(&mut conn, &payload).await else {
            panic!("expected field error");
        };

        assert_eq!(err.field, "address_id");
    }

    #[tokio::test]
    async fn test_load_structural_errors() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let payload = object(json!({
            "f_name": 12,
            "email": null,
            "address_id": "abc",
            "nickname": "Countess",
        }));
        let Err(WriteError::Schema(err)) = CustomerSchema::load(&mut conn, &payload).await else {
            panic!("expected schema error");
        };

        assert_eq!(err.errors["f_name"], vec!["Not a valid string."]);
        assert_eq!(err.errors["email"], vec!["Field may not be null."]);
        assert_eq!(err.errors["address_id"], vec!["Not a valid integer."]);
        assert_eq!(err.errors["nickname"], vec!["Unknown field."]);
    }
}
