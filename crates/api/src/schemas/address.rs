//! Address payload schema.

use serde_json::{Map, Value, json};

use super::FieldReader;
use crate::error::WriteError;
use crate::models::address::{Address, AddressFields, NewAddress};

/// Maps address payloads to [`NewAddress`] and stored addresses back to JSON.
pub struct AddressSchema;

impl AddressSchema {
    pub const COUNTRY_CODE_MAX: usize = 2;
    pub const STATE_CODE_MAX: usize = 3;
    pub const CITY_MAX: usize = 50;
    pub const STREET_MAX: usize = 100;
    pub const POSTCODE_MAX: usize = 10;

    /// Load an address from a payload.
    ///
    /// `id` is generated by the store and is rejected as an unknown field.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError::Schema`] with every structural problem, or
    /// [`WriteError::Field`] from the first failing field validator.
    pub fn load(payload: &Map<String, Value>) -> Result<NewAddress, WriteError> {
        let mut reader = FieldReader::new(payload);
        let fields = AddressFields {
            country_code: reader.required_string("country_code", Self::COUNTRY_CODE_MAX),
            state_code: reader.required_string("state_code", Self::STATE_CODE_MAX),
            city: reader.optional_string("city", Self::CITY_MAX),
            street: reader.required_string("street", Self::STREET_MAX),
            postcode: reader.required_string("postcode", Self::POSTCODE_MAX),
        };
        reader.finish()?;

        Ok(NewAddress::new(fields)?)
    }

    /// Render a stored address, including its generated `id`.
    #[must_use]
    pub fn dump(address: &Address) -> Value {
        json!({
            "id": address.id,
            "country_code": address.country_code.as_str(),
            "state_code": address.state_code.as_str(),
            "city": address.city,
            "street": address.street,
            "postcode": address.postcode,
        })
    }
}
