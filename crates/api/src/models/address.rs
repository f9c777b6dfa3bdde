//! Address domain types and field validators.

use serde::{Deserialize, Serialize};

use mercato_core::{AddressId, CountryCode, FieldValidationError, StateCode};

/// Address input that passed schema checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressFields {
    pub country_code: String,
    pub state_code: String,
    pub city: Option<String>,
    pub street: String,
    pub postcode: String,
}

/// An address whose fields passed validation, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAddress {
    /// ISO 3166-1 alpha-2, uppercase.
    pub country_code: CountryCode,
    /// ISO 3166-2 subdivision, uppercase.
    pub state_code: StateCode,
    pub city: Option<String>,
    pub street: String,
    pub postcode: String,
}

impl NewAddress {
    /// Run the address field validators.
    ///
    /// # Errors
    ///
    /// Returns the first [`FieldValidationError`] raised, checking
    /// `country_code` before `state_code`.
    pub fn new(fields: AddressFields) -> Result<Self, FieldValidationError> {
        Ok(Self {
            country_code: validate_country_code(&fields.country_code)?,
            state_code: validate_state_code(&fields.state_code)?,
            city: fields.city,
            street: fields.street,
            postcode: fields.postcode,
        })
    }
}

/// Validate and uppercase a country code.
///
/// # Errors
///
/// Returns a `country_code` error unless the input is exactly two letters.
pub fn validate_country_code(raw: &str) -> Result<CountryCode, FieldValidationError> {
    CountryCode::parse(raw).map_err(|e| FieldValidationError::new("country_code", e.to_string()))
}

/// Validate and uppercase a state code.
///
/// # Errors
///
/// Returns a `state_code` error unless the input is two or three letters.
pub fn validate_state_code(raw: &str) -> Result<StateCode, FieldValidationError> {
    StateCode::parse(raw).map_err(|e| FieldValidationError::new("state_code", e.to_string()))
}

/// A stored address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub country_code: CountryCode,
    pub state_code: StateCode,
    pub city: Option<String>,
    pub street: String,
    pub postcode: String,
}

/// An address id confirmed to exist in the current transaction.
///
/// Only the customer schema creates these, after looking the id up, so a
/// customer can never be built around an id that was merely supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRef(AddressId);

impl AddressRef {
    pub(crate) const fn resolved(id: AddressId) -> Self {
        Self(id)
    }

    /// The referenced address id.
    #[must_use]
    pub const fn id(self) -> AddressId {
        self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fields() -> AddressFields {
        AddressFields {
            country_code: "us".to_string(),
            state_code: "ca".to_string(),
            city: Some("San Francisco".to_string()),
            street: "1 Market St".to_string(),
            postcode: "94105".to_string(),
        }
    }

    #[test]
    fn test_new_address_uppercases_codes() {
        let address = NewAddress::new(fields()).unwrap();
        assert_eq!(address.country_code.as_str(), "US");
        assert_eq!(address.state_code.as_str(), "CA");
        assert_eq!(address.street, "1 Market St");
    }

    #[test]
    fn test_new_address_rejects_bad_country_code() {
        let err = NewAddress::new(AddressFields {
            country_code: "USA".to_string(),
            ..fields()
        })
        .unwrap_err();

        assert_eq!(err.field, "country_code");
        assert_eq!(
            err.reason,
            "ISO 3166 country code must be 2 alphabetical characters"
        );
    }

    #[test]
    fn test_new_address_rejects_bad_state_code() {
        let err = NewAddress::new(AddressFields {
            state_code: "C".to_string(),
            ..fields()
        })
        .unwrap_err();

        assert_eq!(err.field, "state_code");
        assert_eq!(
            err.reason,
            "ISO 3166-2 subdivision code must be 2 or 3 alphabetical characters"
        );
    }

    #[test]
    fn test_country_code_checked_before_state_code() {
        let err = NewAddress::new(AddressFields {
            country_code: "1".to_string(),
            state_code: "2".to_string(),
            ..fields()
        })
        .unwrap_err();

        assert_eq!(err.field, "country_code");
    }

    #[test]
    fn test_three_letter_state_code() {
        let address = NewAddress::new(AddressFields {
            country_code: "gb".to_string(),
            state_code: "lnd".to_string(),
            ..fields()
        })
        .unwrap();

        assert_eq!(address.state_code.as_str(), "LND");
    }
}
