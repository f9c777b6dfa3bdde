//! Customer domain types and field validators.

use serde::{Deserialize, Serialize};

use mercato_core::{AddressId, CustomerId, Email, FieldValidationError, PhoneNumber};

use super::address::AddressRef;

/// Customer input that passed schema checks.
///
/// `address` is only ever populated with an address that exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerFields {
    pub f_name: String,
    pub l_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<AddressRef>,
}

/// A customer whose fields passed validation, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub f_name: String,
    pub l_name: Option<String>,
    /// Normalized address.
    pub email: Email,
    /// E.164 form.
    pub phone: Option<PhoneNumber>,
    pub address_id: Option<AddressId>,
}

impl NewCustomer {
    /// Run the customer field validators for a customer being created.
    ///
    /// # Errors
    ///
    /// Returns the first [`FieldValidationError`] raised, checking `email`,
    /// then `phone`, then `address_id`.
    pub fn new(fields: CustomerFields) -> Result<Self, FieldValidationError> {
        Ok(Self {
            email: validate_email(&fields.email)?,
            phone: validate_phone(fields.phone.as_deref())?,
            address_id: validate_address_id(None, fields.address)?,
            f_name: fields.f_name,
            l_name: fields.l_name,
        })
    }
}

/// Validate and normalize an email address.
///
/// # Errors
///
/// Returns an `email` error if the input is empty or not a valid address.
pub fn validate_email(raw: &str) -> Result<Email, FieldValidationError> {
    if raw.is_empty() {
        return Err(FieldValidationError::new("email", "No email provided"));
    }
    Email::parse(raw).map_err(|e| FieldValidationError::new("email", format!("Invalid email: {e}")))
}

/// Validate a phone number and convert it to E.164.
///
/// An absent or empty phone number is accepted and stays absent.
///
/// # Errors
///
/// Returns a `phone` error if the number is unparseable, has an impossible
/// length, or is not in use.
pub fn validate_phone(raw: Option<&str>) -> Result<Option<PhoneNumber>, FieldValidationError> {
    match raw {
        None | Some("") => Ok(None),
        Some(raw) => PhoneNumber::parse(raw)
            .map(Some)
            .map_err(|e| FieldValidationError::new("phone", e.to_string())),
    }
}

/// Validate a customer's address reference.
///
/// `existing` is the id of the customer being modified, or `None` while the
/// customer is being created. A new customer must reference an address; a
/// stored customer may lose its address (it is detached when the address is
/// deleted).
///
/// # Errors
///
/// Returns an `address_id` error when creating a customer without an address.
pub fn validate_address_id(
    existing: Option<CustomerId>,
    address: Option<AddressRef>,
) -> Result<Option<AddressId>, FieldValidationError> {
    match (existing, address) {
        (None, None) => Err(FieldValidationError::new(
            "address_id",
            "An address is required for a new customer",
        )),
        (_, address) => Ok(address.map(AddressRef::id)),
    }
}

/// A stored customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub f_name: String,
    pub l_name: Option<String>,
    pub email: Email,
    pub phone: Option<PhoneNumber>,
    /// `None` once the address has been deleted.
    pub address_id: Option<AddressId>,
}
