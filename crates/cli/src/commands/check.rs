//! Field checks for operators cleaning up customer data.
//!
//! Each check runs the same validator the API runs on create, so the printed
//! value is exactly what would be stored.

use mercato_api::models::customer::{validate_email, validate_phone};
use mercato_core::{Email, PhoneNumber};
use thiserror::Error;

/// A value was rejected by its validator.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("{0}")]
    Rejected(String),
    #[error("no phone number given")]
    EmptyPhone,
}

/// Normalize an email address.
///
/// # Errors
///
/// Returns the validator's reason if the address is rejected.
pub fn email(raw: &str) -> Result<String, CheckError> {
    validate_email(raw)
        .map(Email::into_inner)
        .map_err(|e| CheckError::Rejected(e.reason))
}

/// Normalize a phone number to E.164.
///
/// # Errors
///
/// Returns the validator's reason if the number is rejected.
pub fn phone(raw: &str) -> Result<String, CheckError> {
    validate_phone(Some(raw))
        .map_err(|e| CheckError::Rejected(e.reason))?
        .map(PhoneNumber::into_inner)
        .ok_or(CheckError::EmptyPhone)
}

/// Print a normalized value on stdout.
#[allow(clippy::print_stdout)]
pub fn print(value: &str) {
    println!("{value}");
}
