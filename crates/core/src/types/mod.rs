//! Core types for Mercato.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod field;
pub mod id;
pub mod phone;
pub mod region;

pub use email::{Email, EmailError};
pub use field::FieldValidationError;
pub use id::*;
pub use phone::{PhoneError, PhoneNumber};
pub use region::{CountryCode, RegionCodeError, StateCode};
