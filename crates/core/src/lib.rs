//! Mercato Core - value types and field validators.
//!
//! This crate provides the validated field types used by the Mercato API:
//! - country and subdivision codes (ISO 3166 / ISO 3166-2)
//! - email addresses with normalization
//! - phone numbers in E.164 form
//! - type-safe entity IDs
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Every constructor either returns a normalized value or a
//! typed error, so the API crate can run all field validation before it
//! touches the store.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers and the [`FieldValidationError`] they map into

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
