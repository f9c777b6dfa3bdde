//! Domain models for the API.
//!
//! Each entity comes in three shapes:
//!
//! - `*Fields` - structurally valid input produced by a schema
//! - `New*` - input that passed the entity's field validators, ready to insert
//! - the stored entity itself, with its generated id
//!
//! Field validators live next to the entity and are the only way to build a
//! `New*` value, so nothing reaches the store without passing them.

pub mod address;
pub mod customer;

pub use address::{Address, AddressFields, AddressRef, NewAddress};
pub use customer::{Customer, CustomerFields, NewCustomer};
