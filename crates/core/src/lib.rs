//! `twinapi-core`: domain building blocks shared by every surface style.
//!
//! This crate contains **pure domain** primitives (no HTTP, no storage).

pub mod customer;
pub mod entity;
pub mod error;
pub mod id;
pub mod validation;

pub use customer::Customer;
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::CustomerId;
pub use validation::{DeriveValidator, ErasedValidator, FieldErrors, Validator, ValidatorRegistry};
