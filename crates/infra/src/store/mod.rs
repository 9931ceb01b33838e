//! Customer persistence abstractions.

pub mod customer_store;

pub use customer_store::{CustomerStore, InMemoryCustomerStore};
