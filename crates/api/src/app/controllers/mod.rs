//! Controller-style surface.

pub mod customers;

pub use customers::CustomersController;
