//! Infrastructure layer: persistence and configuration.

pub mod config;
pub mod store;

pub use self::config::{AppConfig, LoggerConfig, ServerConfig};
pub use self::store::{CustomerStore, InMemoryCustomerStore};
