//! Service wiring: store, validators and the filter pipeline shared by both
//! surface styles.

use std::sync::Arc;

use twinapi_core::ValidatorRegistry;
use twinapi_infra::{CustomerStore, InMemoryCustomerStore};

use crate::app::dto::{CreateCustomerRequest, UpdateCustomerRequest};
use crate::app::existence::CustomerExistsFilter;
use crate::filter::{FilterPipeline, ValidationFilter};

pub struct AppServices {
    pub store: Arc<dyn CustomerStore>,
    pub validators: Arc<ValidatorRegistry>,
}

impl AppServices {
    pub fn new(store: Arc<dyn CustomerStore>) -> Self {
        Self {
            store,
            validators: Arc::new(build_validators()),
        }
    }

    /// Dev/test wiring: process-lifetime in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryCustomerStore::new()))
    }

    /// Filters applied to every endpoint, in order: a missing customer is
    /// reported before its payload is validated.
    pub fn filter_pipeline(&self) -> FilterPipeline {
        FilterPipeline::new()
            .with(CustomerExistsFilter::new(self.store.clone()))
            .with(ValidationFilter::new(self.validators.clone()))
    }
}

/// Validators for every request shape, built once per process.
pub fn build_validators() -> ValidatorRegistry {
    let mut registry = ValidatorRegistry::new();
    registry
        .register_derived::<CreateCustomerRequest>()
        .register_derived::<UpdateCustomerRequest>();
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_request_shape_has_a_validator() {
        let registry = build_validators();
        assert!(registry.contains::<CreateCustomerRequest>());
        assert!(registry.contains::<UpdateCustomerRequest>());
        assert_eq!(registry.len(), 2);
    }
}
