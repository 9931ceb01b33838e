//! Hook rejecting requests that address a customer the store does not hold.

use std::sync::Arc;

use axum::response::Response;
use twinapi_core::CustomerId;
use twinapi_infra::CustomerStore;

use crate::app::errors;
use crate::context::{EndpointDescriptor, InvocationContext};
use crate::filter::{FilterFactory, PreHandlerHook};

/// Answers 404 for an unknown `CustomerId` argument before payload validation
/// runs, so a missing customer is reported regardless of the payload.
///
/// Only attached to endpoints that take both a customer id and a validated
/// argument; elsewhere the handler's own lookup already decides.
#[derive(Clone)]
pub struct CustomerExistsFilter {
    store: Arc<dyn CustomerStore>,
}

impl CustomerExistsFilter {
    pub fn new(store: Arc<dyn CustomerStore>) -> Self {
        Self { store }
    }
}

impl FilterFactory for CustomerExistsFilter {
    fn create(&self, endpoint: &EndpointDescriptor) -> Option<Arc<dyn PreHandlerHook>> {
        let parameters = endpoint.parameters();
        let addresses_customer = parameters.iter().any(|p| p.is::<CustomerId>());
        let validates_payload = parameters.iter().any(|p| p.is_validated());

        if addresses_customer && validates_payload {
            Some(Arc::new(self.clone()))
        } else {
            None
        }
    }
}

impl PreHandlerHook for CustomerExistsFilter {
    fn before_handler(&self, invocation: &InvocationContext<'_>) -> Option<Response> {
        let missing = invocation
            .arguments()
            .iter()
            .filter_map(|a| a.downcast::<CustomerId>())
            .find(|id| self.store.get(**id).is_none())?;

        tracing::info!(route = invocation.route(), customer_id = %missing, "customer not found");
        Some(errors::not_found())
    }
}
