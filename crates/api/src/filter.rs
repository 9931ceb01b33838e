//! Pre-handler hooks and the validation filter.
//!
//! A [`FilterFactory`] inspects an endpoint's declared parameters once, at
//! registration, and may return a [`PreHandlerHook`] for it. At request time
//! the hooks of an endpoint run in order against the bound arguments; the
//! first hook that returns a response short-circuits the handler.
//!
//! Both dispatch styles (the endpoint group in [`crate::middleware`] and the
//! controller invoker in [`crate::mvc`]) drive the same hooks built by the
//! same [`FilterPipeline`].

use std::sync::Arc;

use axum::response::Response;
use twinapi_core::{ErasedValidator, FieldErrors, ValidatorRegistry};

use crate::app::errors;
use crate::context::{ArgumentDescriptor, EndpointDescriptor, InvocationContext};

/// Code that runs immediately before a handler and may replace its response.
pub trait PreHandlerHook: Send + Sync {
    /// `Some(response)` short-circuits the handler; `None` lets it run unchanged.
    fn before_handler(&self, invocation: &InvocationContext<'_>) -> Option<Response>;
}

/// Builds the hook for one endpoint, or `None` when it has nothing to do there.
pub trait FilterFactory: Send + Sync {
    fn create(&self, endpoint: &EndpointDescriptor) -> Option<Arc<dyn PreHandlerHook>>;
}

pub type Hooks = Arc<[Arc<dyn PreHandlerHook>]>;

/// Ordered set of filter factories applied to every registered endpoint.
#[derive(Clone, Default)]
pub struct FilterPipeline {
    factories: Vec<Arc<dyn FilterFactory>>,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, factory: impl FilterFactory + 'static) -> Self {
        self.factories.push(Arc::new(factory));
        self
    }

    /// Resolve the hooks of `endpoint`, in factory order.
    pub fn build(&self, endpoint: &EndpointDescriptor) -> Hooks {
        let hooks: Vec<_> = self
            .factories
            .iter()
            .filter_map(|f| f.create(endpoint))
            .collect();
        tracing::debug!(route = endpoint.route(), hooks = hooks.len(), "endpoint filters resolved");
        hooks.into()
    }
}

/// Run `hooks` in order; the first response wins.
pub fn run_hooks(hooks: &[Arc<dyn PreHandlerHook>], invocation: &InvocationContext<'_>) -> Option<Response> {
    hooks.iter().find_map(|h| h.before_handler(invocation))
}

/// Filter factory that validates every argument flagged for validation with
/// the validator registered for its type.
#[derive(Clone)]
pub struct ValidationFilter {
    registry: Arc<ValidatorRegistry>,
}

impl ValidationFilter {
    pub fn new(registry: Arc<ValidatorRegistry>) -> Self {
        Self { registry }
    }

    /// Pair each flagged parameter with its validator.
    ///
    /// Flagged parameters without a registered validator are left out, so they
    /// pass through unvalidated.
    pub fn plan(&self, endpoint: &EndpointDescriptor) -> ValidationPlan {
        let mut steps = Vec::new();
        for descriptor in endpoint.parameters().iter().filter(|d| d.is_validated()) {
            match self.registry.validator_for(descriptor.type_id()) {
                Some(validator) => steps.push((*descriptor, validator)),
                None => tracing::debug!(
                    route = endpoint.route(),
                    argument = descriptor.name(),
                    shape = descriptor.type_name(),
                    "no validator registered; argument passes through"
                ),
            }
        }
        ValidationPlan { steps }
    }
}

impl FilterFactory for ValidationFilter {
    fn create(&self, endpoint: &EndpointDescriptor) -> Option<Arc<dyn PreHandlerHook>> {
        let plan = self.plan(endpoint);
        if plan.is_empty() {
            return None;
        }
        Some(Arc::new(plan))
    }
}

/// Validators resolved for one endpoint.
pub struct ValidationPlan {
    steps: Vec<(ArgumentDescriptor, Arc<dyn ErasedValidator>)>,
}

impl ValidationPlan {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Validate the bound arguments; stops at the first failing argument.
    ///
    /// Arguments that were not bound (or are bound to another type) are skipped.
    pub fn check(&self, invocation: &InvocationContext<'_>) -> Result<(), FieldErrors> {
        for (descriptor, validator) in &self.steps {
            let Some(argument) = invocation.argument(descriptor.name()) else {
                continue;
            };
            if let Some(result) = validator.validate_any(argument.value) {
                result?;
            }
        }
        Ok(())
    }
}

impl PreHandlerHook for ValidationPlan {
    fn before_handler(&self, invocation: &InvocationContext<'_>) -> Option<Response> {
        let errors = self.check(invocation).err()?;
        tracing::info!(
            route = invocation.route(),
            fields = ?errors.fields().collect::<Vec<_>>(),
            "request rejected by validation"
        );
        Some(errors::validation_problem(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde::Deserialize;
    use validator::Validate;

    #[derive(Debug, Deserialize, Validate)]
    struct Shape {
        #[validate(custom(function = "twinapi_core::validation::not_blank"))]
        name: String,
    }

    struct NoValidatorShape;

    fn filter() -> ValidationFilter {
        let mut registry = ValidatorRegistry::new();
        registry.register_derived::<Shape>();
        ValidationFilter::new(Arc::new(registry))
    }

    fn endpoint(parameters: Vec<ArgumentDescriptor>) -> EndpointDescriptor {
        EndpointDescriptor::new("POST /shapes", parameters)
    }

    #[test]
    fn unflagged_and_unregistered_arguments_produce_no_hook() {
        let filter = filter();
        let plain = endpoint(vec![ArgumentDescriptor::of::<Shape>("request")]);
        assert!(filter.create(&plain).is_none());

        let unknown = endpoint(vec![ArgumentDescriptor::of::<NoValidatorShape>("request").validated()]);
        assert!(filter.create(&unknown).is_none());
    }

    #[test]
    fn invalid_argument_short_circuits_with_problem() {
        let filter = filter();
        let descriptor = ArgumentDescriptor::of::<Shape>("request").validated();
        let hook = filter.create(&endpoint(vec![descriptor])).unwrap();

        let blank = Shape { name: " ".into() };
        let ctx = InvocationContext::new("POST /shapes").with(descriptor, &blank);
        let response = hook.before_handler(&ctx).unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let ok = Shape { name: "Ada".into() };
        let ctx = InvocationContext::new("POST /shapes").with(descriptor, &ok);
        assert!(hook.before_handler(&ctx).is_none());
    }

    #[test]
    fn plan_skips_arguments_that_were_not_bound() {
        let filter = filter();
        let descriptor = ArgumentDescriptor::of::<Shape>("request").validated();
        let plan = filter.plan(&endpoint(vec![descriptor]));
        assert_eq!(plan.len(), 1);

        let ctx = InvocationContext::new("POST /shapes");
        assert!(plan.check(&ctx).is_ok());
    }

    struct Reject;

    impl PreHandlerHook for Reject {
        fn before_handler(&self, _invocation: &InvocationContext<'_>) -> Option<Response> {
            Some(errors::not_found())
        }
    }

    struct RejectFactory;

    impl FilterFactory for RejectFactory {
        fn create(&self, _endpoint: &EndpointDescriptor) -> Option<Arc<dyn PreHandlerHook>> {
            Some(Arc::new(Reject))
        }
    }

    #[test]
    fn first_hook_in_pipeline_order_wins() {
        let pipeline = FilterPipeline::new().with(RejectFactory).with(filter());
        let descriptor = ArgumentDescriptor::of::<Shape>("request").validated();
        let hooks = pipeline.build(&endpoint(vec![descriptor]));
        assert_eq!(hooks.len(), 2);

        let blank = Shape { name: String::new() };
        let ctx = InvocationContext::new("POST /shapes").with(descriptor, &blank);
        let response = run_hooks(&hooks, &ctx).unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
