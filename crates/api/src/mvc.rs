//! Controller adapter: hooks run as action filters.
//!
//! A [`Controller`] is a type whose methods are actions. Each action is
//! described by an [`ActionDescriptor`]: HTTP method, route template,
//! declared parameters and the function that calls the method. The generic
//! invoker binds every declared parameter, runs the action's filters over the
//! bound arguments, and only then calls the action.

use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{on, MethodFilter},
    Json, Router,
};
use serde::Serialize;

use crate::app::errors;
use crate::binding::{BindError, BoundArguments, Parameter, RequestInput};
use crate::context::EndpointDescriptor;
use crate::filter::{run_hooks, FilterPipeline, Hooks};
use crate::middleware::MAX_BODY_BYTES;

/// Calls one action method with its bound arguments.
pub type ActionFn<C> = fn(&C, &mut BoundArguments) -> Result<ActionResult, BindError>;

/// Outcome of a controller action.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult {
    Ok(serde_json::Value),
    Created {
        location: String,
        body: serde_json::Value,
    },
    NoContent,
    NotFound,
    /// The action's value could not be serialised.
    Failed(String),
}

impl ActionResult {
    pub fn ok<T: Serialize>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(body) => Self::Ok(body),
            Err(e) => Self::Failed(e.to_string()),
        }
    }

    pub fn created<T: Serialize>(location: impl Into<String>, value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(body) => Self::Created {
                location: location.into(),
                body,
            },
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}

impl IntoResponse for ActionResult {
    fn into_response(self) -> Response {
        match self {
            ActionResult::Ok(body) => (StatusCode::OK, Json(body)).into_response(),
            ActionResult::Created { location, body } => (
                StatusCode::CREATED,
                [(header::LOCATION, location)],
                Json(body),
            )
                .into_response(),
            ActionResult::NoContent => StatusCode::NO_CONTENT.into_response(),
            ActionResult::NotFound => errors::not_found(),
            ActionResult::Failed(msg) => {
                errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "serialization_error", msg)
            }
        }
    }
}

pub struct ActionDescriptor<C> {
    name: &'static str,
    method: Method,
    filter: MethodFilter,
    template: &'static str,
    parameters: Vec<Parameter>,
    invoke: ActionFn<C>,
}

impl<C> ActionDescriptor<C> {
    fn new(
        method: Method,
        filter: MethodFilter,
        template: &'static str,
        name: &'static str,
        invoke: ActionFn<C>,
    ) -> Self {
        Self {
            name,
            method,
            filter,
            template,
            parameters: Vec::new(),
            invoke,
        }
    }

    pub fn get(template: &'static str, name: &'static str, invoke: ActionFn<C>) -> Self {
        Self::new(Method::GET, MethodFilter::GET, template, name, invoke)
    }

    pub fn post(template: &'static str, name: &'static str, invoke: ActionFn<C>) -> Self {
        Self::new(Method::POST, MethodFilter::POST, template, name, invoke)
    }

    pub fn put(template: &'static str, name: &'static str, invoke: ActionFn<C>) -> Self {
        Self::new(Method::PUT, MethodFilter::PUT, template, name, invoke)
    }

    pub fn delete(template: &'static str, name: &'static str, invoke: ActionFn<C>) -> Self {
        Self::new(Method::DELETE, MethodFilter::DELETE, template, name, invoke)
    }

    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }
}

/// A type whose methods are exposed as actions under [`Controller::ROUTE`].
pub trait Controller: Send + Sync + Sized + 'static {
    const ROUTE: &'static str;

    fn actions() -> Vec<ActionDescriptor<Self>>;
}

struct ActionInvoker<C> {
    controller: Arc<C>,
    route: String,
    parameters: Vec<Parameter>,
    hooks: Hooks,
    invoke: ActionFn<C>,
}

impl<C: Controller> ActionInvoker<C> {
    async fn invoke(&self, req: Request) -> Response {
        let (mut parts, body) = req.into_parts();
        let bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
            Ok(b) => b,
            Err(e) => {
                return errors::json_error(
                    StatusCode::PAYLOAD_TOO_LARGE,
                    "body_unreadable",
                    e.to_string(),
                );
            }
        };

        let input = RequestInput::from_parts(&mut parts, bytes).await;
        let mut arguments = match BoundArguments::bind(&self.parameters, &input) {
            Ok(a) => a,
            Err(e) => {
                tracing::debug!(route = %self.route, error = %e, "action arguments not bound");
                return errors::bind_error_to_response(e);
            }
        };

        if let Some(response) = run_hooks(&self.hooks, &arguments.invocation(&self.route)) {
            return response;
        }

        match (self.invoke)(&self.controller, &mut arguments) {
            Ok(result) => result.into_response(),
            Err(e) => errors::bind_error_to_response(e),
        }
    }
}

/// Register every action of `controller`, each with the hooks `pipeline`
/// resolves for its parameters.
pub fn map_controller<C: Controller>(controller: Arc<C>, pipeline: &FilterPipeline) -> Router {
    let mut router = Router::new();

    for action in C::actions() {
        let path = format!("{}{}", C::ROUTE, action.template);
        let route = format!("{} {}", action.method, path);
        let endpoint = EndpointDescriptor::new(
            route.clone(),
            action.parameters.iter().map(Parameter::descriptor).collect(),
        );
        let hooks = pipeline.build(&endpoint);
        tracing::debug!(
            controller = std::any::type_name::<C>(),
            action = action.name,
            route = %route,
            "action mapped"
        );

        let invoker = Arc::new(ActionInvoker {
            controller: controller.clone(),
            route,
            parameters: action.parameters,
            hooks,
            invoke: action.invoke,
        });
        let handler = move |req: Request| {
            let invoker = invoker.clone();
            async move { invoker.invoke(req).await }
        };

        router = router.route(&path, on(action.filter, handler));
    }

    router
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_results_map_to_statuses() {
        assert_eq!(ActionResult::ok(&1).into_response().status(), StatusCode::OK);
        assert_eq!(ActionResult::NoContent.into_response().status(), StatusCode::NO_CONTENT);
        assert_eq!(ActionResult::NotFound.into_response().status(), StatusCode::NOT_FOUND);

        let created = ActionResult::created("/things/1", &serde_json::json!({"id": 1})).into_response();
        assert_eq!(created.status(), StatusCode::CREATED);
        assert_eq!(created.headers().get(header::LOCATION).unwrap(), "/things/1");
    }
}
