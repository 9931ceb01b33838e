//! Endpoint-group adapter: hooks attached as route middleware.
//!
//! An [`EndpointGroup`] maps handler functions route by route. Every mapped
//! endpoint declares its parameters; at registration the group's
//! [`FilterPipeline`] resolves the endpoint's hooks and, when there are any,
//! wraps that route in [`endpoint_filter`]. The middleware binds the declared
//! parameters from the request, runs the hooks, and then forwards the
//! untouched request to the handler.

use std::time::Instant;

use axum::{
    body::Body,
    extract::{Request, State},
    handler::Handler,
    middleware::{from_fn_with_state, Next},
    response::Response,
    routing::{self, MethodRouter},
    Router,
};

use crate::app::errors;
use crate::binding::{BoundArguments, Parameter, RequestInput};
use crate::context::EndpointDescriptor;
use crate::filter::{run_hooks, FilterPipeline, Hooks};

/// Request bodies above this size are refused before any hook runs.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Clone)]
pub struct EndpointFilterState {
    route: String,
    parameters: Vec<Parameter>,
    hooks: Hooks,
}

/// Route middleware running the endpoint's hooks before its handler.
///
/// A request whose declared parameters cannot be bound is forwarded as is, so
/// the handler's own extractors produce the framework's usual rejection.
pub async fn endpoint_filter(
    State(state): State<EndpointFilterState>,
    req: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = req.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(b) => b,
        Err(e) => {
            tracing::debug!(route = %state.route, error = %e, "failed to buffer request body");
            return errors::json_error(
                axum::http::StatusCode::PAYLOAD_TOO_LARGE,
                "body_unreadable",
                e.to_string(),
            );
        }
    };

    let input = RequestInput::from_parts(&mut parts, bytes).await;
    match BoundArguments::bind(&state.parameters, &input) {
        Ok(arguments) => {
            let invocation = arguments.invocation(&state.route);
            if let Some(response) = run_hooks(&state.hooks, &invocation) {
                return response;
            }
        }
        Err(e) => {
            tracing::debug!(route = %state.route, error = %e, "arguments not bound; skipping filters");
        }
    }

    next.run(Request::from_parts(parts, Body::from(input.body))).await
}

/// Outermost layer: one log line per request with its status and latency.
pub async fn trace_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        "request handled"
    );
    response
}

/// A group of endpoints sharing a path prefix and a filter pipeline.
pub struct EndpointGroup {
    prefix: String,
    pipeline: FilterPipeline,
    router: Router,
}

impl EndpointGroup {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            pipeline: FilterPipeline::new(),
            router: Router::new(),
        }
    }

    /// Attach the filter pipeline consulted for every endpoint mapped afterwards.
    pub fn with_filters(mut self, pipeline: FilterPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Map `handler` at `prefix + path`.
    ///
    /// `method` labels the endpoint in logs; `parameters` mirror the handler's
    /// own extractors.
    pub fn map(
        mut self,
        method: &str,
        path: &str,
        handler: MethodRouter,
        parameters: Vec<Parameter>,
    ) -> Self {
        let full_path = format!("{}{}", self.prefix, path);
        let route = format!("{method} {full_path}");
        let endpoint = EndpointDescriptor::new(
            route.clone(),
            parameters.iter().map(Parameter::descriptor).collect(),
        );

        let hooks = self.pipeline.build(&endpoint);
        let handler = if hooks.is_empty() {
            handler
        } else {
            let state = EndpointFilterState {
                route,
                parameters,
                hooks,
            };
            handler.route_layer(from_fn_with_state(state, endpoint_filter))
        };

        self.router = self.router.route(&full_path, handler);
        self
    }

    pub fn map_get<H, T>(self, path: &str, handler: H, parameters: Vec<Parameter>) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.map("GET", path, routing::get(handler), parameters)
    }

    pub fn map_post<H, T>(self, path: &str, handler: H, parameters: Vec<Parameter>) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.map("POST", path, routing::post(handler), parameters)
    }

    pub fn map_put<H, T>(self, path: &str, handler: H, parameters: Vec<Parameter>) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.map("PUT", path, routing::put(handler), parameters)
    }

    pub fn map_delete<H, T>(self, path: &str, handler: H, parameters: Vec<Parameter>) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.map("DELETE", path, routing::delete(handler), parameters)
    }

    pub fn into_router(self) -> Router {
        self.router
    }
}
