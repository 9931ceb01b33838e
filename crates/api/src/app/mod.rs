//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store, validator registry and the shared filter pipeline
//! - `routes/`: endpoint-style handlers and the top-level router
//! - `controllers/`: controller-style actions
//! - `dto.rs`: request DTOs and paging
//! - `errors.rs`: problem and error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod controllers;
pub mod dto;
pub mod errors;
pub mod existence;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: Arc<AppServices>) -> Router {
    let api = routes::router(&services);

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(api)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::trace_requests))
                .layer(Extension(services)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    const MOUNTS: [&str; 3] = [
        "/minimal/customers",
        "/minimalgroup/customers",
        "/controller/customers",
    ];

    fn app() -> Router {
        build_app(Arc::new(AppServices::in_memory()))
    }

    fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn blank_create_is_rejected_on_every_mount() {
        for mount in MOUNTS {
            let response = app()
                .oneshot(json_request("POST", mount, r#"{"name":"  "}"#))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{mount}");
            assert_eq!(
                response.headers().get(header::CONTENT_TYPE).unwrap(),
                errors::PROBLEM_JSON
            );
            let body = body_json(response).await;
            assert_eq!(body["errors"]["name"][0], "'name' must not be empty.");
        }
    }

    #[tokio::test]
    async fn create_reaches_handler_with_body_intact() {
        let app = app();
        let response = app
            .clone()
            .oneshot(json_request("POST", "/minimal/customers", r#"{"name":"Test"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/minimal/customers/1"
        );
        assert_eq!(body_json(response).await["name"], "Test");

        let response = app
            .oneshot(Request::get("/controller/customers/1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn body_binding_statuses_match_across_mounts() {
        let cases = [
            ("POST", "", None, r#"{"name":"x"}"#, StatusCode::UNSUPPORTED_MEDIA_TYPE),
            ("POST", "", Some("text/plain"), r#"{"name":"x"}"#, StatusCode::UNSUPPORTED_MEDIA_TYPE),
            ("POST", "", Some("application/json"), r#"{"name":5}"#, StatusCode::UNPROCESSABLE_ENTITY),
            ("PUT", "/999", Some("application/json"), r#"{"name":5}"#, StatusCode::UNPROCESSABLE_ENTITY),
        ];

        for mount in MOUNTS {
            for (method, suffix, content_type, body, expected) in cases {
                let mut builder = Request::builder().method(method).uri(format!("{mount}{suffix}"));
                if let Some(ct) = content_type {
                    builder = builder.header(header::CONTENT_TYPE, ct);
                }
                let response = app()
                    .oneshot(builder.body(Body::from(body)).unwrap())
                    .await
                    .unwrap();
                assert_eq!(response.status(), expected, "{method} {mount}{suffix} {content_type:?}");
            }
        }
    }

    #[tokio::test]
    async fn grouped_mount_reports_its_own_location() {
        let response = app()
            .oneshot(json_request("POST", "/minimalgroup/customers", r#"{"name":"g"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/minimalgroup/customers/1"
        );
    }

    #[tokio::test]
    async fn update_of_missing_customer_is_404_before_validation() {
        for mount in MOUNTS {
            let response = app()
                .oneshot(json_request("PUT", &format!("{mount}/999"), r#"{"name":""}"#))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{mount}");
        }
    }
}
