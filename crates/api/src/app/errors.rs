use axum::http::{header, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use twinapi_core::{DomainError, FieldErrors};

use crate::binding::BindError;

pub const PROBLEM_JSON: &str = "application/problem+json";

const VALIDATION_PROBLEM_TYPE: &str = "https://tools.ietf.org/html/rfc9110#section-15.5.1";
const VALIDATION_PROBLEM_TITLE: &str = "One or more validation errors occurred.";

/// Problem-details body for a failed validation (RFC 9457 shape).
#[derive(Debug, Serialize)]
pub struct ValidationProblem {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: &'static str,
    pub status: u16,
    pub errors: FieldErrors,
    #[serde(rename = "traceId")]
    pub trace_id: String,
}

impl ValidationProblem {
    pub fn new(errors: FieldErrors) -> Self {
        Self {
            kind: VALIDATION_PROBLEM_TYPE,
            title: VALIDATION_PROBLEM_TITLE,
            status: StatusCode::BAD_REQUEST.as_u16(),
            errors,
            trace_id: Uuid::now_v7().to_string(),
        }
    }
}

impl IntoResponse for ValidationProblem {
    fn into_response(self) -> axum::response::Response {
        let mut response = (StatusCode::BAD_REQUEST, axum::Json(self)).into_response();
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(PROBLEM_JSON));
        response
    }
}

pub fn validation_problem(errors: FieldErrors) -> axum::response::Response {
    ValidationProblem::new(errors).into_response()
}

/// 404 with an empty body.
pub fn not_found() -> axum::response::Response {
    StatusCode::NOT_FOUND.into_response()
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::NotFound => not_found(),
        DomainError::Validation(msg) => {
            validation_problem(FieldErrors::single("request", msg))
        }
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
    }
}

pub fn bind_error_to_response(err: BindError) -> axum::response::Response {
    match err {
        BindError::Unbound(_) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "binding_error",
            err.to_string(),
        ),
        BindError::Rejected { status, reason, .. } => (status, reason).into_response(),
        BindError::Missing(_) | BindError::Invalid { .. } => {
            json_error(StatusCode::BAD_REQUEST, "invalid_argument", err.to_string())
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
