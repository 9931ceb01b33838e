//! Customers as free handler functions mapped onto an endpoint group.

use std::sync::Arc;

use axum::{
    extract::{Extension, MatchedPath, Path, Query},
    http::{header, StatusCode},
    response::IntoResponse,
    Json, Router,
};

use twinapi_core::CustomerId;

use crate::app::dto::{self, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::binding::Parameter;
use crate::filter::FilterPipeline;
use crate::middleware::EndpointGroup;

pub const MOUNT: &str = "/minimal/customers";

/// Endpoint by endpoint: reads are mapped bare and only the writes carry the
/// filter pipeline.
pub fn router(pipeline: FilterPipeline) -> Router {
    EndpointGroup::new(MOUNT)
        .map_get("", list_customers, page_params())
        .map_get("/:id", get_customer, vec![id_param()])
        .map_delete("/:id", delete_customer, vec![id_param()])
        .with_filters(pipeline)
        .map_post("", create_customer, create_params())
        .map_put("/:id", update_customer, update_params())
        .into_router()
}

pub(crate) fn page_params() -> Vec<Parameter> {
    vec![
        Parameter::query::<i64>("page", DEFAULT_PAGE),
        Parameter::query::<i64>("pageSize", DEFAULT_PAGE_SIZE),
    ]
}

pub(crate) fn id_param() -> Parameter {
    Parameter::path::<CustomerId>("id")
}

pub(crate) fn create_params() -> Vec<Parameter> {
    vec![Parameter::json_body::<dto::CreateCustomerRequest>("request").validated()]
}

pub(crate) fn update_params() -> Vec<Parameter> {
    vec![
        id_param(),
        Parameter::json_body::<dto::UpdateCustomerRequest>("request").validated(),
    ]
}

pub async fn list_customers(
    Extension(services): Extension<Arc<AppServices>>,
    Query(page): Query<dto::PageQuery>,
) -> axum::response::Response {
    let customers = services.store.list(page.offset(), page.limit());
    (StatusCode::OK, Json(customers)).into_response()
}

pub async fn get_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<CustomerId>,
) -> axum::response::Response {
    match services.store.get(id) {
        Some(customer) => (StatusCode::OK, Json(customer)).into_response(),
        None => errors::not_found(),
    }
}

pub async fn create_customer(
    Extension(services): Extension<Arc<AppServices>>,
    route: MatchedPath,
    Json(body): Json<dto::CreateCustomerRequest>,
) -> axum::response::Response {
    let customer = services.store.insert(body.name);
    tracing::info!(customer_id = %customer.id, "customer created");

    (
        StatusCode::CREATED,
        [(header::LOCATION, format!("{}/{}", route.as_str(), customer.id))],
        Json(customer),
    )
        .into_response()
}

pub async fn update_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<CustomerId>,
    Json(body): Json<dto::UpdateCustomerRequest>,
) -> axum::response::Response {
    match services.store.update(id, body.name) {
        Ok(_) => {
            tracing::info!(customer_id = %id, "customer updated");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<CustomerId>,
) -> axum::response::Response {
    match services.store.delete(id) {
        Ok(_) => {
            tracing::info!(customer_id = %id, "customer deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}
