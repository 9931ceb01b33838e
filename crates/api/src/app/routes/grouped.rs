//! The endpoint-style handlers again, with the filter pipeline attached to
//! the whole group instead of endpoint by endpoint.

use axum::Router;

use crate::filter::FilterPipeline;
use crate::middleware::EndpointGroup;

use super::minimal::{
    create_customer, create_params, delete_customer, get_customer, id_param, list_customers,
    page_params, update_customer, update_params,
};

pub const MOUNT: &str = "/minimalgroup/customers";

pub fn router(pipeline: FilterPipeline) -> Router {
    EndpointGroup::new(MOUNT)
        .with_filters(pipeline)
        .map_get("", list_customers, page_params())
        .map_get("/:id", get_customer, vec![id_param()])
        .map_post("", create_customer, create_params())
        .map_put("/:id", update_customer, update_params())
        .map_delete("/:id", delete_customer, vec![id_param()])
        .into_router()
}
