use std::sync::Arc;

use axum::Router;

use crate::app::controllers::CustomersController;
use crate::app::services::AppServices;
use crate::mvc;

pub mod grouped;
pub mod minimal;
pub mod system;

/// Every surface style, each mounted under its own prefix and sharing one
/// filter pipeline.
pub fn router(services: &AppServices) -> Router {
    let pipeline = services.filter_pipeline();
    let controller = Arc::new(CustomersController::new(services.store.clone()));

    Router::new()
        .merge(minimal::router(pipeline.clone()))
        .merge(grouped::router(pipeline.clone()))
        .merge(mvc::map_controller(controller, &pipeline))
}
