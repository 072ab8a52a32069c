use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::demo_requests::handlers;
use crate::features::demo_requests::services::DemoRequestService;

/// Public landing page and its demo request form
pub fn routes(service: Arc<DemoRequestService>) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::landing_page).post(handlers::submit_demo_request),
        )
        .with_state(service)
}
