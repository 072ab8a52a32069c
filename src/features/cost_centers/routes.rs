use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::cost_centers::handlers;
use crate::features::cost_centers::services::CostCenterService;

pub fn routes(service: Arc<CostCenterService>) -> Router {
    Router::new()
        .route(
            "/cost-center",
            get(handlers::cost_centers_page).post(handlers::create_cost_center),
        )
        .route("/cost-center/{id}", post(handlers::update_cost_center))
        .route("/cost-center/{id}/delete", post(handlers::delete_cost_center))
        .with_state(service)
}
