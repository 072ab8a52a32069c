use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::dashboard::handlers;
use crate::features::dashboard::services::DashboardService;

pub fn routes(dashboard_service: Arc<DashboardService>) -> Router {
    Router::new()
        .route("/dashboard", get(handlers::dashboard_page))
        .route(
            "/api/dashboard/cost-center-chart",
            get(handlers::cost_center_chart),
        )
        .with_state(dashboard_service)
}
