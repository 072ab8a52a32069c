use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::projects::handlers;
use crate::features::projects::services::ProjectService;

pub fn routes(service: Arc<ProjectService>) -> Router {
    Router::new()
        .route(
            "/project-management",
            get(handlers::projects_page).post(handlers::create_project),
        )
        .route("/project-management/{id}", post(handlers::update_project))
        .route(
            "/project-management/{id}/delete",
            post(handlers::delete_project),
        )
        .with_state(service)
}
