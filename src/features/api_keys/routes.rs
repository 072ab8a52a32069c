use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::api_keys::handlers;
use crate::features::api_keys::services::ApiKeyService;

pub fn routes(service: Arc<ApiKeyService>) -> Router {
    Router::new()
        .route(
            "/api-keys",
            get(handlers::api_keys_page).post(handlers::create_api_key),
        )
        .route("/api-keys/{id}/toggle", post(handlers::toggle_api_key))
        .route("/api-keys/{id}/delete", post(handlers::delete_api_key))
        .route("/api/api-keys/stats", get(handlers::api_key_stats))
        .with_state(service)
}
