use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::clients::handlers;
use crate::features::clients::services::ClientService;

pub fn routes(service: Arc<ClientService>) -> Router {
    Router::new()
        .route("/clients", get(handlers::clients_page))
        .route("/clients/{client_id}", get(handlers::client_detail_page))
        .with_state(service)
}
