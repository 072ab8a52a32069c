use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::invoices::handlers;
use crate::features::invoices::services::InvoiceService;
use crate::shared::constants::MAX_INVOICE_FILE_SIZE;

pub fn routes(service: Arc<InvoiceService>) -> Router {
    Router::new()
        .route(
            "/invoices",
            get(handlers::invoices_page).post(handlers::upload_invoice).layer(
                // Room for multipart framing around the largest accepted file
                DefaultBodyLimit::max(MAX_INVOICE_FILE_SIZE + 1024 * 1024),
            ),
        )
        .route(
            "/api/invoices/files/{file_id}/process",
            post(handlers::process_invoice),
        )
        .route(
            "/api/invoices/files/{file_id}/status",
            get(handlers::check_status),
        )
        .route("/api/invoices/stats", get(handlers::invoice_stats))
        .route("/api/invoices/{invoice_id}", get(handlers::get_invoice))
        .with_state(service)
}
