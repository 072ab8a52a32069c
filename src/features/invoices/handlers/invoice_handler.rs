use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::session::SessionPayload;
use crate::features::invoices::dtos::{InvoiceStats, ProcessOutcome, ProcessingStatusReport};
use crate::features::invoices::models::Invoice;
use crate::features::invoices::services::{process_failure_message, InvoiceService};
use crate::shared::types::ApiResponse;

/// Trigger AI extraction for an uploaded file ("Process now")
#[utoipa::path(
    post,
    path = "/api/invoices/files/{file_id}/process",
    params(("file_id" = String, Path, description = "Uploaded file ID")),
    responses(
        (status = 200, description = "Processing triggered or already done", body = ApiResponse<ProcessOutcome>),
        (status = 400, description = "File cannot be processed"),
        (status = 401, description = "No session"),
        (status = 429, description = "Too many requests")
    ),
    tag = "invoices"
)]
pub async fn process_invoice(
    State(service): State<Arc<InvoiceService>>,
    session: SessionPayload,
    Path(file_id): Path<String>,
) -> Response {
    match service.process_invoice(&session, &file_id).await {
        Ok(outcome) => Json(ApiResponse::success(
            Some(outcome),
            Some(
                "Invoice processing completed successfully! The AI has extracted all data."
                    .to_string(),
            ),
            None,
        ))
        .into_response(),
        Err(e) => {
            tracing::error!("Processing of file {} failed: {}", file_id, e);
            let body = ApiResponse::<()>::error(Some(process_failure_message(&e)), None);
            (e.status_code(), Json(body)).into_response()
        }
    }
}

/// Current processing status of an uploaded file
#[utoipa::path(
    get,
    path = "/api/invoices/files/{file_id}/status",
    params(("file_id" = String, Path, description = "Uploaded file ID")),
    responses(
        (status = 200, description = "Status", body = ApiResponse<ProcessingStatusReport>),
        (status = 401, description = "No session"),
        (status = 502, description = "Status could not be read")
    ),
    tag = "invoices"
)]
pub async fn check_status(
    State(service): State<Arc<InvoiceService>>,
    session: SessionPayload,
    Path(file_id): Path<String>,
) -> Result<Json<ApiResponse<ProcessingStatusReport>>> {
    let report = service
        .check_processing_status(&session, &file_id)
        .await
        .map_err(|e| {
            tracing::error!("Error checking status of file {}: {}", file_id, e);
            AppError::ExternalServiceError("Failed to check processing status.".to_string())
        })?;

    let message = report.summary().to_string();
    Ok(Json(ApiResponse::success(Some(report), Some(message), None)))
}

/// Invoice details, including extra data
#[utoipa::path(
    get,
    path = "/api/invoices/{invoice_id}",
    params(("invoice_id" = String, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice", body = ApiResponse<Invoice>),
        (status = 401, description = "No session"),
        (status = 404, description = "Invoice not found"),
        (status = 429, description = "Too many requests and nothing cached")
    ),
    tag = "invoices"
)]
pub async fn get_invoice(
    State(service): State<Arc<InvoiceService>>,
    session: SessionPayload,
    Path(invoice_id): Path<String>,
) -> Result<Json<ApiResponse<Invoice>>> {
    let invoice = service.get_invoice(&session, &invoice_id).await?;
    Ok(Json(ApiResponse::success(Some(invoice), None, None)))
}

/// Invoice counts by processing status
#[utoipa::path(
    get,
    path = "/api/invoices/stats",
    responses(
        (status = 200, description = "Counts", body = ApiResponse<InvoiceStats>),
        (status = 401, description = "No session")
    ),
    tag = "invoices"
)]
pub async fn invoice_stats(
    State(service): State<Arc<InvoiceService>>,
    session: SessionPayload,
) -> Result<Json<ApiResponse<InvoiceStats>>> {
    let stats = service.invoice_stats(&session).await;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GatewayConfig;
    use crate::features::invoices::routes;
    use crate::shared::test_helpers::{backend_client, fast_gateway_config, with_session};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    // Every backend call is denied, so nothing leaves the process
    fn throttled_service() -> Arc<InvoiceService> {
        let config = GatewayConfig {
            rate_limit_per_minute: 0,
            ..fast_gateway_config()
        };
        Arc::new(InvoiceService::new(
            backend_client("http://127.0.0.1:9"),
            config,
        ))
    }

    #[tokio::test]
    async fn test_throttled_processing_gets_friendly_message() {
        let server = TestServer::new(with_session(routes(throttled_service()))).unwrap();

        let response = server.post("/api/invoices/files/42/process").await;
        response.assert_status(StatusCode::TOO_MANY_REQUESTS);
        let body: Value = response.json();
        assert_eq!(body["success"], json!(false));
        assert_eq!(
            body["message"],
            json!("Too many requests. Please wait a moment and try again.")
        );
    }

    #[tokio::test]
    async fn test_status_reports_throttling_as_waiting() {
        let server = TestServer::new(with_session(routes(throttled_service()))).unwrap();

        let response = server.get("/api/invoices/files/42/status").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["message"], json!("Waiting to start processing"));
        assert_eq!(body["data"]["fileId"], json!("42"));
        assert_eq!(body["data"]["status"], json!(-1));
    }

    #[tokio::test]
    async fn test_stats_without_data_are_zero() {
        let server = TestServer::new(with_session(routes(throttled_service()))).unwrap();

        let body: Value = server.get("/api/invoices/stats").await.json();
        assert_eq!(body["data"]["total"], json!(0));
        assert_eq!(body["data"]["failed"], json!(0));
    }

    #[tokio::test]
    async fn test_json_endpoints_require_session() {
        let server = TestServer::new(routes(throttled_service())).unwrap();

        let response = server.get("/api/invoices/stats").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["message"], json!("Not authenticated."));
    }
}
