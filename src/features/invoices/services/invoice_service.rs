use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::core::config::GatewayConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::session::SessionPayload;
use crate::features::cost_centers::models::CostCenter;
use crate::features::expense_types::models::ExpenseType;
use crate::features::invoices::dtos::{
    InvoiceStats, InvoiceUploadForm, ProcessOutcome, ProcessingStatusReport, UploadOutcome,
    UploadedFile,
};
use crate::features::invoices::models::{FileMetadata, Invoice, ProcessingStatus};
use crate::modules::backend::{
    decode_list, decode_payload, BackendClient, BackendError, Envelope, RateLimiter, RequestCache,
};
use crate::shared::constants::{
    ALLOWED_INVOICE_MIME_TYPES, EXTRACTION_INSTRUCTION, MAX_INVOICE_FILE_SIZE,
};

// Rate limiter keys, one per backend operation
const UPLOAD_FILE: &str = "uploadFile";
const PROCESS_INVOICE: &str = "processInvoice";
const GET_INVOICES: &str = "getInvoices";
const GET_INVOICE: &str = "getInvoice";
const CHECK_STATUS: &str = "checkStatus";
const GET_COST_CENTERS: &str = "getCostCenters";
const GET_ALL_EXPENSE_TYPES: &str = "getAllExpenseTypes";

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(45);
const METADATA_TIMEOUT: Duration = Duration::from_secs(10);
const PROCESS_TIMEOUT: Duration = Duration::from_secs(60);
const INVOICES_TIMEOUT: Duration = Duration::from_secs(10);
const INVOICE_TIMEOUT: Duration = Duration::from_secs(8);
const COST_CENTERS_TIMEOUT: Duration = Duration::from_secs(8);
const EXPENSE_TYPES_TIMEOUT: Duration = Duration::from_secs(6);

const INVOICES_PATH: &str = "/api/Invoices?query.ShowAll=true";
const FILE_FAILED_PROCESSING: &str = "FILE_FAILED_PROCESSING";

const REQUIRED_FIELDS: &str = "Please fill in all required fields and select a file.";

fn invoices_key(client_id: &str) -> String {
    format!("invoices:{}", client_id)
}

fn invoice_key(client_id: &str, invoice_id: &str) -> String {
    format!("invoice:{}:{}", client_id, invoice_id)
}

fn cost_centers_key(client_id: &str) -> String {
    format!("costcenters:{}", client_id)
}

fn expense_types_key(client_id: &str) -> String {
    format!("expensetypes:{}", client_id)
}

fn metadata_path(file_id: &str) -> String {
    format!("/api/v1/files/{}/metadata", urlencoding::encode(file_id))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Identifier of an object payload, as a string
fn payload_id(body: Value) -> Option<String> {
    let payload: Value = decode_payload(body).ok()?;
    match payload.get("id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// User-facing message for a failed "Process now" request
pub fn process_failure_message(err: &AppError) -> String {
    match err {
        AppError::RateLimitExceeded(_) => {
            "Too many requests. Please wait a moment and try again.".to_string()
        }
        AppError::NotFound(_) => "Invoice not found. Please check if the invoice exists.".to_string(),
        AppError::ExternalServiceError(msg) if msg.contains("Status: 500") => {
            "Server error during processing. Please try again later.".to_string()
        }
        other => other.user_message(),
    }
}

/// Invoice gateway: uploads, processing, and cached reads of invoices,
/// cost centers and expense types.
///
/// Reads go through a per-client [`RequestCache`] and a process-wide
/// [`RateLimiter`]. List reads never fail: a denied or failed call falls back
/// to stale cached data, then to an empty list.
pub struct InvoiceService {
    backend: Arc<BackendClient>,
    config: GatewayConfig,
    limiter: RateLimiter,
    invoices: RequestCache<Vec<Invoice>>,
    invoice_details: RequestCache<Invoice>,
    cost_centers: RequestCache<Vec<CostCenter>>,
    expense_types: RequestCache<Vec<ExpenseType>>,
}

impl InvoiceService {
    pub fn new(backend: Arc<BackendClient>, config: GatewayConfig) -> Self {
        Self {
            backend,
            limiter: RateLimiter::new(config.rate_limit_per_minute, config.rate_limit_window),
            invoices: RequestCache::new(config.cache_ttl),
            invoice_details: RequestCache::new(config.cache_ttl),
            cost_centers: RequestCache::new(config.cache_ttl),
            expense_types: RequestCache::new(config.cache_ttl),
            config,
        }
    }

    // =========================================================================
    // UPLOAD & PROCESSING
    // =========================================================================

    /// Upload an invoice file for automated processing. Returns the file id.
    pub async fn upload_invoice_file(
        &self,
        session: &SessionPayload,
        file: UploadedFile,
        cost_center_id: Option<&str>,
        expense_type_id: Option<&str>,
    ) -> Result<String> {
        if !self.limiter.check(UPLOAD_FILE).await {
            return Err(AppError::RateLimitExceeded(
                "Rate limit exceeded - please wait before uploading again".to_string(),
            ));
        }

        if file.size() > MAX_INVOICE_FILE_SIZE {
            return Err(AppError::Validation(
                "File size must be less than 10MB".to_string(),
            ));
        }
        if !ALLOWED_INVOICE_MIME_TYPES.contains(&file.content_type.as_str()) {
            return Err(AppError::Validation("File type not supported".to_string()));
        }

        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)
            .map_err(|e| AppError::Validation(format!("Invalid file type: {}", e)))?;

        let mut form = Form::new()
            .part("File", part)
            .text("IsPublic", "true")
            .text("ProcessImmediately", "true");
        if let Some(id) = cost_center_id.filter(|id| !id.is_empty()) {
            form = form.text("CostCenterId", id.to_string());
        }
        if let Some(id) = expense_type_id.filter(|id| !id.is_empty()) {
            form = form.text("ExpenseTypeId", id.to_string());
        }

        let request = self
            .backend
            .authorized(Method::POST, "/api/v1/files/upload", &session.auth())
            .multipart(form);
        let body = self
            .backend
            .send(request, Some(UPLOAD_TIMEOUT), "upload file")
            .await?;

        let file_id = payload_id(body)
            .ok_or_else(|| AppError::ExternalServiceError("No file ID returned".to_string()))?;

        tracing::info!("Uploaded invoice file {}", file_id);
        self.invoices.invalidate(&invoices_key(&session.client_id)).await;

        Ok(file_id)
    }

    /// Manually trigger AI extraction for an uploaded file
    pub async fn process_invoice(
        &self,
        session: &SessionPayload,
        file_id: &str,
    ) -> Result<ProcessOutcome> {
        if file_id.is_empty() {
            return Err(AppError::Validation("File ID is required.".to_string()));
        }
        if !self.limiter.check(PROCESS_INVOICE).await {
            return Err(AppError::RateLimitExceeded(
                "Rate limit exceeded - please wait before processing again".to_string(),
            ));
        }

        self.trigger_processing(session, file_id)
            .await
            .map_err(|e| match e {
                ProcessError::Backend(err) => processing_failure(err),
                ProcessError::PreviouslyFailed(msg) => AppError::BadRequest(msg),
            })
    }

    async fn trigger_processing(
        &self,
        session: &SessionPayload,
        file_id: &str,
    ) -> std::result::Result<ProcessOutcome, ProcessError> {
        let auth = session.auth();
        let body = self
            .backend
            .get(&metadata_path(file_id), &auth, Some(METADATA_TIMEOUT), "check file status")
            .await?;
        let meta: FileMetadata = decode_payload(body.clone())
            .map_err(|e| BackendError::decode("check file status", e))?;

        tracing::debug!("File {} status before processing: {:?}", file_id, meta.status);

        match meta.status {
            Some(ProcessingStatus::Completed) => {
                return Ok(ProcessOutcome {
                    file_id: file_id.to_string(),
                    message: "File has already been processed successfully".to_string(),
                    already_processed: true,
                    is_processing: false,
                    data: body,
                });
            }
            Some(ProcessingStatus::Processing) => {
                return Ok(ProcessOutcome {
                    file_id: file_id.to_string(),
                    message: "File is currently being processed. Please wait for completion."
                        .to_string(),
                    already_processed: false,
                    is_processing: true,
                    data: body,
                });
            }
            Some(ProcessingStatus::Failed) => {
                return Err(ProcessError::PreviouslyFailed(format!(
                    "File processing previously failed: {}. Please upload a new copy of the file instead of trying to reprocess this one.",
                    meta.error_message.as_deref().unwrap_or("Unknown error")
                )));
            }
            _ => {}
        }

        let reply = self
            .backend
            .send_json(
                Method::POST,
                "/api/v1/AIProcessing/process-document",
                &auth,
                &json!({ "fileId": file_id, "instruction": EXTRACTION_INSTRUCTION }),
                Some(PROCESS_TIMEOUT),
                "trigger manual processing",
            )
            .await?;

        self.invoices.invalidate(&invoices_key(&session.client_id)).await;
        self.invoice_details.invalidate(&invoice_key(&session.client_id, file_id)).await;
        tracing::info!("Manual processing triggered for file {}", file_id);

        Ok(ProcessOutcome {
            file_id: file_id.to_string(),
            message: "Manual processing triggered successfully".to_string(),
            already_processed: false,
            is_processing: false,
            data: reply,
        })
    }

    pub async fn check_processing_status(
        &self,
        session: &SessionPayload,
        file_id: &str,
    ) -> Result<ProcessingStatusReport> {
        if file_id.is_empty() {
            return Err(AppError::Validation("File ID is required.".to_string()));
        }
        if !self.limiter.check(CHECK_STATUS).await {
            tracing::warn!("Rate limit hit for status check of file {}", file_id);
            return Ok(ProcessingStatusReport::rate_limited(file_id));
        }

        let body = self
            .backend
            .get(
                &metadata_path(file_id),
                &session.auth(),
                Some(METADATA_TIMEOUT),
                "check processing status",
            )
            .await?;
        let meta: FileMetadata = decode_payload(body)
            .map_err(|e| BackendError::decode("check processing status", e))?;

        Ok(ProcessingStatusReport::from_metadata(file_id, &meta))
    }

    /// Upload form action: validate, upload, and optionally wait for the
    /// backend to create the invoice.
    pub async fn create_invoice(
        &self,
        session: &SessionPayload,
        form: InvoiceUploadForm,
    ) -> Result<UploadOutcome> {
        let waits = form.waits_for_processing();
        let (file, cost_center_id, expense_type_id) = match (
            form.file,
            non_empty(form.cost_center_id),
            non_empty(form.expense_type_id),
        ) {
            (Some(file), Some(cc), Some(et)) if file.size() > 0 => (file, cc, et),
            _ => return Err(AppError::Validation(REQUIRED_FIELDS.to_string())),
        };

        let file_name = file.file_name.clone();
        let file_id = self
            .upload_invoice_file(session, file, Some(&cost_center_id), Some(&expense_type_id))
            .await?;

        if !waits {
            return Ok(UploadOutcome {
                message: format!(
                    "Invoice \"{}\" uploaded successfully! Automated processing will create the invoice.",
                    file_name
                ),
                file_id,
                invoice: None,
            });
        }

        match self.wait_for_invoice(session, &file_id).await {
            Some(invoice) => Ok(UploadOutcome {
                message: format!(
                    "Invoice \"{}\" uploaded successfully! Automated processing created invoice with ID: {}",
                    file_name, invoice.id
                ),
                file_id,
                invoice: Some(invoice),
            }),
            None => Ok(UploadOutcome {
                message: format!(
                    "Invoice \"{}\" uploaded successfully! Automated processing is happening in the background.",
                    file_name
                ),
                file_id,
                invoice: None,
            }),
        }
    }

    async fn wait_for_invoice(&self, session: &SessionPayload, file_id: &str) -> Option<Invoice> {
        tokio::time::sleep(self.config.invoice_poll_initial_delay).await;

        let key = invoices_key(&session.client_id);
        let max_attempts = self.config.invoice_poll_max_attempts;
        for attempt in 1..=max_attempts {
            let invoices = self.fetch_invoices(session, &key).await;
            if let Some(invoice) = invoices.into_iter().find(|i| i.has_file_id(file_id)) {
                tracing::info!("Invoice {} created for file {}", invoice.id, file_id);
                return Some(invoice);
            }

            tracing::debug!(
                "Waiting for invoice of file {} ({}/{})",
                file_id,
                attempt,
                max_attempts
            );
            if attempt < max_attempts {
                tokio::time::sleep(self.config.invoice_poll_interval).await;
            }
        }

        None
    }

    // =========================================================================
    // READS
    // =========================================================================

    pub async fn list_invoices(&self, session: &SessionPayload) -> Vec<Invoice> {
        let key = invoices_key(&session.client_id);
        if let Some(hit) = self.invoices.get(&key).await {
            return hit;
        }
        self.fetch_invoices(session, &key).await
    }

    /// Skips the fresh-cache read but still honours the rate limit
    async fn fetch_invoices(&self, session: &SessionPayload, key: &str) -> Vec<Invoice> {
        if !self.limiter.check(GET_INVOICES).await {
            tracing::warn!("Rate limit hit for getInvoices, serving cached data");
            return self.invoices.get_stale(key).await.unwrap_or_default();
        }

        match self
            .backend
            .get(INVOICES_PATH, &session.auth(), Some(INVOICES_TIMEOUT), "fetch invoices")
            .await
        {
            Ok(body) => {
                let invoices: Vec<Invoice> = decode_list(body);
                self.invoices.insert(key, invoices.clone()).await;
                invoices
            }
            Err(e) => {
                tracing::error!("Error loading invoices: {}", e);
                self.invoices.get_stale(key).await.unwrap_or_default()
            }
        }
    }

    pub async fn get_invoice(&self, session: &SessionPayload, invoice_id: &str) -> Result<Invoice> {
        if invoice_id.is_empty() {
            return Err(AppError::Validation("Invoice ID is required.".to_string()));
        }

        let key = invoice_key(&session.client_id, invoice_id);
        if let Some(hit) = self.invoice_details.get(&key).await {
            return Ok(hit);
        }

        if !self.limiter.check(GET_INVOICE).await {
            tracing::warn!("Rate limit hit for getInvoice({})", invoice_id);
            return self.invoice_details.get_stale(&key).await.ok_or_else(|| {
                AppError::RateLimitExceeded(
                    "Rate limit exceeded and no cached data available".to_string(),
                )
            });
        }

        let path = format!("/api/Invoices/{}", urlencoding::encode(invoice_id));
        let fetched = match self
            .backend
            .get(&path, &session.auth(), Some(INVOICE_TIMEOUT), "fetch invoice details")
            .await
        {
            Ok(body) => decode_payload::<Invoice>(body)
                .map_err(|e| BackendError::decode("fetch invoice details", e)),
            Err(e) => Err(e),
        };

        match fetched {
            Ok(invoice) => {
                self.invoice_details.insert(key, invoice.clone()).await;
                Ok(invoice)
            }
            Err(e) => match self.invoice_details.get_stale(&key).await {
                Some(stale) => {
                    tracing::warn!("Serving cached invoice {} after error: {}", invoice_id, e);
                    Ok(stale)
                }
                None => Err(e.into()),
            },
        }
    }

    /// Active, not deleted cost centers of the signed-in client
    pub async fn cost_centers(&self, session: &SessionPayload) -> Vec<CostCenter> {
        let key = cost_centers_key(&session.client_id);
        if let Some(hit) = self.cost_centers.get(&key).await {
            return hit;
        }

        if !self.limiter.check(GET_COST_CENTERS).await {
            tracing::warn!("Rate limit hit for getCostCenters, serving cached data");
            return self.cost_centers.get_stale(&key).await.unwrap_or_default();
        }

        let path = format!(
            "/api/v1/clients/{}/CostCenters?query.ShowAll=true",
            urlencoding::encode(&session.client_id)
        );
        match self
            .backend
            .get(&path, &session.auth(), Some(COST_CENTERS_TIMEOUT), "fetch cost centers")
            .await
        {
            Ok(body) => {
                let centers: Vec<CostCenter> = decode_list::<CostCenter>(body)
                    .into_iter()
                    .filter(|c| !c.is_deleted && c.is_active)
                    .collect();
                self.cost_centers.insert(key, centers.clone()).await;
                centers
            }
            Err(e) => {
                tracing::error!("Error loading cost centers: {}", e);
                self.cost_centers.get_stale(&key).await.unwrap_or_default()
            }
        }
    }

    /// Expense types across the first few cost centers of the client,
    /// fetched one center at a time
    pub async fn expense_types(&self, session: &SessionPayload) -> Vec<ExpenseType> {
        let key = expense_types_key(&session.client_id);
        if let Some(hit) = self.expense_types.get(&key).await {
            return hit;
        }

        if !self.limiter.check(GET_ALL_EXPENSE_TYPES).await {
            tracing::warn!("Rate limit hit for getAllExpenseTypes, serving cached data");
            return self.expense_types.get_stale(&key).await.unwrap_or_default();
        }

        let centers = self.cost_centers(session).await;
        let centers = &centers[..centers.len().min(self.config.expense_type_cost_center_limit)];
        let auth = session.auth();
        let mut all = Vec::new();

        for (i, center) in centers.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.config.expense_type_fetch_delay).await;
            }

            let path = format!(
                "/api/v1/cost-centers/{}/expense-types?query.ShowAll=true",
                urlencoding::encode(&center.id)
            );
            let body = match self
                .backend
                .get(&path, &auth, Some(EXPENSE_TYPES_TIMEOUT), "fetch expense types")
                .await
            {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!("Skipping expense types of cost center {}: {}", center.id, e);
                    continue;
                }
            };
            if !Envelope::parse(&body).not_failed() {
                tracing::warn!("Backend refused expense types of cost center {}", center.id);
                continue;
            }

            all.extend(
                decode_list::<ExpenseType>(body)
                    .into_iter()
                    .filter(|et| !et.is_deleted())
                    .map(|et| et.with_cost_center(center)),
            );
        }

        self.expense_types.insert(key, all.clone()).await;
        all
    }

    pub async fn invoice_stats(&self, session: &SessionPayload) -> InvoiceStats {
        InvoiceStats::from_invoices(&self.list_invoices(session).await)
    }
}

enum ProcessError {
    Backend(BackendError),
    PreviouslyFailed(String),
}

impl From<BackendError> for ProcessError {
    fn from(err: BackendError) -> Self {
        ProcessError::Backend(err)
    }
}

/// 400 replies to a processing request get dedicated messages
fn processing_failure(err: BackendError) -> AppError {
    if err.status() != Some(400) {
        return err.into();
    }

    let failed_before = match err.body() {
        Some(Value::String(text)) => text.contains(FILE_FAILED_PROCESSING),
        Some(body) => body.to_string().contains(FILE_FAILED_PROCESSING),
        None => false,
    };
    if failed_before {
        return AppError::BadRequest(
            "This file has failed processing and cannot be reprocessed. Please upload a new copy of the file instead."
                .to_string(),
        );
    }

    match err.body_field("message") {
        Some(message) => AppError::BadRequest(format!("Processing failed: {}", message)),
        None => AppError::BadRequest(
            "File cannot be processed. This may be because the file has already failed processing or is in an invalid state. Please try uploading a new copy of the file."
                .to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{
        backend_client, fast_gateway_config, spawn_backend, test_session,
    };
    use axum::{
        extract::Path,
        http::StatusCode,
        response::{IntoResponse, Response},
        routing::{get, post},
        Json, Router,
    };
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct Stub {
        url: String,
        invoice_hits: Arc<AtomicUsize>,
        failing: Arc<AtomicBool>,
    }

    async fn stub() -> Stub {
        let invoice_hits = Arc::new(AtomicUsize::new(0));
        let failing = Arc::new(AtomicBool::new(false));
        let hits = invoice_hits.clone();
        let fail = failing.clone();

        let router = Router::new()
            .route(
                "/api/Invoices",
                get(move || {
                    let hits = hits.clone();
                    let fail = fail.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        if fail.load(Ordering::SeqCst) {
                            return (StatusCode::INTERNAL_SERVER_ERROR, "down").into_response();
                        }
                        Json(json!({"isSuccess": true, "data": [
                            {"id": 1, "fileId": "99", "companyName": "Acme", "file": {"id": 99, "status": 3}},
                            null,
                            {"id": 2, "company_name": "Globex"}
                        ]}))
                        .into_response()
                    }
                }),
            )
            .route(
                "/api/Invoices/{id}",
                get(|Path(id): Path<String>| async move {
                    if id == "404" {
                        return (StatusCode::NOT_FOUND, Json(json!({"message": "missing"})))
                            .into_response();
                    }
                    Json(json!({"data": {"id": id, "invoiceNo": "INV-7"}})).into_response()
                }),
            )
            .route(
                "/api/v1/files/{id}/metadata",
                get(|Path(id): Path<String>| async move {
                    let status = match id.as_str() {
                        "done" => 3,
                        "busy" => 1,
                        "broken" => 2,
                        "gone" => {
                            return (StatusCode::NOT_FOUND, "no such file").into_response();
                        }
                        _ => 0,
                    };
                    Json(json!({"id": id, "status": status, "errorMessage": "bad scan"}))
                        .into_response()
                }),
            )
            .route(
                "/api/v1/AIProcessing/process-document",
                post(|Json(body): Json<Value>| async move {
                    match body["fileId"].as_str() {
                        Some("stuck") => {
                            (StatusCode::BAD_REQUEST, "FILE_FAILED_PROCESSING").into_response()
                        }
                        Some("odd") => (
                            StatusCode::BAD_REQUEST,
                            Json(json!({"message": "unsupported layout"})),
                        )
                            .into_response(),
                        _ => Json(json!({"result": "extracted"})).into_response(),
                    }
                }),
            )
            .route(
                "/api/v1/files/upload",
                post(|| async { Json(json!({"isSuccess": true, "data": {"id": 99}})) }),
            )
            .route(
                "/api/v1/clients/{cid}/CostCenters",
                get(|| async {
                    Json(json!({"isSuccess": true, "data": [
                        {"id": 1, "name": "Ops", "isActive": true, "isDeleted": false},
                        {"id": 2, "name": "Sales", "isActive": true},
                        {"id": 3, "name": "Legal", "isActive": true},
                        {"id": 4, "name": "Old", "isActive": true, "isDeleted": true},
                        {"id": 5, "name": "Paused", "isActive": false}
                    ]}))
                }),
            )
            .route(
                "/api/v1/cost-centers/{id}/expense-types",
                get(|Path(id): Path<String>| async move {
                    let body: Response = match id.as_str() {
                        "1" => Json(json!({"isSuccess": true, "data": [
                            {"id": 10, "name": "Travel", "costCenterId": 1},
                            {"id": 11, "name": "Retired", "costCenterId": 1, "isDeleted": true}
                        ]}))
                        .into_response(),
                        "2" => Json(json!({"isSuccess": false, "messages": ["nope"]})).into_response(),
                        _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
                    };
                    body
                }),
            );

        Stub {
            url: spawn_backend(router).await,
            invoice_hits,
            failing,
        }
    }

    fn service(url: &str, config: GatewayConfig) -> InvoiceService {
        InvoiceService::new(backend_client(url), config)
    }

    fn pdf(name: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: "application/pdf".to_string(),
            bytes: b"%PDF-1.4".to_vec(),
        }
    }

    #[tokio::test]
    async fn test_list_invoices_is_cached_and_skips_nulls() {
        let stub = stub().await;
        let service = service(&stub.url, fast_gateway_config());
        let session = test_session();

        let first = service.list_invoices(&session).await;
        let second = service.list_invoices(&session).await;

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
        assert_eq!(first[1].company_name.as_deref(), Some("Globex"));
        assert_eq!(stub.invoice_hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_list_invoices_falls_back_to_stale_data_on_error() {
        let stub = stub().await;
        let config = GatewayConfig {
            cache_ttl: Duration::ZERO,
            ..fast_gateway_config()
        };
        let service = service(&stub.url, config);
        let session = test_session();

        assert_eq!(service.list_invoices(&session).await.len(), 2);
        stub.failing.store(true, Ordering::SeqCst);
        assert_eq!(service.list_invoices(&session).await.len(), 2);
        assert_eq!(stub.invoice_hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_denied_reads_use_cache_or_nothing() {
        let stub = stub().await;
        let config = GatewayConfig {
            rate_limit_per_minute: 0,
            ..fast_gateway_config()
        };
        let service = service(&stub.url, config);
        let session = test_session();

        assert!(service.list_invoices(&session).await.is_empty());
        assert!(service.cost_centers(&session).await.is_empty());
        assert!(service.expense_types(&session).await.is_empty());
        let err = service.get_invoice(&session, "7").await.unwrap_err();
        assert!(matches!(err, AppError::RateLimitExceeded(_)));
        assert_eq!(stub.invoice_hits.load(Ordering::SeqCst), 0);

        let status = service.check_processing_status(&session, "done").await.unwrap();
        assert_eq!(status.error_message.as_deref(), Some("Rate limit exceeded"));
        assert!(!status.is_completed);
    }

    #[tokio::test]
    async fn test_get_invoice_decodes_envelope_and_maps_not_found() {
        let stub = stub().await;
        let service = service(&stub.url, fast_gateway_config());
        let session = test_session();

        let invoice = service.get_invoice(&session, "7").await.unwrap();
        assert_eq!(invoice.invoice_no.as_deref(), Some("INV-7"));

        let err = service.get_invoice(&session, "404").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_process_respects_current_file_status() {
        let stub = stub().await;
        let service = service(&stub.url, fast_gateway_config());
        let session = test_session();

        let done = service.process_invoice(&session, "done").await.unwrap();
        assert!(done.already_processed);
        assert_eq!(done.message, "File has already been processed successfully");

        let busy = service.process_invoice(&session, "busy").await.unwrap();
        assert!(busy.is_processing);

        let fresh = service.process_invoice(&session, "fresh").await.unwrap();
        assert_eq!(fresh.message, "Manual processing triggered successfully");
        assert_eq!(fresh.data["result"], json!("extracted"));
    }

    #[tokio::test]
    async fn test_process_failures_get_dedicated_messages() {
        let stub = stub().await;
        let service = service(&stub.url, fast_gateway_config());
        let session = test_session();

        let err = service.process_invoice(&session, "broken").await.unwrap_err();
        assert!(err
            .user_message()
            .starts_with("File processing previously failed: bad scan."));

        let err = service.process_invoice(&session, "stuck").await.unwrap_err();
        assert_eq!(
            err.user_message(),
            "This file has failed processing and cannot be reprocessed. Please upload a new copy of the file instead."
        );

        let err = service.process_invoice(&session, "odd").await.unwrap_err();
        assert_eq!(err.user_message(), "Processing failed: unsupported layout");

        let err = service.process_invoice(&session, "gone").await.unwrap_err();
        assert_eq!(
            process_failure_message(&err),
            "Invoice not found. Please check if the invoice exists."
        );
    }

    #[test]
    fn test_process_failure_message_mapping() {
        assert_eq!(
            process_failure_message(&AppError::RateLimitExceeded("x".to_string())),
            "Too many requests. Please wait a moment and try again."
        );
        assert_eq!(
            process_failure_message(&AppError::ExternalServiceError(
                "Operation failed: trigger manual processing. Status: 500. Details: boom"
                    .to_string()
            )),
            "Server error during processing. Please try again later."
        );
        assert_eq!(
            process_failure_message(&AppError::BadRequest("Processing failed: x".to_string())),
            "Processing failed: x"
        );
    }

    #[tokio::test]
    async fn test_cost_centers_keep_only_active_and_not_deleted() {
        let stub = stub().await;
        let service = service(&stub.url, fast_gateway_config());

        let centers = service.cost_centers(&test_session()).await;
        let names: Vec<_> = centers.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Ops", "Sales", "Legal"]);
    }

    #[tokio::test]
    async fn test_expense_types_skip_failing_centers_and_annotate() {
        let stub = stub().await;
        let service = service(&stub.url, fast_gateway_config());

        let types = service.expense_types(&test_session()).await;
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].name, "Travel");
        let center = types[0].cost_center.as_ref().unwrap();
        assert_eq!((center.id.as_str(), center.name.as_str()), ("1", "Ops"));
    }

    #[tokio::test]
    async fn test_upload_validates_file_before_calling_backend() {
        let stub = stub().await;
        let service = service(&stub.url, fast_gateway_config());
        let session = test_session();

        let text = UploadedFile {
            content_type: "text/plain".to_string(),
            ..pdf("notes.txt")
        };
        let err = service
            .upload_invoice_file(&session, text, None, None)
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "File type not supported");

        let huge = UploadedFile {
            bytes: vec![0; MAX_INVOICE_FILE_SIZE + 1],
            ..pdf("huge.pdf")
        };
        let err = service
            .upload_invoice_file(&session, huge, None, None)
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "File size must be less than 10MB");

        let id = service
            .upload_invoice_file(&session, pdf("ok.pdf"), Some("1"), Some("10"))
            .await
            .unwrap();
        assert_eq!(id, "99");
    }

    #[tokio::test]
    async fn test_create_invoice_requires_all_fields() {
        let stub = stub().await;
        let service = service(&stub.url, fast_gateway_config());

        let form = InvoiceUploadForm {
            file: Some(pdf("a.pdf")),
            cost_center_id: Some("1".to_string()),
            ..Default::default()
        };
        let err = service.create_invoice(&test_session(), form).await.unwrap_err();
        assert_eq!(err.user_message(), REQUIRED_FIELDS);
    }

    #[tokio::test]
    async fn test_create_invoice_with_process_intent_finds_created_invoice() {
        let stub = stub().await;
        let service = service(&stub.url, fast_gateway_config());

        let form = InvoiceUploadForm {
            file: Some(pdf("march.pdf")),
            cost_center_id: Some("1".to_string()),
            expense_type_id: Some("10".to_string()),
            intent: Some("process".to_string()),
        };
        let outcome = service.create_invoice(&test_session(), form).await.unwrap();

        assert_eq!(outcome.file_id, "99");
        assert_eq!(outcome.invoice.map(|i| i.id), Some("1".to_string()));
        assert_eq!(
            outcome.message,
            "Invoice \"march.pdf\" uploaded successfully! Automated processing created invoice with ID: 1"
        );
    }

    #[tokio::test]
    async fn test_stats_count_cached_invoices() {
        let stub = stub().await;
        let service = service(&stub.url, fast_gateway_config());

        let stats = service.invoice_stats(&test_session()).await;
        assert_eq!(stats.total, 2);
        assert_eq!(stats.processed, 1);
        assert_eq!(stats.pending, 1);
    }

    #[tokio::test]
    async fn test_cached_invoice_is_not_shared_across_clients() {
        let router = Router::new().route(
            "/api/Invoices/{id}",
            get(|headers: axum::http::HeaderMap| async move {
                let key = headers.get("x-api-key").and_then(|v| v.to_str().ok());
                if key != Some("client-key") {
                    return (StatusCode::FORBIDDEN, Json(json!({"message": "not yours"})))
                        .into_response();
                }
                Json(json!({"data": {"id": 7, "invoiceNo": "SECRET-A"}})).into_response()
            }),
        );
        let url = spawn_backend(router).await;
        let service = service(&url, fast_gateway_config());

        let owner = test_session();
        let stranger = SessionPayload {
            client_id: "other".to_string(),
            client_key: "other-key".to_string(),
            ..test_session()
        };

        let seen = service.get_invoice(&owner, "7").await.unwrap();
        assert_eq!(seen.invoice_no.as_deref(), Some("SECRET-A"));

        let err = service.get_invoice(&stranger, "7").await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_get_invoice_serves_stale_copy_after_backend_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let router = Router::new().route(
            "/api/Invoices/{id}",
            get(move |Path(id): Path<String>| {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) > 0 {
                        return (StatusCode::INTERNAL_SERVER_ERROR, "down").into_response();
                    }
                    Json(json!({"data": {"id": id, "invoiceNo": "INV-7"}})).into_response()
                }
            }),
        );
        let url = spawn_backend(router).await;
        let config = GatewayConfig {
            cache_ttl: Duration::ZERO,
            ..fast_gateway_config()
        };
        let service = service(&url, config);
        let session = test_session();

        let first = service.get_invoice(&session, "7").await.unwrap();
        let stale = service.get_invoice(&session, "7").await.unwrap();
        assert_eq!(first, stale);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let err = service.get_invoice(&session, "8").await.unwrap_err();
        assert!(matches!(err, AppError::ExternalServiceError(_)));
    }
}
