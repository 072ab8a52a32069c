use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::features::cost_centers::models::CostCenter;
use crate::features::expense_types::models::ExpenseType;
use crate::features::invoices::models::{FileMetadata, Invoice, ProcessingStatus};
use crate::shared::types::{ActionState, PageUser};

/// File part of the upload form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Fields of the invoice upload form (multipart)
#[derive(Debug, Clone, Default)]
pub struct InvoiceUploadForm {
    pub file: Option<UploadedFile>,
    pub cost_center_id: Option<String>,
    pub expense_type_id: Option<String>,
    /// `process` asks to wait for the extracted invoice
    pub intent: Option<String>,
}

impl InvoiceUploadForm {
    pub fn waits_for_processing(&self) -> bool {
        self.intent.as_deref() == Some("process")
    }
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq)]
pub struct UploadOutcome {
    pub file_id: String,
    pub message: String,
    pub invoice: Option<Invoice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessOutcome {
    pub file_id: String,
    pub message: String,
    pub already_processed: bool,
    pub is_processing: bool,
    /// Backend reply (AI output or the file metadata)
    #[schema(value_type = Object)]
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingStatusReport {
    pub file_id: String,
    #[schema(value_type = Option<i32>)]
    pub status: Option<ProcessingStatus>,
    pub status_label: String,
    pub processed_at: Option<String>,
    pub error_message: Option<String>,
    pub is_completed: bool,
    pub is_failed: bool,
    pub is_processing: bool,
}

impl ProcessingStatusReport {
    pub fn from_metadata(file_id: &str, meta: &FileMetadata) -> Self {
        Self {
            file_id: file_id.to_string(),
            status: meta.status,
            status_label: meta.status.map_or("Pending", ProcessingStatus::label).to_string(),
            processed_at: meta.processed_at.clone(),
            error_message: meta.error_message.clone(),
            is_completed: meta.status == Some(ProcessingStatus::Completed),
            is_failed: meta.status == Some(ProcessingStatus::Failed),
            is_processing: meta.status == Some(ProcessingStatus::Processing),
        }
    }

    /// Placeholder returned when status checks are being throttled
    pub fn rate_limited(file_id: &str) -> Self {
        Self {
            file_id: file_id.to_string(),
            status: Some(ProcessingStatus::Skipped),
            status_label: ProcessingStatus::Skipped.label().to_string(),
            processed_at: None,
            error_message: Some("Rate limit exceeded".to_string()),
            is_completed: false,
            is_failed: false,
            is_processing: false,
        }
    }

    pub fn summary(&self) -> &'static str {
        if self.is_completed {
            "Processing completed!"
        } else if self.is_failed {
            "Processing failed"
        } else if self.is_processing {
            "Still processing..."
        } else {
            "Waiting to start processing"
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceStats {
    pub total: usize,
    pub processed: usize,
    pub processing: usize,
    pub pending: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl InvoiceStats {
    pub fn from_invoices(invoices: &[Invoice]) -> Self {
        let mut stats = InvoiceStats {
            total: invoices.len(),
            ..Default::default()
        };

        for invoice in invoices {
            if invoice.file.is_none() {
                stats.pending += 1;
                continue;
            }
            match invoice.status() {
                Some(ProcessingStatus::Completed) => stats.processed += 1,
                Some(ProcessingStatus::Processing) => stats.processing += 1,
                Some(ProcessingStatus::New) | Some(ProcessingStatus::NotSet) => stats.pending += 1,
                Some(ProcessingStatus::Failed) => stats.failed += 1,
                Some(ProcessingStatus::Skipped) => stats.skipped += 1,
                Some(ProcessingStatus::Unknown(_)) | None => {}
            }
        }

        stats
    }
}

#[derive(Debug, Serialize)]
pub struct InvoicesPage {
    pub user: PageUser,
    pub active_nav: &'static str,
    pub invoices: Vec<Invoice>,
    pub cost_centers: Vec<CostCenter>,
    pub expense_types: Vec<ExpenseType>,
    pub stats: InvoiceStats,
    pub action: Option<ActionState>,
}
