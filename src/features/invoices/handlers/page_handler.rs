use axum::{
    extract::{Multipart, State},
    response::Html,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::core::error::{AppError, Result};
use crate::features::auth::session::SessionPayload;
use crate::features::invoices::dtos::{
    InvoiceStats, InvoiceUploadForm, InvoicesPage, UploadedFile,
};
use crate::features::invoices::services::InvoiceService;
use crate::shared::templates::render_page;
use crate::shared::types::{ActionState, PageUser};

const INVOICES_DEADLINE: Duration = Duration::from_secs(10);
const COST_CENTERS_DEADLINE: Duration = Duration::from_secs(8);
const EXPENSE_TYPES_DEADLINE: Duration = Duration::from_secs(15);

/// Load invoices, cost centers and expense types side by side. A load that
/// misses its deadline renders as an empty list.
async fn render_invoices(
    service: &InvoiceService,
    session: &SessionPayload,
    action: Option<ActionState>,
) -> Result<Html<String>> {
    let (invoices, cost_centers, expense_types) = tokio::join!(
        timeout(INVOICES_DEADLINE, service.list_invoices(session)),
        timeout(COST_CENTERS_DEADLINE, service.cost_centers(session)),
        timeout(EXPENSE_TYPES_DEADLINE, service.expense_types(session)),
    );

    let invoices = invoices.unwrap_or_else(|_| {
        tracing::warn!("Loading invoices timed out");
        Vec::new()
    });
    let cost_centers = cost_centers.unwrap_or_else(|_| {
        tracing::warn!("Loading cost centers timed out");
        Vec::new()
    });
    let expense_types = expense_types.unwrap_or_else(|_| {
        tracing::warn!("Loading expense types timed out");
        Vec::new()
    });

    let page = InvoicesPage {
        user: PageUser::from(session),
        active_nav: "invoices",
        stats: InvoiceStats::from_invoices(&invoices),
        invoices,
        cost_centers,
        expense_types,
        action,
    };
    Ok(render_page("invoices.jinja", page)?)
}

pub async fn invoices_page(
    State(service): State<Arc<InvoiceService>>,
    session: SessionPayload,
) -> Result<Html<String>> {
    render_invoices(&service, &session, None).await
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<Option<String>> {
    let text = field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read form field: {}", e)))?;
    Ok(Some(text).filter(|t| !t.trim().is_empty()))
}

async fn read_upload_form(mut multipart: Multipart) -> Result<InvoiceUploadForm> {
    let mut form = InvoiceUploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let file_name = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unnamed".to_string());
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;

                // Browsers send an empty part when no file was picked
                if !bytes.is_empty() {
                    form.file = Some(UploadedFile {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            "costCenterId" => form.cost_center_id = read_text(field).await?,
            "expenseTypeId" => form.expense_type_id = read_text(field).await?,
            "intent" => form.intent = read_text(field).await?,
            _ => tracing::debug!("Ignoring unknown field: {}", field_name),
        }
    }

    Ok(form)
}

/// Upload form post; re-renders the invoices page with the outcome
pub async fn upload_invoice(
    State(service): State<Arc<InvoiceService>>,
    session: SessionPayload,
    multipart: Multipart,
) -> Result<Html<String>> {
    let action = match read_upload_form(multipart).await {
        Ok(form) => match service.create_invoice(&session, form).await {
            Ok(outcome) => ActionState::ok(outcome.message),
            Err(e) => {
                tracing::error!("Invoice upload failed: {}", e);
                ActionState::failed(e.user_message())
            }
        },
        Err(e) => ActionState::failed(e.user_message()),
    };

    render_invoices(&service, &session, Some(action)).await
}
