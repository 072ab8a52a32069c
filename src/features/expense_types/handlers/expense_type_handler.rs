use axum::{extract::State, Json};
use std::sync::Arc;

use crate::core::error::Result;
use crate::features::auth::session::SessionPayload;
use crate::features::expense_types::dtos::ExpenseTypeStats;
use crate::features::expense_types::services::ExpenseTypeService;
use crate::shared::types::ApiResponse;

/// Expense type counts for the signed-in client
#[utoipa::path(
    get,
    path = "/api/expense-types/stats",
    responses(
        (status = 200, description = "Counts", body = ApiResponse<ExpenseTypeStats>),
        (status = 401, description = "No session")
    ),
    tag = "expense-types"
)]
pub async fn expense_type_stats(
    State(service): State<Arc<ExpenseTypeService>>,
    session: SessionPayload,
) -> Result<Json<ApiResponse<ExpenseTypeStats>>> {
    let stats = service.stats(&session).await;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}
