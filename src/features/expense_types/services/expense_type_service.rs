use futures::future::join_all;
use reqwest::Method;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::auth::session::SessionPayload;
use crate::features::cost_centers::models::CostCenter;
use crate::features::cost_centers::CostCenterService;
use crate::features::expense_types::dtos::{ExpenseTypeForm, ExpenseTypeStats};
use crate::features::expense_types::models::ExpenseType;
use crate::modules::backend::{decode_list, BackendClient, BackendError, Envelope};

const REQUIRED_FIELDS: &str = "Name and Cost Center are required.";

fn collection_path(cost_center_id: &str) -> String {
    format!(
        "/api/v1/cost-centers/{}/expense-types",
        urlencoding::encode(cost_center_id)
    )
}

fn item_path(cost_center_id: &str, id: &str) -> String {
    format!("{}/{}", collection_path(cost_center_id), urlencoding::encode(id))
}

/// Turn a backend failure into the message for its status code, falling back
/// to the backend's `detail` and then to `fallback`.
fn map_failure(err: BackendError, by_status: &[(u16, &str)], fallback: &str) -> AppError {
    tracing::error!("{}", err);
    let status = err.status();

    if let Some((_, message)) = by_status.iter().find(|(code, _)| Some(*code) == status) {
        let message = message.to_string();
        return match status {
            Some(404) => AppError::NotFound(message),
            Some(403) => AppError::Forbidden(message),
            Some(409) => AppError::Conflict(message),
            _ => AppError::BadRequest(message),
        };
    }

    AppError::ExternalServiceError(
        err.body_field("detail")
            .unwrap_or_else(|| fallback.to_string()),
    )
}

/// Expense types of every cost center of the signed-in client
pub struct ExpenseTypeService {
    backend: Arc<BackendClient>,
    cost_centers: Arc<CostCenterService>,
}

impl ExpenseTypeService {
    pub fn new(backend: Arc<BackendClient>, cost_centers: Arc<CostCenterService>) -> Self {
        Self {
            backend,
            cost_centers,
        }
    }

    pub fn cost_centers(&self) -> &CostCenterService {
        &self.cost_centers
    }

    /// Types of all cost centers; centers whose call fails are skipped
    pub async fn list(&self, session: &SessionPayload) -> Result<Vec<ExpenseType>> {
        let centers = self.cost_centers.list(session).await.map_err(|e| {
            tracing::error!("Cannot list expense types: {}", e);
            AppError::ExternalServiceError("Failed to retrieve expense types".to_string())
        })?;

        Ok(self.list_for(session, &centers).await)
    }

    /// Types of the given cost centers, fetched concurrently
    pub async fn list_for(&self, session: &SessionPayload, centers: &[CostCenter]) -> Vec<ExpenseType> {
        let per_center = join_all(centers.iter().map(|center| self.for_center(session, center))).await;
        per_center.into_iter().flatten().collect()
    }

    async fn for_center(&self, session: &SessionPayload, center: &CostCenter) -> Vec<ExpenseType> {
        let path = format!("{}?query.ShowAll=true", collection_path(&center.id));
        let body = match self
            .backend
            .get(&path, &session.auth(), None, "fetch expense types")
            .await
        {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Skipping expense types of cost center {}: {}", center.id, e);
                return Vec::new();
            }
        };

        if !Envelope::parse(&body).succeeded() {
            tracing::warn!("Backend refused expense types of cost center {}", center.id);
            return Vec::new();
        }

        decode_list::<ExpenseType>(body)
            .into_iter()
            .filter(|et| !et.is_deleted())
            .map(|et| et.with_cost_center(center))
            .collect()
    }

    pub async fn create(&self, session: &SessionPayload, form: &ExpenseTypeForm) -> Result<String> {
        form.validate()
            .map_err(|_| AppError::Validation(REQUIRED_FIELDS.to_string()))?;

        let body = json!({ "name": form.name.trim(), "costCenterId": form.cost_center_id });
        self.backend
            .send_json(
                Method::POST,
                &collection_path(&form.cost_center_id),
                &session.auth(),
                &body,
                None,
                "create expense type",
            )
            .await
            .map_err(|e| {
                map_failure(
                    e,
                    &[
                        (400, "Invalid expense type data. Please check all fields."),
                        (409, "An expense type with this name already exists in this cost center."),
                    ],
                    "Failed to create expense type",
                )
            })?;

        Ok("Expense Type created successfully.".to_string())
    }

    pub async fn update(
        &self,
        session: &SessionPayload,
        expense_type_id: &str,
        form: &ExpenseTypeForm,
    ) -> Result<String> {
        form.validate()
            .map_err(|_| AppError::Validation(REQUIRED_FIELDS.to_string()))?;

        let body = json!({
            "id": expense_type_id,
            "name": form.name.trim(),
            "costCenterId": form.cost_center_id,
        });
        self.backend
            .send_json(
                Method::PUT,
                &item_path(&form.cost_center_id, expense_type_id),
                &session.auth(),
                &body,
                None,
                "update expense type",
            )
            .await
            .map_err(|e| {
                map_failure(
                    e,
                    &[
                        (404, "Expense type not found"),
                        (400, "Invalid expense type data"),
                        (409, "An expense type with this name already exists in this cost center."),
                    ],
                    "Failed to update expense type",
                )
            })?;

        Ok("Expense Type updated successfully.".to_string())
    }

    pub async fn delete(
        &self,
        session: &SessionPayload,
        cost_center_id: &str,
        expense_type_id: &str,
    ) -> Result<String> {
        self.backend
            .delete(
                &item_path(cost_center_id, expense_type_id),
                &session.auth(),
                None,
                "delete expense type",
            )
            .await
            .map_err(|e| {
                map_failure(
                    e,
                    &[
                        (400, "Cannot delete this expense type - it may be in use by other items."),
                        (404, "Expense type not found - it may have been already deleted."),
                        (403, "You don't have permission to delete this expense type."),
                    ],
                    "Failed to delete expense type",
                )
            })?;

        Ok("Expense Type deleted successfully.".to_string())
    }

    /// Counts over [`Self::list`]; zeros when it fails
    pub async fn stats(&self, session: &SessionPayload) -> ExpenseTypeStats {
        match self.list(session).await {
            Ok(types) => ExpenseTypeStats::from_types(&types),
            Err(e) => {
                tracing::warn!("Expense type stats unavailable: {}", e);
                ExpenseTypeStats::default()
            }
        }
    }
}
