use reqwest::Method;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::auth::session::SessionPayload;
use crate::features::cost_centers::dtos::{CostCenterForm, CostCenterStats};
use crate::features::cost_centers::models::CostCenter;
use crate::modules::backend::{decode_list, BackendClient};
use crate::shared::types::ChartDatum;

/// Cost center management for the signed-in client
pub struct CostCenterService {
    backend: Arc<BackendClient>,
}

fn collection_path(client_id: &str) -> String {
    format!("/api/v1/clients/{}/CostCenters", urlencoding::encode(client_id))
}

fn item_path(client_id: &str, id: &str) -> String {
    format!("{}/{}", collection_path(client_id), urlencoding::encode(id))
}

fn validated(form: &CostCenterForm) -> Result<()> {
    form.validate().map_err(|_| {
        AppError::Validation("Cost center name is required.".to_string())
    })
}

impl CostCenterService {
    pub fn new(backend: Arc<BackendClient>) -> Self {
        Self { backend }
    }

    /// Not deleted cost centers, active or not
    pub async fn list(&self, session: &SessionPayload) -> Result<Vec<CostCenter>> {
        let path = format!("{}?query.ShowAll=true", collection_path(&session.client_id));
        let body = self
            .backend
            .get(&path, &session.auth(), None, "fetch cost centers")
            .await
            .map_err(|e| {
                tracing::error!("{}", e);
                AppError::ExternalServiceError("Failed to retrieve cost centers.".to_string())
            })?;

        Ok(decode_list::<CostCenter>(body)
            .into_iter()
            .filter(|c| !c.is_deleted)
            .collect())
    }

    pub async fn create(&self, session: &SessionPayload, form: &CostCenterForm) -> Result<String> {
        validated(form)?;
        let body = json!({ "name": form.name.trim(), "isActive": form.is_active() });

        self.backend
            .send_json(
                Method::POST,
                &collection_path(&session.client_id),
                &session.auth(),
                &body,
                None,
                "create cost center",
            )
            .await
            .map_err(|e| {
                tracing::error!("{}", e);
                AppError::ExternalServiceError("Failed to create cost center.".to_string())
            })?;

        Ok("Cost center created successfully.".to_string())
    }

    pub async fn update(
        &self,
        session: &SessionPayload,
        cost_center_id: &str,
        form: &CostCenterForm,
    ) -> Result<String> {
        validated(form)?;
        let body = json!({
            "id": cost_center_id,
            "name": form.name.trim(),
            "isActive": form.is_active(),
        });

        self.backend
            .send_json(
                Method::PUT,
                &item_path(&session.client_id, cost_center_id),
                &session.auth(),
                &body,
                None,
                "update cost center",
            )
            .await
            .map_err(|e| {
                tracing::error!("{}", e);
                AppError::ExternalServiceError("Failed to update cost center.".to_string())
            })?;

        Ok("Cost center updated successfully.".to_string())
    }

    pub async fn delete(&self, session: &SessionPayload, cost_center_id: &str) -> Result<String> {
        self.backend
            .delete(
                &item_path(&session.client_id, cost_center_id),
                &session.auth(),
                None,
                "delete cost center",
            )
            .await
            .map_err(|e| {
                tracing::error!("{}", e);
                AppError::ExternalServiceError("Failed to delete cost center.".to_string())
            })?;

        Ok("Cost center deleted successfully.".to_string())
    }

    /// Active vs inactive counts; empty when the list cannot be loaded
    pub async fn chart_data(&self, session: &SessionPayload) -> Vec<ChartDatum> {
        match self.list(session).await {
            Ok(centers) => CostCenterStats::from_centers(&centers).chart(),
            Err(e) => {
                tracing::warn!("Cost center chart unavailable: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{backend_client, spawn_backend, test_session};
    use axum::{
        http::StatusCode,
        routing::{get, put},
        Json, Router,
    };
    use serde_json::Value;
    use std::sync::Mutex;

    async fn stub(received: Arc<Mutex<Vec<Value>>>) -> String {
        let on_post = received.clone();
        spawn_backend(
            Router::new()
                .route(
                    "/api/v1/clients/2/CostCenters",
                    get(|| async {
                        Json(json!({"isSuccess": true, "data": [
                            {"id": 1, "name": "Ops", "isActive": true},
                            {"id": 2, "name": "Paused", "isActive": false},
                            {"id": 3, "name": "Gone", "isActive": true, "isDeleted": true}
                        ]}))
                    })
                    .post(move |Json(body): Json<Value>| {
                        let on_post = on_post.clone();
                        async move {
                            on_post.lock().unwrap().push(body);
                            Json(json!({"id": 4}))
                        }
                    }),
                )
                .route(
                    "/api/v1/clients/2/CostCenters/{id}",
                    put(|| async { StatusCode::INTERNAL_SERVER_ERROR })
                        .delete(|| async { StatusCode::NO_CONTENT }),
                ),
        )
        .await
    }

    #[tokio::test]
    async fn test_list_drops_deleted_centers() {
        let url = stub(Arc::new(Mutex::new(Vec::new()))).await;
        let service = CostCenterService::new(backend_client(&url));

        let centers = service.list(&test_session()).await.unwrap();
        let names: Vec<_> = centers.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Ops", "Paused"]);

        let chart = service.chart_data(&test_session()).await;
        assert_eq!(chart[0], ChartDatum::new("Active Centers", 1));
        assert_eq!(chart[1], ChartDatum::new("Inactive Centers", 1));
    }

    #[tokio::test]
    async fn test_create_sends_name_and_status() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let url = stub(received.clone()).await;
        let service = CostCenterService::new(backend_client(&url));

        let form = CostCenterForm {
            name: " Marketing ".to_string(),
            status: Some("Inactive".to_string()),
        };
        let message = service.create(&test_session(), &form).await.unwrap();

        assert_eq!(message, "Cost center created successfully.");
        assert_eq!(
            received.lock().unwrap()[0],
            json!({"name": "Marketing", "isActive": false})
        );
    }

    #[tokio::test]
    async fn test_failures_use_fixed_messages() {
        let url = stub(Arc::new(Mutex::new(Vec::new()))).await;
        let service = CostCenterService::new(backend_client(&url));
        let form = CostCenterForm {
            name: "Ops".to_string(),
            status: None,
        };

        let err = service.update(&test_session(), "1", &form).await.unwrap_err();
        assert_eq!(err.user_message(), "Failed to update cost center.");

        let empty = CostCenterForm::default();
        let err = service.create(&test_session(), &empty).await.unwrap_err();
        assert_eq!(err.user_message(), "Cost center name is required.");

        let message = service.delete(&test_session(), "1").await.unwrap();
        assert_eq!(message, "Cost center deleted successfully.");
    }
}
