use chrono::Local;
use reqwest::Method;
use serde_json::json;
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::api_keys::dtos::{ApiKeyForm, ApiKeyStats};
use crate::features::api_keys::models::ApiKey;
use crate::features::auth::session::SessionPayload;
use crate::modules::backend::{decode_list, BackendClient};

fn collection_path(client_id: &str) -> String {
    format!("/api/v1/clients/{}/keys", urlencoding::encode(client_id))
}

fn item_path(client_id: &str, id: &str) -> String {
    format!("{}/{}", collection_path(client_id), urlencoding::encode(id))
}

/// API keys issued to the signed-in client
pub struct ApiKeyService {
    backend: Arc<BackendClient>,
}

impl ApiKeyService {
    pub fn new(backend: Arc<BackendClient>) -> Self {
        Self { backend }
    }

    pub async fn list(&self, session: &SessionPayload) -> Result<Vec<ApiKey>> {
        let path = format!("{}?query.ShowAll=true", collection_path(&session.client_id));
        let body = self
            .backend
            .get(&path, &session.auth(), None, "fetch API keys")
            .await
            .map_err(|e| {
                tracing::error!("{}", e);
                AppError::ExternalServiceError("Failed to retrieve API keys.".to_string())
            })?;
        Ok(decode_list(body))
    }

    pub async fn create(&self, session: &SessionPayload, form: &ApiKeyForm) -> Result<String> {
        let name = form.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Key name is required.".to_string()));
        }

        self.backend
            .send_json(
                Method::POST,
                &collection_path(&session.client_id),
                &session.auth(),
                &json!({ "key": name, "isRevoked": false }),
                None,
                "create API key",
            )
            .await
            .map_err(|e| {
                tracing::error!("{}", e);
                AppError::ExternalServiceError("Failed to create API Key.".to_string())
            })?;

        Ok("API Key created successfully.".to_string())
    }

    /// Flip the revocation flag relative to `currently_revoked`
    pub async fn toggle(
        &self,
        session: &SessionPayload,
        key_id: &str,
        currently_revoked: bool,
    ) -> Result<String> {
        let revoked = !currently_revoked;
        self.backend
            .send_json(
                Method::PUT,
                &item_path(&session.client_id, key_id),
                &session.auth(),
                &json!({ "isRevoked": revoked }),
                None,
                "update API key",
            )
            .await
            .map_err(|e| {
                tracing::error!("{}", e);
                AppError::ExternalServiceError("Failed to update API Key.".to_string())
            })?;

        Ok(if revoked {
            "API Key revoked successfully.".to_string()
        } else {
            "API Key activated successfully.".to_string()
        })
    }

    pub async fn delete(&self, session: &SessionPayload, key_id: &str) -> Result<String> {
        self.backend
            .delete(
                &item_path(&session.client_id, key_id),
                &session.auth(),
                None,
                "delete API key",
            )
            .await
            .map_err(|e| {
                tracing::error!("{}", e);
                AppError::ExternalServiceError("Failed to delete API Key.".to_string())
            })?;

        Ok("API Key deleted successfully.".to_string())
    }

    pub async fn stats(&self, session: &SessionPayload) -> Result<ApiKeyStats> {
        let keys = self.list(session).await?;
        Ok(ApiKeyStats::from_keys(&keys, Local::now().date_naive()))
    }
}
