use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::clients::models::{Client, ClientUser};
use crate::modules::backend::{decode_list, decode_payload, BackendAuth, BackendClient, BackendError};

/// Reads clients and client users from the backend
pub struct ClientService {
    backend: Arc<BackendClient>,
}

impl ClientService {
    pub fn new(backend: Arc<BackendClient>) -> Self {
        Self { backend }
    }

    pub async fn list(&self, auth: &BackendAuth) -> Result<Vec<Client>> {
        let body = self
            .backend
            .get("/api/v1/Clients?query.ShowAll=true", auth, None, "fetch clients")
            .await?;
        Ok(decode_list(body))
    }

    pub async fn get(&self, auth: &BackendAuth, client_id: &str) -> Result<Client> {
        self.fetch_client(auth, client_id).await.map_err(AppError::from)
    }

    pub async fn users(&self, auth: &BackendAuth, client_id: &str) -> Result<Vec<ClientUser>> {
        self.fetch_users(auth, client_id).await.map_err(AppError::from)
    }

    /// Raw lookup shared with the login flow
    pub async fn fetch_client(
        &self,
        auth: &BackendAuth,
        client_id: &str,
    ) -> std::result::Result<Client, BackendError> {
        let path = format!("/api/v1/Clients/{}", urlencoding::encode(client_id));
        let body = self.backend.get(&path, auth, None, "fetch client").await?;
        decode_payload(body).map_err(|e| BackendError::decode("fetch client", e))
    }

    /// Users of a client. A single object payload counts as a one-user list.
    pub async fn fetch_users(
        &self,
        auth: &BackendAuth,
        client_id: &str,
    ) -> std::result::Result<Vec<ClientUser>, BackendError> {
        let path = format!("/api/v1/clients/{}/users", urlencoding::encode(client_id));
        let body = self
            .backend
            .get(&path, auth, None, "fetch client users")
            .await?;

        let single = body.get("data").is_some_and(|d| d.is_object());
        if single {
            let user: ClientUser = decode_payload(body)
                .map_err(|e| BackendError::decode("fetch client users", e))?;
            return Ok(vec![user]);
        }
        Ok(decode_list(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{backend_client, spawn_backend, test_auth};
    use axum::{extract::Path, routing::get, Json, Router};
    use serde_json::{json, Value};

    async fn stub() -> String {
        spawn_backend(
            Router::new()
                .route(
                    "/api/v1/Clients",
                    get(|| async {
                        Json(json!({"isSuccess": true, "data": [
                            {"id": 1, "name": "Acme", "isActive": true},
                            {"id": "2", "name": "Globex", "isActive": false}
                        ]}))
                    }),
                )
                .route(
                    "/api/v1/clients/{id}/users",
                    get(|Path(id): Path<String>| async move {
                        let data: Value = if id == "1" {
                            json!({"id": 10, "email": "solo@acme.test"})
                        } else {
                            json!([{"id": 11}, {"id": 12}])
                        };
                        Json(json!({"isSuccess": true, "data": data}))
                    }),
                ),
        )
        .await
    }

    #[tokio::test]
    async fn test_list_normalises_ids() {
        let service = ClientService::new(backend_client(&stub().await));
        let clients = service.list(&test_auth()).await.unwrap();
        let ids: Vec<_> = clients.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_users_accepts_single_object() {
        let service = ClientService::new(backend_client(&stub().await));
        let one = service.users(&test_auth(), "1").await.unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].email.as_deref(), Some("solo@acme.test"));

        let many = service.users(&test_auth(), "2").await.unwrap();
        assert_eq!(many.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_client_is_not_found() {
        let service = ClientService::new(backend_client(&stub().await));
        let err = service.get(&test_auth(), "404").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
