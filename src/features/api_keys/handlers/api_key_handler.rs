use axum::{extract::State, Json};
use std::sync::Arc;

use crate::core::error::Result;
use crate::features::api_keys::dtos::ApiKeyStats;
use crate::features::api_keys::services::ApiKeyService;
use crate::features::auth::session::SessionPayload;
use crate::shared::types::ApiResponse;

#[utoipa::path(
    get,
    path = "/api/api-keys/stats",
    responses(
        (status = 200, description = "Key counts", body = ApiResponse<ApiKeyStats>),
        (status = 401, description = "No session"),
        (status = 502, description = "Backend unavailable")
    ),
    tag = "api-keys"
)]
pub async fn api_key_stats(
    State(service): State<Arc<ApiKeyService>>,
    session: SessionPayload,
) -> Result<Json<ApiResponse<ApiKeyStats>>> {
    let stats = service.stats(&session).await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{backend_client, spawn_backend, with_session};
    use axum::{http::StatusCode, routing::get, Router};
    use axum_test::TestServer;
    use serde_json::Value;

    #[tokio::test]
    async fn test_stats_reports_backend_failure() {
        let url = spawn_backend(Router::new().route(
            "/api/v1/clients/2/keys",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        ))
        .await;
        let service = Arc::new(ApiKeyService::new(backend_client(&url)));
        let app = with_session(
            Router::new()
                .route("/api/api-keys/stats", get(api_key_stats))
                .with_state(service),
        );
        let server = TestServer::new(app).unwrap();

        let response = server.get("/api/api-keys/stats").await;
        response.assert_status(StatusCode::BAD_GATEWAY);
        let body = response.json::<Value>();
        assert_eq!(body["message"], "Failed to retrieve API keys.");
    }
}
