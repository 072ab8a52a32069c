use axum::{extract::State, Json};
use std::sync::Arc;

use crate::core::error::AppError;
use crate::features::auth::session::SessionPayload;
use crate::features::dashboard::services::DashboardService;
use crate::shared::types::{ApiResponse, ChartDatum, Meta};

/// Active and inactive cost centers for the dashboard pie chart
#[utoipa::path(
    get,
    path = "/api/dashboard/cost-center-chart",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Chart data, empty when cost centers are unavailable", body = ApiResponse<Vec<ChartDatum>>),
        (status = 401, description = "No session")
    )
)]
pub async fn cost_center_chart(
    State(service): State<Arc<DashboardService>>,
    session: SessionPayload,
) -> Result<Json<ApiResponse<Vec<ChartDatum>>>, AppError> {
    let chart = service.cost_center_chart(&session).await;
    let total = chart.iter().map(|datum| datum.value).sum();
    Ok(Json(ApiResponse::success(
        Some(chart),
        None,
        Some(Meta { total }),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::api_keys::ApiKeyService;
    use crate::features::cost_centers::CostCenterService;
    use crate::features::invoices::InvoiceService;
    use crate::features::projects::ProjectService;
    use crate::shared::test_helpers::{backend_client, fast_gateway_config};
    use axum::{body::Body, http::Request, http::StatusCode, routing::get, Router};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_chart_requires_session() {
        let backend = backend_client("http://127.0.0.1:9");
        let service = Arc::new(DashboardService::new(
            Arc::new(ProjectService::new(backend.clone())),
            Arc::new(ApiKeyService::new(backend.clone())),
            Arc::new(InvoiceService::new(backend.clone(), fast_gateway_config())),
            Arc::new(CostCenterService::new(backend)),
        ));
        let app = Router::new()
            .route("/api/dashboard/cost-center-chart", get(cost_center_chart))
            .with_state(service);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/dashboard/cost-center-chart")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
