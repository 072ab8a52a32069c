use std::sync::Arc;

use crate::features::api_keys::ApiKeyService;
use crate::features::auth::session::SessionPayload;
use crate::features::cost_centers::dtos::CostCenterStats;
use crate::features::cost_centers::CostCenterService;
use crate::features::dashboard::dtos::DashboardStats;
use crate::features::invoices::InvoiceService;
use crate::features::projects::ProjectService;
use crate::shared::types::ChartDatum;

/// Aggregates the other feature services into the dashboard view
pub struct DashboardService {
    projects: Arc<ProjectService>,
    api_keys: Arc<ApiKeyService>,
    invoices: Arc<InvoiceService>,
    cost_centers: Arc<CostCenterService>,
}

impl DashboardService {
    pub fn new(
        projects: Arc<ProjectService>,
        api_keys: Arc<ApiKeyService>,
        invoices: Arc<InvoiceService>,
        cost_centers: Arc<CostCenterService>,
    ) -> Self {
        Self {
            projects,
            api_keys,
            invoices,
            cost_centers,
        }
    }

    // ========================================================================
    // Summary
    // ========================================================================

    /// Stat cards and the cost center chart. Sources load concurrently and
    /// each one that fails counts as empty.
    pub async fn overview(&self, session: &SessionPayload) -> (DashboardStats, Vec<ChartDatum>) {
        let (projects, api_keys, cost_centers, invoices) = tokio::join!(
            self.projects.list(session),
            self.api_keys.list(session),
            self.cost_centers.list(session),
            self.invoices.invoice_stats(session),
        );

        let projects = projects.unwrap_or_else(|e| {
            tracing::warn!("Dashboard projects unavailable: {}", e);
            Vec::new()
        });
        let api_keys = api_keys.unwrap_or_else(|e| {
            tracing::warn!("Dashboard API keys unavailable: {}", e);
            Vec::new()
        });
        let cost_centers = cost_centers.unwrap_or_else(|e| {
            tracing::warn!("Dashboard cost centers unavailable: {}", e);
            Vec::new()
        });

        let chart = CostCenterStats::from_centers(&cost_centers).chart();
        let stats = DashboardStats::collect(&projects, &api_keys, &cost_centers, invoices);
        (stats, chart)
    }

    // ========================================================================
    // Charts
    // ========================================================================

    pub async fn cost_center_chart(&self, session: &SessionPayload) -> Vec<ChartDatum> {
        self.cost_centers.chart_data(session).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{
        backend_client, fast_gateway_config, spawn_backend, test_session,
    };
    use axum::{http::StatusCode, routing::get, Json, Router};
    use serde_json::json;

    fn dashboard(url: &str) -> DashboardService {
        let backend = backend_client(url);
        DashboardService::new(
            Arc::new(ProjectService::new(backend.clone())),
            Arc::new(ApiKeyService::new(backend.clone())),
            Arc::new(InvoiceService::new(backend.clone(), fast_gateway_config())),
            Arc::new(CostCenterService::new(backend)),
        )
    }

    #[tokio::test]
    async fn test_failed_sources_count_as_zero() {
        let url = spawn_backend(
            Router::new()
                .route(
                    "/api/v1/clients/2/projects",
                    get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
                )
                .route(
                    "/api/v1/clients/2/keys",
                    get(|| async {
                        Json(json!({"data": [
                            {"id": 1, "key": "k1", "isRevoked": true},
                            {"id": 2, "key": "k2", "isRevoked": false}
                        ]}))
                    }),
                )
                .route(
                    "/api/v1/clients/2/CostCenters",
                    get(|| async {
                        Json(json!({"data": [
                            {"id": 1, "name": "Ops", "isActive": true},
                            {"id": 2, "name": "Old", "isActive": false}
                        ]}))
                    }),
                )
                .route(
                    "/api/Invoices",
                    get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
                ),
        )
        .await;

        let (stats, chart) = dashboard(&url).overview(&test_session()).await;

        assert_eq!(stats.total_projects, 0);
        assert_eq!(stats.total_api_keys, 2);
        assert_eq!(stats.revoked_api_keys, 1);
        assert_eq!(stats.total_cost_centers, 2);
        assert_eq!(stats.active_cost_centers, 1);
        assert_eq!(stats.invoices.total, 0);
        assert_eq!(
            chart,
            vec![
                ChartDatum::new("Active Centers", 1),
                ChartDatum::new("Inactive Centers", 1),
            ]
        );
    }
}
