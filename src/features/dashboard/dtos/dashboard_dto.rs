use serde::Serialize;
use utoipa::ToSchema;

use crate::features::api_keys::models::ApiKey;
use crate::features::cost_centers::dtos::CostCenterStats;
use crate::features::cost_centers::models::CostCenter;
use crate::features::invoices::dtos::InvoiceStats;
use crate::features::projects::models::Project;
use crate::shared::types::{ChartDatum, PageUser};

// ============================================================================
// Stat cards
// ============================================================================

/// Counts shown on the dashboard cards. A source that failed to load
/// contributes zeros.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_projects: usize,
    pub active_projects: usize,
    pub total_api_keys: usize,
    pub revoked_api_keys: usize,
    pub total_cost_centers: usize,
    pub active_cost_centers: usize,
    pub invoices: InvoiceStats,
}

impl DashboardStats {
    pub fn collect(
        projects: &[Project],
        api_keys: &[ApiKey],
        cost_centers: &[CostCenter],
        invoices: InvoiceStats,
    ) -> Self {
        let centers = CostCenterStats::from_centers(cost_centers);
        Self {
            total_projects: projects.len(),
            active_projects: projects.iter().filter(|p| p.is_active).count(),
            total_api_keys: api_keys.len(),
            revoked_api_keys: api_keys.iter().filter(|k| k.is_revoked).count(),
            total_cost_centers: centers.total,
            active_cost_centers: centers.active,
            invoices,
        }
    }
}

// ============================================================================
// Page
// ============================================================================

#[derive(Debug, Serialize)]
pub struct DashboardPage {
    pub user: PageUser,
    pub active_nav: &'static str,
    pub stats: DashboardStats,
    pub cost_center_chart: Vec<ChartDatum>,
}
