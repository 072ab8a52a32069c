use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::features::cost_centers::models::CostCenter;
use crate::shared::types::{ActionState, ChartDatum, PageUser};

/// Create/update form post
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CostCenterForm {
    #[validate(length(min = 1, message = "Cost center name is required."))]
    #[serde(default)]
    pub name: String,

    /// `Active` or `Inactive`; new centers are active
    #[serde(default)]
    pub status: Option<String>,
}

impl CostCenterForm {
    pub fn is_active(&self) -> bool {
        self.status.as_deref() != Some("Inactive")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CostCenterStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
}

impl CostCenterStats {
    pub fn from_centers(centers: &[CostCenter]) -> Self {
        let active = centers.iter().filter(|c| c.is_active).count();
        Self {
            total: centers.len(),
            active,
            inactive: centers.len() - active,
        }
    }

    pub fn chart(&self) -> Vec<ChartDatum> {
        vec![
            ChartDatum::new("Active Centers", self.active as i64),
            ChartDatum::new("Inactive Centers", self.inactive as i64),
        ]
    }
}

#[derive(Debug, Serialize)]
pub struct CostCentersPage {
    pub user: PageUser,
    pub active_nav: &'static str,
    pub cost_centers: Vec<CostCenter>,
    pub stats: CostCenterStats,
    pub error: Option<String>,
    pub action: Option<ActionState>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn center(name: &str, is_active: bool) -> CostCenter {
        CostCenter {
            id: name.to_string(),
            name: name.to_string(),
            is_active,
            ..Default::default()
        }
    }

    #[test]
    fn test_chart_counts_active_and_inactive() {
        let stats = CostCenterStats::from_centers(&[
            center("a", true),
            center("b", true),
            center("c", false),
        ]);
        assert_eq!(
            stats.chart(),
            vec![
                ChartDatum::new("Active Centers", 2),
                ChartDatum::new("Inactive Centers", 1)
            ]
        );
    }

    #[test]
    fn test_form_defaults_to_active() {
        let form = CostCenterForm {
            name: "Ops".to_string(),
            status: None,
        };
        assert!(form.is_active());
        assert!(!CostCenterForm {
            status: Some("Inactive".to_string()),
            ..form
        }
        .is_active());
    }
}
