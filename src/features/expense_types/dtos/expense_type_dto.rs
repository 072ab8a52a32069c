use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;
use validator::Validate;

use crate::features::cost_centers::models::CostCenter;
use crate::features::expense_types::models::ExpenseType;
use crate::shared::types::{ActionState, PageUser};

/// Create/update form post
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseTypeForm {
    #[validate(length(min = 1))]
    #[serde(default)]
    pub name: String,

    #[validate(length(min = 1))]
    #[serde(default)]
    pub cost_center_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteExpenseTypeForm {
    #[serde(default)]
    pub cost_center_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseTypeStats {
    pub total: usize,
    pub active: usize,
    pub cost_centers_in_use: usize,
}

impl ExpenseTypeStats {
    pub fn from_types(types: &[ExpenseType]) -> Self {
        Self {
            total: types.len(),
            active: types.iter().filter(|et| et.is_active()).count(),
            cost_centers_in_use: types
                .iter()
                .map(|et| et.cost_center_id.as_str())
                .collect::<HashSet<_>>()
                .len(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExpenseTypesPage {
    pub user: PageUser,
    pub active_nav: &'static str,
    pub expense_types: Vec<ExpenseType>,
    /// Choices for the cost center select
    pub cost_centers: Vec<CostCenter>,
    pub stats: ExpenseTypeStats,
    pub error: Option<String>,
    pub action: Option<ActionState>,
}
