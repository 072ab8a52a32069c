use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::cost_centers::models::CostCenter;
use crate::shared::types::de_id;

/// Sub-classification of expenses under a cost center
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseType {
    #[serde(default, deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "de_id")]
    pub cost_center_id: String,
    #[serde(default)]
    pub cost_center: Option<CostCenterRef>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub created_date: Option<String>,
    #[serde(default)]
    pub modified_date: Option<String>,
    #[serde(default)]
    pub is_deleted: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CostCenterRef {
    #[serde(default, deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl ExpenseType {
    pub fn is_deleted(&self) -> bool {
        self.is_deleted.unwrap_or(false)
    }

    /// Active unless the backend says otherwise
    pub fn is_active(&self) -> bool {
        self.is_active != Some(false)
    }

    /// Attach the owning cost center for display
    pub fn with_cost_center(mut self, center: &CostCenter) -> Self {
        self.cost_center = Some(CostCenterRef {
            id: center.id.clone(),
            name: center.name.clone(),
        });
        self
    }
}
