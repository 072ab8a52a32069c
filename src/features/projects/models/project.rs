use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::types::de_id;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default, deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub application_url: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}
