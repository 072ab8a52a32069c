use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::api_keys::models::{mask_key, ApiKey};
use crate::shared::types::{ActionState, PageUser};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiKeyForm {
    #[serde(default)]
    pub name: String,
}

/// Revocation state the key had when the toggle was pressed
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleKeyForm {
    #[serde(default)]
    pub is_revoked: bool,
}

/// An API key as listed on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyView {
    #[serde(flatten)]
    pub key: ApiKey,
    pub name: String,
    pub display_key: String,
}

impl From<ApiKey> for ApiKeyView {
    fn from(key: ApiKey) -> Self {
        Self {
            name: key.key.clone(),
            display_key: mask_key(&key.key),
            key,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyStats {
    pub total: usize,
    pub active: usize,
    pub revoked: usize,
    pub created_today: usize,
}

impl ApiKeyStats {
    pub fn from_keys(keys: &[ApiKey], today: NaiveDate) -> Self {
        let revoked = keys.iter().filter(|k| k.is_revoked).count();
        Self {
            total: keys.len(),
            active: keys.len() - revoked,
            revoked,
            created_today: keys
                .iter()
                .filter(|k| k.created_on() == Some(today))
                .count(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiKeysPage {
    pub user: PageUser,
    pub active_nav: &'static str,
    pub api_keys: Vec<ApiKeyView>,
    pub stats: ApiKeyStats,
    pub error: Option<String>,
    pub action: Option<ActionState>,
}
