use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::types::de_id;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    #[serde(default, deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub is_revoked: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl ApiKey {
    /// Calendar day of `createdAt`, read from its leading `YYYY-MM-DD`
    pub fn created_on(&self) -> Option<chrono::NaiveDate> {
        let created = self.created_at.as_deref()?;
        let day = created.get(..10)?;
        chrono::NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }
}

/// Shorten a key for display: first 8 characters, `...`, last 4 characters.
pub fn mask_key(key: &str) -> String {
    if key.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = key.chars().collect();
    let head: String = chars.iter().take(8).collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key(""), "");
        assert_eq!(mask_key("short"), "short...hort");
        assert_eq!(mask_key("abcdefgh1234567890wxyz"), "abcdefgh...wxyz");
    }

    #[test]
    fn test_created_on_reads_date_prefix() {
        let key = ApiKey {
            created_at: Some("2026-03-04T10:20:30Z".to_string()),
            ..Default::default()
        };
        assert_eq!(
            key.created_on(),
            chrono::NaiveDate::from_ymd_opt(2026, 3, 4)
        );

        let key = ApiKey {
            created_at: Some("yesterday".to_string()),
            ..Default::default()
        };
        assert!(key.created_on().is_none());
    }
}
