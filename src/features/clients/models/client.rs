use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::types::de_id;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[serde(default, deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub timezone_offset: Option<f64>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub created_date: Option<String>,
    #[serde(default)]
    pub modified_by: Option<String>,
    #[serde(default)]
    pub modified_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientUser {
    #[serde(default, deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub normalized_email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

impl ClientUser {
    /// True when this user signs in with `email`
    pub fn matches_email(&self, email: &str) -> bool {
        self.email.as_deref() == Some(email)
            || self.normalized_email.as_deref() == Some(email.to_uppercase().as_str())
            || self.user_name.as_deref() == Some(email)
    }

    /// "First Last", only when both parts are present
    pub fn full_name(&self) -> Option<String> {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) if !first.is_empty() && !last.is_empty() => {
                Some(format!("{} {}", first, last).trim().to_string())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_matches_any_login_identifier() {
        let user: ClientUser = serde_json::from_value(serde_json::json!({
            "id": 5,
            "email": "Ada@Example.com",
            "normalizedEmail": "ADA@EXAMPLE.COM",
            "userName": "ada",
        }))
        .unwrap();

        assert_eq!(user.id, "5");
        assert!(user.matches_email("Ada@Example.com"));
        assert!(user.matches_email("ada@example.com"));
        assert!(user.matches_email("ada"));
        assert!(!user.matches_email("bob@example.com"));
    }

    #[test]
    fn test_full_name_requires_both_parts() {
        let mut user = ClientUser {
            id: "1".to_string(),
            email: None,
            user_name: None,
            normalized_email: None,
            first_name: Some("Ada".to_string()),
            last_name: None,
            phone_number: None,
        };
        assert!(user.full_name().is_none());

        user.last_name = Some("Lovelace".to_string());
        assert_eq!(user.full_name().as_deref(), Some("Ada Lovelace"));
    }
}
