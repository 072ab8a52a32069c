use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::shared::types::{de_id, de_opt_id};

/// Processing state of an uploaded file, as an integer on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum ProcessingStatus {
    NotSet,
    Skipped,
    New,
    Processing,
    Failed,
    Completed,
    /// A code this application does not know about, kept as sent
    Unknown(i32),
}

impl From<i32> for ProcessingStatus {
    fn from(code: i32) -> Self {
        match code {
            -2 => ProcessingStatus::NotSet,
            -1 => ProcessingStatus::Skipped,
            0 => ProcessingStatus::New,
            1 => ProcessingStatus::Processing,
            2 => ProcessingStatus::Failed,
            3 => ProcessingStatus::Completed,
            other => ProcessingStatus::Unknown(other),
        }
    }
}

impl From<ProcessingStatus> for i32 {
    fn from(status: ProcessingStatus) -> Self {
        match status {
            ProcessingStatus::NotSet => -2,
            ProcessingStatus::Skipped => -1,
            ProcessingStatus::New => 0,
            ProcessingStatus::Processing => 1,
            ProcessingStatus::Failed => 2,
            ProcessingStatus::Completed => 3,
            ProcessingStatus::Unknown(code) => code,
        }
    }
}

impl ProcessingStatus {
    pub fn code(self) -> i32 {
        self.into()
    }

    pub fn label(self) -> &'static str {
        match self {
            ProcessingStatus::NotSet => "Not set",
            ProcessingStatus::Skipped => "Skipped",
            ProcessingStatus::New => "New",
            ProcessingStatus::Processing => "Processing",
            ProcessingStatus::Failed => "Failed",
            ProcessingStatus::Completed => "Completed",
            ProcessingStatus::Unknown(_) => "Unknown",
        }
    }
}

/// Uploaded file as described by the backend.
///
/// The backend also sends a `invoice` back-reference; it is not modelled and
/// is dropped on decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    #[serde(default, deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default)]
    pub public_url: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<i32>)]
    pub status: Option<ProcessingStatus>,
    #[serde(default)]
    pub processed_at: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub retry_count: Option<i32>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub job_id: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub ai_reply: Option<Value>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub cost_center_id: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub expense_type_id: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub invoice_id: Option<String>,
    #[serde(default)]
    pub process_immediately: Option<bool>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub client_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_codes_round_trip_including_unknown() {
        for code in [-2, -1, 0, 1, 2, 3, 42] {
            let status = ProcessingStatus::from(code);
            assert_eq!(status.code(), code);
        }
        assert_eq!(ProcessingStatus::from(42), ProcessingStatus::Unknown(42));
        assert_eq!(ProcessingStatus::from(3), ProcessingStatus::Completed);
    }

    #[test]
    fn test_metadata_drops_invoice_back_reference() {
        let meta: FileMetadata = serde_json::from_value(json!({
            "id": 5,
            "fileName": "a.pdf",
            "status": 2,
            "errorMessage": "bad scan",
            "clientId": 2,
            "invoice": {"id": 9, "file": {"id": 5}}
        }))
        .unwrap();

        assert_eq!(meta.id, "5");
        assert_eq!(meta.status, Some(ProcessingStatus::Failed));
        assert_eq!(meta.client_id.as_deref(), Some("2"));

        let out = serde_json::to_value(&meta).unwrap();
        assert!(out.get("invoice").is_none());
        assert_eq!(out["status"], json!(2));
    }
}
