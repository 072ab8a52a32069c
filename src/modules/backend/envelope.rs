use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Wrapper the backend puts around most responses
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(default)]
    pub is_success: Option<bool>,
    #[serde(default)]
    pub succeeded: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub messages: Option<Vec<String>>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl Envelope {
    /// Read the envelope fields of a body; bodies that are not objects yield
    /// an empty envelope
    pub fn parse(body: &Value) -> Self {
        if !body.is_object() {
            return Self::default();
        }
        serde_json::from_value(body.clone()).unwrap_or_default()
    }

    pub fn succeeded(&self) -> bool {
        self.is_success.or(self.succeeded).unwrap_or(false)
    }

    /// `false` only when the backend explicitly reported failure
    pub fn not_failed(&self) -> bool {
        self.is_success.or(self.succeeded).unwrap_or(true)
    }

    /// Joined message list, falling back to the single message
    pub fn error_message(&self) -> Option<String> {
        self.messages
            .as_ref()
            .filter(|m| !m.is_empty())
            .map(|m| m.join("; "))
            .or_else(|| self.message.clone().filter(|m| !m.is_empty()))
    }
}

/// The `data` member when present and non-null, otherwise the body itself
fn payload(body: Value) -> Value {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(data) if !data.is_null() => data,
            Some(data) => {
                map.insert("data".to_string(), data);
                Value::Object(map)
            }
            None => Value::Object(map),
        },
        other => other,
    }
}

/// Decode the payload of a body into `T`
pub fn decode_payload<T: DeserializeOwned>(body: Value) -> Result<T, serde_json::Error> {
    serde_json::from_value(payload(body))
}

/// Decode a list payload. Non-array payloads become an empty list, and
/// elements that are null or do not match `T` are skipped.
pub fn decode_list<T: DeserializeOwned>(body: Value) -> Vec<T> {
    match payload(body) {
        Value::Array(items) => items
            .into_iter()
            .filter(|item| !item.is_null())
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!("Skipping malformed list item from backend: {}", e);
                    None
                }
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: i64,
    }

    #[test]
    fn test_payload_prefers_data_member() {
        let item: Item = decode_payload(json!({"isSuccess": true, "data": {"id": 1}})).unwrap();
        assert_eq!(item, Item { id: 1 });
    }

    #[test]
    fn test_payload_falls_back_to_body() {
        let item: Item = decode_payload(json!({"id": 2})).unwrap();
        assert_eq!(item, Item { id: 2 });
    }

    #[test]
    fn test_list_from_envelope_or_bare_array() {
        let wrapped: Vec<Item> = decode_list(json!({"data": [{"id": 1}, null, {"id": 2}]}));
        assert_eq!(wrapped, vec![Item { id: 1 }, Item { id: 2 }]);

        let bare: Vec<Item> = decode_list(json!([{"id": 3}]));
        assert_eq!(bare, vec![Item { id: 3 }]);
    }

    #[test]
    fn test_list_of_non_array_is_empty() {
        let items: Vec<Item> = decode_list(json!({"data": {"id": 1}}));
        assert!(items.is_empty());
        let items: Vec<Item> = decode_list(Value::Null);
        assert!(items.is_empty());
    }

    #[test]
    fn test_list_skips_malformed_items() {
        let items: Vec<Item> = decode_list(json!([{"id": "x"}, {"id": 4}]));
        assert_eq!(items, vec![Item { id: 4 }]);
    }

    #[test]
    fn test_envelope_success_flags() {
        assert!(Envelope::parse(&json!({"isSuccess": true})).succeeded());
        assert!(Envelope::parse(&json!({"succeeded": true})).succeeded());
        assert!(!Envelope::parse(&json!({})).succeeded());
        assert!(Envelope::parse(&json!([])).not_failed());
        assert!(!Envelope::parse(&json!({"isSuccess": false})).not_failed());
    }

    #[test]
    fn test_envelope_error_message() {
        let env = Envelope::parse(&json!({"messages": ["a", "b"]}));
        assert_eq!(env.error_message().as_deref(), Some("a; b"));

        let env = Envelope::parse(&json!({"message": "nope", "messages": ["a"]}));
        assert_eq!(env.error_message().as_deref(), Some("a"));

        let env = Envelope::parse(&json!({"message": "nope", "messages": []}));
        assert_eq!(env.error_message().as_deref(), Some("nope"));

        assert!(Envelope::parse(&json!({"message": ""})).error_message().is_none());
    }
}
