use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::{Validate, ValidationErrors};

use crate::shared::types::ActionState;

fn default_connection_method() -> String {
    "Email".to_string()
}

/// Landing page "request a demo" form
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DemoRequestForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Full name is required."))]
    pub full_name: String,

    #[serde(default)]
    #[validate(email(message = "Invalid email format."))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Mobile number is required."))]
    pub mobile_number: String,

    #[serde(default)]
    pub message: Option<String>,

    /// Field name matches the backend contract
    #[serde(default = "default_connection_method")]
    pub favorit_connection_method: String,
}

/// Body posted to the backend; every field trimmed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoSubmission {
    pub full_name: String,
    pub email: String,
    pub mobile_number: String,
    pub message: String,
    pub favorit_connection_method: String,
}

impl From<&DemoRequestForm> for DemoSubmission {
    fn from(form: &DemoRequestForm) -> Self {
        let method = form.favorit_connection_method.trim();
        Self {
            full_name: form.full_name.trim().to_string(),
            email: form.email.trim().to_string(),
            mobile_number: form.mobile_number.trim().to_string(),
            message: form
                .message
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            favorit_connection_method: if method.is_empty() {
                default_connection_method()
            } else {
                method.to_string()
            },
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct LandingPage {
    pub action: Option<ActionState>,
    /// Messages per form field, keyed by the field's form name
    pub errors: BTreeMap<String, Vec<String>>,
    /// Submitted values, echoed back when the submission failed
    pub form: Option<DemoRequestForm>,
}

/// Messages per field, keyed by the camelCase form name
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid {}.", field))
                })
                .collect();
            (camel_case(field), messages)
        })
        .collect()
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
