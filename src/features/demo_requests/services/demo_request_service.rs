use base64::prelude::*;
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use validator::Validate;

use crate::core::config::BackendConfig;
use crate::core::error::{AppError, Result};
use crate::features::demo_requests::dtos::{DemoRequestForm, DemoSubmission};
use crate::modules::backend::{BackendClient, Envelope};

const SUBMITTED: &str =
    "Demo request submitted successfully! Our team will contact you within 24 hours.";
const INVALID_FORM: &str = "Please check all required fields and try again.";
const REJECTED: &str = "Failed to submit demo request. Please try again.";
const NOT_ACCEPTED: &str = "Failed to submit demo request.";
const UNEXPECTED: &str = "An unexpected error occurred during demo request submission.";

/// Forwards landing-page demo requests to the backend under the demo account
pub struct DemoRequestService {
    backend: Arc<BackendClient>,
    basic_auth: String,
    user_key: String,
}

impl DemoRequestService {
    pub fn new(backend: Arc<BackendClient>, config: &BackendConfig) -> Self {
        let basic_auth = config
            .demo_basic_auth
            .clone()
            .or_else(|| config.admin_credentials().map(|c| BASE64_STANDARD.encode(c)))
            .unwrap_or_default();

        Self {
            backend,
            basic_auth,
            user_key: config.demo_user_key.clone(),
        }
    }

    pub async fn submit(&self, form: &DemoRequestForm) -> Result<String> {
        if let Err(e) = form.validate() {
            tracing::debug!("Demo request rejected: {:?}", e.field_errors());
            return Err(AppError::Validation(INVALID_FORM.to_string()));
        }

        let request = self
            .backend
            .anonymous(Method::POST, "/api/DemoRequests")
            .header(reqwest::header::AUTHORIZATION, format!("Basic {}", self.basic_auth))
            .header("X-USER-KEY", &self.user_key)
            .json(&DemoSubmission::from(form));

        let response = self
            .backend
            .send_raw(request, None, "submit demo request")
            .await
            .map_err(|e| {
                tracing::error!("Demo request error: {}", e);
                AppError::ExternalServiceError(UNEXPECTED.to_string())
            })?;

        if !response.status.is_success() {
            let message = match &response.body {
                Value::Object(_) => ["message", "title"]
                    .iter()
                    .filter_map(|field| response.body.get(*field))
                    .filter_map(Value::as_str)
                    .find(|m| !m.is_empty())
                    .map(str::to_string),
                _ => response.status.canonical_reason().map(str::to_string),
            };
            tracing::warn!(
                "Demo request rejected by backend: HTTP {}",
                response.status
            );
            return Err(AppError::BadRequest(
                message.unwrap_or_else(|| REJECTED.to_string()),
            ));
        }

        let envelope = Envelope::parse(&response.body);
        if envelope.succeeded() {
            return Ok(SUBMITTED.to_string());
        }

        let message = envelope
            .error_message()
            .unwrap_or_else(|| NOT_ACCEPTED.to_string());
        Err(AppError::BadRequest(message))
    }
}
