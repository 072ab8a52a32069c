use reqwest::header::{ACCEPT, AUTHORIZATION, SET_COOKIE};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::core::config::BackendConfig;

/// Credentials forwarded on every authenticated backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendAuth {
    /// base64 of `email:password`
    pub basic_auth: String,
    pub user_key: String,
    pub client_key: Option<String>,
}

/// Failure of a backend call, phrased for the end user
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Timeout during {operation}. The server took too long to respond.")]
    Timeout { operation: String },

    #[error("Operation failed: {operation}. Status: {status}. Details: {details}")]
    Status {
        operation: String,
        status: u16,
        details: String,
        body: Value,
    },

    #[error("Failed to {operation}. Error: {message}")]
    Network { operation: String, message: String },

    #[error("Failed to {operation}. Error: {message}")]
    Decode { operation: String, message: String },
}

impl BackendError {
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw error body returned by the backend, if any
    pub fn body(&self) -> Option<&Value> {
        match self {
            BackendError::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    /// A string member of the error body (`message`, `detail`, ...)
    pub fn body_field(&self, field: &str) -> Option<String> {
        self.body()?
            .get(field)?
            .as_str()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    pub fn decode(operation: &str, err: impl std::fmt::Display) -> Self {
        BackendError::Decode {
            operation: operation.to_string(),
            message: err.to_string(),
        }
    }

    fn from_reqwest(operation: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout {
                operation: operation.to_string(),
            }
        } else {
            BackendError::Network {
                operation: operation.to_string(),
                message: err.to_string(),
            }
        }
    }
}

/// Extract the most useful human-readable detail from an error body
pub fn error_details(body: &Value) -> String {
    const NO_DETAILS: &str = "No additional details from server.";

    match body {
        Value::String(text) if !text.is_empty() => text.clone(),
        Value::Object(map) => {
            for field in ["message", "error"] {
                if let Some(text) = map.get(field).and_then(Value::as_str) {
                    if !text.is_empty() {
                        return text.to_string();
                    }
                }
            }
            if let Some(Value::Array(messages)) = map.get("messages") {
                return messages
                    .iter()
                    .map(|m| m.as_str().map(str::to_string).unwrap_or_else(|| m.to_string()))
                    .collect::<Vec<_>>()
                    .join(", ");
            }
            serde_json::to_string(body).unwrap_or_else(|_| NO_DETAILS.to_string())
        }
        Value::Null => NO_DETAILS.to_string(),
        Value::String(_) => NO_DETAILS.to_string(),
        other => other.to_string(),
    }
}

/// Status, cookies and decoded body of a backend response
#[derive(Debug)]
pub struct BackendResponse {
    pub status: StatusCode,
    pub set_cookies: Vec<String>,
    pub body: Value,
}

/// HTTP client for the remote backend API
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(3))
            .build()
            .map_err(|e| BackendError::Network {
                operation: "build backend client".to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Request without caller credentials
    pub fn anonymous(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header(ACCEPT, "application/json")
    }

    /// Request carrying basic auth, user key and (when known) client key
    pub fn authorized(&self, method: Method, path: &str, auth: &BackendAuth) -> RequestBuilder {
        let request = self
            .anonymous(method, path)
            .header(AUTHORIZATION, format!("Basic {}", auth.basic_auth))
            .header("X-USER-KEY", &auth.user_key);

        match &auth.client_key {
            Some(client_key) => request.header("X-API-KEY", client_key),
            None => request,
        }
    }

    /// Send and decode without judging the status code
    pub async fn send_raw(
        &self,
        request: RequestBuilder,
        timeout: Option<Duration>,
        operation: &str,
    ) -> Result<BackendResponse, BackendError> {
        let request = match timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(operation, e))?;

        let status = response.status();
        let set_cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();

        let text = response
            .text()
            .await
            .map_err(|e| BackendError::from_reqwest(operation, e))?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(BackendResponse {
            status,
            set_cookies,
            body,
        })
    }

    /// Send, failing on any non-2xx status
    pub async fn send(
        &self,
        request: RequestBuilder,
        timeout: Option<Duration>,
        operation: &str,
    ) -> Result<Value, BackendError> {
        let response = self.send_raw(request, timeout, operation).await?;

        if !response.status.is_success() {
            let details = error_details(&response.body);
            tracing::error!(
                "Backend error during {}: HTTP {} - {}",
                operation,
                response.status,
                details
            );
            return Err(BackendError::Status {
                operation: operation.to_string(),
                status: response.status.as_u16(),
                details,
                body: response.body,
            });
        }

        Ok(response.body)
    }

    pub async fn get(
        &self,
        path: &str,
        auth: &BackendAuth,
        timeout: Option<Duration>,
        operation: &str,
    ) -> Result<Value, BackendError> {
        self.send(self.authorized(Method::GET, path, auth), timeout, operation)
            .await
    }

    pub async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        auth: &BackendAuth,
        body: &B,
        timeout: Option<Duration>,
        operation: &str,
    ) -> Result<Value, BackendError> {
        self.send(
            self.authorized(method, path, auth).json(body),
            timeout,
            operation,
        )
        .await
    }

    pub async fn delete(
        &self,
        path: &str,
        auth: &BackendAuth,
        timeout: Option<Duration>,
        operation: &str,
    ) -> Result<Value, BackendError> {
        self.send(
            self.authorized(Method::DELETE, path, auth),
            timeout,
            operation,
        )
        .await
    }
}
