use base64::prelude::*;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::core::config::BackendConfig;
use crate::modules::backend::{BackendAuth, BackendClient, BackendError, Envelope};
use crate::shared::validation::user_key_from_set_cookie;

/// Outcome of `POST /api/v1/Account/Login`, successful or not
#[derive(Debug, Clone, Default)]
pub struct LoginReply {
    pub http_ok: bool,
    pub is_success: bool,
    pub message: Option<String>,
    pub user_key: Option<String>,
    pub client_id: Option<String>,
    pub client_key: Option<String>,
}

impl LoginReply {
    fn from_response(http_ok: bool, set_cookies: &[String], body: &Value) -> Self {
        let envelope = Envelope::parse(body);
        let data = envelope.data.clone().unwrap_or(Value::Null);

        let string_field = |name: &str| match data.get(name) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        // The cookie wins over the body
        let user_key = set_cookies
            .iter()
            .find_map(|c| user_key_from_set_cookie(c))
            .or_else(|| string_field("userKey"));

        Self {
            http_ok,
            is_success: envelope.is_success.unwrap_or(false),
            message: envelope.message.clone().filter(|m| !m.is_empty()),
            user_key,
            client_id: string_field("clientId"),
            client_key: string_field("clientKey"),
        }
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Account endpoints of the backend, including the admin credentials used
/// for user lookups, sign-up and OTP
pub struct AccountClient {
    backend: Arc<BackendClient>,
    admin_credentials: Option<String>,
}

impl AccountClient {
    pub fn new(backend: Arc<BackendClient>, config: &BackendConfig) -> Self {
        Self {
            backend,
            admin_credentials: config.admin_credentials(),
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginReply, BackendError> {
        let request = self
            .backend
            .anonymous(Method::POST, "/api/v1/Account/Login")
            .json(&LoginRequest { username, password });

        let response = self.backend.send_raw(request, None, "log in").await?;
        Ok(LoginReply::from_response(
            response.status.is_success(),
            &response.set_cookies,
            &response.body,
        ))
    }

    /// Sign in with the configured admin account. `None` when no admin
    /// account is configured or the backend refuses it.
    pub async fn admin_auth(&self) -> Option<BackendAuth> {
        let credentials = self.admin_credentials.as_deref()?;
        let (username, password) = credentials.split_once(':')?;

        let reply = match self.login(username, password).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("Admin login failed: {}", e);
                return None;
            }
        };

        if !(reply.http_ok && reply.is_success) {
            tracing::warn!("Admin login rejected by backend");
            return None;
        }

        Some(BackendAuth {
            basic_auth: BASE64_STANDARD.encode(credentials),
            user_key: reply.user_key?,
            client_key: None,
        })
    }

    /// POST with admin credentials, returning status and body whatever the outcome
    pub async fn post_as_admin<B: Serialize + ?Sized>(
        &self,
        admin: &BackendAuth,
        path: &str,
        body: &B,
        operation: &str,
    ) -> Result<(bool, Value), BackendError> {
        let request = self
            .backend
            .authorized(Method::POST, path, admin)
            .json(body);
        let response = self.backend.send_raw(request, None, operation).await?;
        Ok((response.status.is_success(), response.body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_login_reply_prefers_cookie_user_key() {
        let reply = LoginReply::from_response(
            true,
            &["UserKey=from%20cookie; Path=/".to_string()],
            &json!({"isSuccess": true, "data": {"userKey": "from body", "clientId": 2, "clientKey": "ck"}}),
        );
        assert_eq!(reply.user_key.as_deref(), Some("from cookie"));
        assert_eq!(reply.client_id.as_deref(), Some("2"));
        assert_eq!(reply.client_key.as_deref(), Some("ck"));
        assert!(reply.is_success);
    }

    #[test]
    fn test_login_reply_falls_back_to_body_user_key() {
        let reply = LoginReply::from_response(
            true,
            &[],
            &json!({"isSuccess": false, "message": "Locked", "data": {"userKey": "uk"}}),
        );
        assert_eq!(reply.user_key.as_deref(), Some("uk"));
        assert!(!reply.is_success);
        assert_eq!(reply.message.as_deref(), Some("Locked"));
        assert!(reply.client_id.is_none());
    }
}
