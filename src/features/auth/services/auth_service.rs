use base64::prelude::*;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::auth::clients::AccountClient;
use crate::features::auth::dtos::{LoginForm, RequestOtpDto, SignupForm, ValidateOtpDto};
use crate::features::auth::session::{PendingSignup, SessionCodec, SessionPayload};
use crate::features::clients::ClientService;
use crate::modules::backend::{BackendAuth, Envelope};
use crate::shared::validation::digits_only;

const ADMIN_UNAVAILABLE: &str = "System error: Could not obtain admin credentials.";
const UNEXPECTED_REPLY: &str = "An unexpected API response was received.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewClientUser<'a> {
    email: &'a str,
    password: &'a str,
    confirm_password: &'a str,
    phone_number: String,
    first_name: &'a str,
    last_name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewClient<'a> {
    name: String,
    timezone_offset: f64,
    is_active: bool,
    user: NewClientUser<'a>,
}

/// Login, sign-up, OTP and session cookies
pub struct AuthService {
    accounts: Arc<AccountClient>,
    clients: Arc<ClientService>,
    codec: Arc<SessionCodec>,
}

impl AuthService {
    pub fn new(
        accounts: Arc<AccountClient>,
        clients: Arc<ClientService>,
        codec: Arc<SessionCodec>,
    ) -> Self {
        Self {
            accounts,
            clients,
            codec,
        }
    }

    pub fn codec(&self) -> &SessionCodec {
        &self.codec
    }

    /// Verify credentials with the backend and build the session to store
    pub async fn login(
        &self,
        form: &LoginForm,
        pending: Option<&PendingSignup>,
    ) -> Result<SessionPayload> {
        form.validate()
            .map_err(|_| AppError::Validation("Invalid fields.".to_string()))?;

        let reply = self
            .accounts
            .login(&form.email, &form.password)
            .await
            .map_err(|e| {
                tracing::error!("Login request failed: {}", e);
                AppError::Internal(e.to_string())
            })?;

        if !reply.http_ok {
            return Err(AppError::Unauthorized(
                "Login failed. Please check your credentials.".to_string(),
            ));
        }

        let (user_key, client_id, client_key) =
            match (reply.is_success, reply.user_key, reply.client_id, reply.client_key) {
                (true, Some(user_key), Some(client_id), Some(client_key)) => {
                    (user_key, client_id, client_key)
                }
                _ => {
                    return Err(AppError::Unauthorized(
                        reply.message.unwrap_or_else(|| "Login failed.".to_string()),
                    ))
                }
            };

        let now = chrono::Utc::now().timestamp_millis();
        let user_name = match pending.and_then(|p| p.full_name_for(&form.email, now)) {
            Some(name) => name,
            None => self.resolve_display_name(&form.email, &client_id).await,
        };

        tracing::info!("User {} signed in for client {}", form.email, client_id);

        Ok(SessionPayload {
            user_key,
            basic_auth: BASE64_STANDARD.encode(format!("{}:{}", form.email, form.password)),
            client_id,
            client_key,
            user_name: Some(user_name),
            user_email: Some(form.email.clone()),
        })
    }

    /// Matching client user, then the sole user, then the client name, then
    /// the local part of the email. Lookup failures are silent.
    async fn resolve_display_name(&self, email: &str, client_id: &str) -> String {
        let fallback = email.split('@').next().unwrap_or(email).to_string();

        let Some(admin) = self.accounts.admin_auth().await else {
            return fallback;
        };

        if let Some(name) = self.name_from_users(&admin, email, client_id).await {
            return name;
        }

        match self.clients.fetch_client(&admin, client_id).await {
            Ok(client) if !client.name.is_empty() && !client.name.contains('@') => client.name,
            Ok(_) => fallback,
            Err(e) => {
                tracing::debug!("Client lookup for display name failed: {}", e);
                fallback
            }
        }
    }

    async fn name_from_users(
        &self,
        admin: &BackendAuth,
        email: &str,
        client_id: &str,
    ) -> Option<String> {
        let users = match self.clients.fetch_users(admin, client_id).await {
            Ok(users) => users,
            Err(e) => {
                tracing::debug!("User lookup for display name failed: {}", e);
                return None;
            }
        };

        users
            .iter()
            .filter(|u| u.matches_email(email))
            .find_map(|u| u.full_name())
            .or_else(|| match users.as_slice() {
                [only] => only.full_name(),
                _ => None,
            })
    }

    /// Create a client and its first user, returning the details to remember
    /// until the first login
    pub async fn signup(&self, form: &SignupForm) -> Result<PendingSignup> {
        if let Err(errors) = form.validate() {
            let mismatch = errors.errors().contains_key("__all__");
            return Err(AppError::Validation(if mismatch {
                "Passwords do not match".to_string()
            } else {
                "Please check all required fields and try again.".to_string()
            }));
        }

        let admin = self
            .accounts
            .admin_auth()
            .await
            .ok_or_else(|| AppError::ExternalServiceError(ADMIN_UNAVAILABLE.to_string()))?;

        let timezone_offset =
            f64::from(chrono::Local::now().offset().local_minus_utc()) / 3600.0;

        let payload = NewClient {
            name: format!("{} {}", form.first_name, form.last_name),
            timezone_offset,
            is_active: true,
            user: NewClientUser {
                email: &form.email,
                password: &form.password,
                confirm_password: &form.confirm_password,
                phone_number: format!(
                    "{}{}",
                    digits_only(&form.country_code),
                    digits_only(&form.phone_number)
                ),
                first_name: &form.first_name,
                last_name: &form.last_name,
            },
        };

        let (ok, body) = self
            .accounts
            .post_as_admin(&admin, "/api/v1/Clients", &payload, "create account")
            .await
            .map_err(|e| {
                tracing::error!("Sign-up request failed: {}", e);
                AppError::ExternalServiceError(
                    "An unexpected error occurred during signup.".to_string(),
                )
            })?;

        if !ok {
            return Err(AppError::ExternalServiceError(
                "Failed to create account. Please try again.".to_string(),
            ));
        }

        let envelope = Envelope::parse(&body);
        if envelope.is_success != Some(true) {
            let message = envelope
                .error_message()
                .unwrap_or_else(|| "Failed to create account.".to_string());
            return Err(AppError::BadRequest(message));
        }

        tracing::info!("Created account for {}", form.email);
        Ok(PendingSignup::new(
            &form.first_name,
            &form.last_name,
            &form.email,
        ))
    }

    pub async fn request_otp(&self, dto: &RequestOtpDto) -> Result<String> {
        self.send_otp("/api/v1/Account/request-otp", dto, "request otp")
            .await
            .map_err(|failure| {
                AppError::BadRequest(
                    failure.unwrap_or_else(|| "Failed to send verification code.".to_string()),
                )
            })?;
        Ok(format!(
            "A verification code has been sent to {}.",
            dto.identifier
        ))
    }

    pub async fn validate_otp(&self, dto: &ValidateOtpDto) -> Result<String> {
        self.send_otp("/api/v1/Account/validate-otp", dto, "validate otp")
            .await
            .map_err(|failure| {
                AppError::BadRequest(
                    failure
                        .unwrap_or_else(|| "Invalid or expired verification code.".to_string()),
                )
            })?;
        Ok("Verification successful.".to_string())
    }

    /// `Err(Some(msg))` carries a message for the user, `Err(None)` means
    /// the caller's default applies
    async fn send_otp<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        operation: &str,
    ) -> std::result::Result<(), Option<String>> {
        let admin = self
            .accounts
            .admin_auth()
            .await
            .ok_or_else(|| Some(ADMIN_UNAVAILABLE.to_string()))?;

        let (ok, reply) = self
            .accounts
            .post_as_admin(&admin, path, body, operation)
            .await
            .map_err(|e| {
                tracing::error!("OTP request failed: {}", e);
                Some(UNEXPECTED_REPLY.to_string())
            })?;

        if !reply.is_object() && reply != Value::Null {
            return Err(Some(UNEXPECTED_REPLY.to_string()));
        }

        let envelope = Envelope::parse(&reply);
        if !ok || !envelope.succeeded() {
            return Err(envelope.message.filter(|m| !m.is_empty()));
        }
        Ok(())
    }
}
