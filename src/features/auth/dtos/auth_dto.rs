use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::features::auth::session::SessionPayload;
use crate::shared::types::ActionState;

/// Login form post
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Invalid email format."))]
    #[serde(default)]
    pub email: String,

    #[validate(length(min = 1, message = "Password cannot be empty."))]
    #[serde(default)]
    pub password: String,
}

/// Query accepted by the login page
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
    pub message: Option<String>,
}

/// Sign-up form post
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "passwords_match", skip_on_field_errors = true))]
pub struct SignupForm {
    #[validate(length(min = 1))]
    #[serde(default)]
    pub first_name: String,

    #[validate(length(min = 1))]
    #[serde(default)]
    pub last_name: String,

    #[validate(email)]
    #[serde(default)]
    pub email: String,

    #[validate(length(min = 1))]
    #[serde(default)]
    pub country_code: String,

    #[validate(length(min = 1))]
    #[serde(default)]
    pub phone_number: String,

    #[validate(length(min = 6))]
    #[serde(default)]
    pub password: String,

    #[validate(length(min = 6))]
    #[serde(default)]
    pub confirm_password: String,
}

fn passwords_match(form: &SignupForm) -> Result<(), ValidationError> {
    if form.password != form.confirm_password {
        return Err(ValidationError::new("password_mismatch")
            .with_message("Passwords do not match".into()));
    }
    Ok(())
}

/// Verification channel understood by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum OtpType {
    #[serde(rename = "Email Confirmation")]
    EmailConfirmation,
    #[serde(rename = "Phone Number Confirmation")]
    PhoneNumberConfirmation,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestOtpDto {
    #[validate(length(min = 1, message = "Identifier is required"))]
    pub identifier: String,
    pub otp_type: OtpType,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidateOtpDto {
    #[validate(length(min = 1, message = "Identifier is required"))]
    pub identifier: String,
    #[validate(length(min = 1, message = "Verification code is required"))]
    pub otp: String,
    pub otp_type: OtpType,
}

/// Current session as exposed to page scripts
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfoDto {
    pub user_key: String,
    pub client_id: String,
    pub user_name: String,
    pub user_email: String,
    pub is_authenticated: bool,
}

impl From<&SessionPayload> for SessionInfoDto {
    fn from(session: &SessionPayload) -> Self {
        Self {
            user_key: session.user_key.clone(),
            client_id: session.client_id.clone(),
            user_name: session.display_name().to_string(),
            user_email: session.user_email.clone().unwrap_or_default(),
            is_authenticated: true,
        }
    }
}

/// Context of the public auth pages
#[derive(Debug, Default, Serialize)]
pub struct AuthPage {
    pub action: Option<ActionState>,
    /// Informational banner, e.g. after sign-up
    pub notice: Option<String>,
    pub next: Option<String>,
    /// Echo of non-secret form fields
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub country_code: String,
    pub phone_number: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_signup() -> SignupForm {
        SignupForm {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            country_code: "+62".to_string(),
            phone_number: "812-345".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        }
    }

    #[test]
    fn test_signup_validation() {
        assert!(valid_signup().validate().is_ok());

        let mut short = valid_signup();
        short.password = "abc".to_string();
        short.confirm_password = "abc".to_string();
        assert!(short.validate().is_err());

        let mut mismatch = valid_signup();
        mismatch.confirm_password = "secret2".to_string();
        let errors = mismatch.validate().unwrap_err();
        assert!(errors.errors().contains_key("__all__"));
    }

    #[test]
    fn test_login_form_validation() {
        let form = LoginForm {
            email: "not-an-email".to_string(),
            password: "x".to_string(),
        };
        assert!(form.validate().is_err());

        let form = LoginForm {
            email: "a@b.co".to_string(),
            password: String::new(),
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_otp_type_wire_names() {
        assert_eq!(
            serde_json::to_value(OtpType::EmailConfirmation).unwrap(),
            "Email Confirmation"
        );
        let parsed: OtpType = serde_json::from_value("Phone Number Confirmation".into()).unwrap();
        assert_eq!(parsed, OtpType::PhoneNumberConfirmation);
    }
}
