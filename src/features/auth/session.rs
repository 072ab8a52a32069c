//! Signed session cookies.
//!
//! Cookie values are `base64url(json).hex(hmac_sha256(base64url(json)))`.
//! A value whose signature does not verify is treated as if it were absent.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Duration;
use thiserror::Error;
use utoipa::ToSchema;

use crate::core::config::SessionConfig;
use crate::modules::backend::BackendAuth;
use crate::shared::constants::{SESSION_COOKIE, SIGNUP_COOKIE, SIGNUP_COOKIE_MAX_AGE_SECS};
use crate::shared::types::PageUser;

type HmacSha256 = Hmac<Sha256>;

/// Everything needed to call the backend on behalf of a signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    pub user_key: String,
    /// base64 of `email:password`
    pub basic_auth: String,
    pub client_id: String,
    pub client_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
}

impl SessionPayload {
    pub fn auth(&self) -> BackendAuth {
        BackendAuth::from(self)
    }

    pub fn display_name(&self) -> &str {
        self.user_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or("User")
    }
}

impl From<&SessionPayload> for BackendAuth {
    fn from(session: &SessionPayload) -> Self {
        BackendAuth {
            basic_auth: session.basic_auth.clone(),
            user_key: session.user_key.clone(),
            client_key: Some(session.client_key.clone()).filter(|k| !k.is_empty()),
        }
    }
}

impl From<&SessionPayload> for PageUser {
    fn from(session: &SessionPayload) -> Self {
        PageUser {
            name: session.display_name().to_string(),
            email: session.user_email.clone().unwrap_or_default(),
        }
    }
}

/// Name details remembered between sign-up and the first login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSignup {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Unix epoch milliseconds
    pub timestamp: i64,
}

impl PendingSignup {
    pub fn new(first_name: &str, last_name: &str, email: &str) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Full name if this sign-up belongs to `email` and is still recent
    pub fn full_name_for(&self, email: &str, now_millis: i64) -> Option<String> {
        if !self.email.trim().eq_ignore_ascii_case(email.trim()) {
            return None;
        }
        if now_millis - self.timestamp > SIGNUP_COOKIE_MAX_AGE_SECS * 1000 {
            return None;
        }
        let name = format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string();
        Some(name).filter(|n| !n.is_empty())
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Malformed cookie value")]
    Malformed,

    #[error("Cookie signature mismatch")]
    BadSignature,

    #[error("Invalid signing key")]
    InvalidKey,

    #[error("Invalid cookie payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Signs and verifies cookie payloads with the server secret
#[derive(Clone)]
pub struct SessionCodec {
    secret: Vec<u8>,
    cookie_secure: bool,
    max_age: Duration,
}

impl SessionCodec {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            secret: config.secret.clone(),
            cookie_secure: config.cookie_secure,
            max_age: config.max_age,
        }
    }

    fn mac(&self) -> Result<HmacSha256, SessionError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|_| SessionError::InvalidKey)
    }

    pub fn sign<T: Serialize>(&self, value: &T) -> Result<String, SessionError> {
        let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(value)?);
        let mut mac = self.mac()?;
        mac.update(body.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());
        Ok(format!("{}.{}", body, signature))
    }

    pub fn verify<T: DeserializeOwned>(&self, raw: &str) -> Result<T, SessionError> {
        let (body, signature) = raw.rsplit_once('.').ok_or(SessionError::Malformed)?;
        let signature = hex::decode(signature).map_err(|_| SessionError::Malformed)?;

        let mut mac = self.mac()?;
        mac.update(body.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| SessionError::BadSignature)?;

        let json = URL_SAFE_NO_PAD
            .decode(body)
            .map_err(|_| SessionError::Malformed)?;
        Ok(serde_json::from_slice(&json)?)
    }

    /// Session carried by the request, if present and authentic
    pub fn read_session(&self, jar: &CookieJar) -> Option<SessionPayload> {
        let cookie = jar.get(SESSION_COOKIE)?;
        match self.verify(cookie.value()) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!("Ignoring invalid session cookie: {}", e);
                None
            }
        }
    }

    pub fn read_pending_signup(&self, jar: &CookieJar) -> Option<PendingSignup> {
        let cookie = jar.get(SIGNUP_COOKIE)?;
        self.verify(cookie.value()).ok()
    }

    pub fn session_cookie(&self, session: &SessionPayload) -> Result<Cookie<'static>, SessionError> {
        let max_age = i64::try_from(self.max_age.as_secs()).unwrap_or(i64::MAX);
        Ok(Cookie::build((SESSION_COOKIE, self.sign(session)?))
            .http_only(true)
            .secure(self.cookie_secure)
            .path("/")
            .max_age(time::Duration::seconds(max_age))
            .build())
    }

    pub fn pending_signup_cookie(
        &self,
        signup: &PendingSignup,
    ) -> Result<Cookie<'static>, SessionError> {
        Ok(Cookie::build((SIGNUP_COOKIE, self.sign(signup)?))
            .http_only(true)
            .secure(self.cookie_secure)
            .path("/")
            .same_site(SameSite::Strict)
            .max_age(time::Duration::seconds(SIGNUP_COOKIE_MAX_AGE_SECS))
            .build())
    }
}

/// Drop the pending sign-up cookie
pub fn clear_pending_signup(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SIGNUP_COOKIE).path("/"))
}

/// Drop both the session and pending sign-up cookies
pub fn clear_session(jar: CookieJar) -> CookieJar {
    clear_pending_signup(jar.remove(Cookie::build(SESSION_COOKIE).path("/")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{session_config, test_session};

    #[test]
    fn test_session_round_trips_through_signature() {
        let codec = SessionCodec::new(&session_config());
        let signed = codec.sign(&test_session()).unwrap();
        let decoded: SessionPayload = codec.verify(&signed).unwrap();
        assert_eq!(decoded, test_session());
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let codec = SessionCodec::new(&session_config());
        let signed = codec.sign(&test_session()).unwrap();

        let mut forged = test_session();
        forged.client_id = "999".to_string();
        let forged_body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());
        let signature = signed.rsplit_once('.').unwrap().1;

        let result = codec.verify::<SessionPayload>(&format!("{}.{}", forged_body, signature));
        assert!(matches!(result, Err(SessionError::BadSignature)));
    }

    #[test]
    fn test_unsigned_json_is_rejected() {
        let codec = SessionCodec::new(&session_config());
        let raw = serde_json::to_string(&test_session()).unwrap();
        assert!(codec.verify::<SessionPayload>(&raw).is_err());
    }

    #[test]
    fn test_other_secret_cannot_verify() {
        let codec = SessionCodec::new(&session_config());
        let mut other_config = session_config();
        other_config.secret = b"another-secret-that-is-long-enough!".to_vec();
        let other = SessionCodec::new(&other_config);

        let signed = other.sign(&test_session()).unwrap();
        assert!(codec.verify::<SessionPayload>(&signed).is_err());
    }

    #[test]
    fn test_session_cookie_attributes() {
        let codec = SessionCodec::new(&session_config());
        let cookie = codec.session_cookie(&test_session()).unwrap();
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(3600)));
    }

    #[test]
    fn test_pending_signup_expires_after_ten_minutes() {
        let signup = PendingSignup {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            timestamp: 1_000_000,
        };

        assert_eq!(
            signup.full_name_for("ada@example.com", 1_000_000 + 60_000),
            Some("Ada Lovelace".to_string())
        );
        assert!(signup
            .full_name_for("ada@example.com", 1_000_000 + 11 * 60_000)
            .is_none());
        assert!(signup.full_name_for("bob@example.com", 1_000_000).is_none());
    }

    #[test]
    fn test_pending_signup_matches_email_ignoring_case() {
        let signup = PendingSignup {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            timestamp: 1_000_000,
        };

        assert_eq!(
            signup.full_name_for("Ada@Example.COM", 1_000_000),
            Some("Ada Lovelace".to_string())
        );
    }

    #[test]
    fn test_backend_auth_from_session() {
        let auth = test_session().auth();
        assert_eq!(auth.user_key, "user-key");
        assert_eq!(auth.client_key.as_deref(), Some("client-key"));
    }
}
