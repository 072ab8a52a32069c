use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{AuthPage, LoginForm, LoginQuery, SignupForm};
use crate::features::auth::services::AuthService;
use crate::features::auth::session::{clear_pending_signup, clear_session};
use crate::shared::constants::{HOME_PAGE, LOGIN_PAGE};
use crate::shared::templates::render_page;
use crate::shared::types::ActionState;

const SIGNUP_SUCCESS: &str = "Account created successfully! Please log in.";

pub async fn login_page(Query(query): Query<LoginQuery>) -> Result<Html<String>> {
    let page = AuthPage {
        notice: query.message,
        next: query.next,
        ..Default::default()
    };
    Ok(render_page("login.jinja", page)?)
}

pub async fn login_submit(
    State(service): State<Arc<AuthService>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let pending = service.codec().read_pending_signup(&jar);

    match service.login(&form, pending.as_ref()).await {
        Ok(session) => {
            let cookie = service
                .codec()
                .session_cookie(&session)
                .map_err(|e| AppError::Internal(e.to_string()))?;
            let jar = clear_pending_signup(jar).add(cookie);
            Ok((jar, Redirect::to(HOME_PAGE)).into_response())
        }
        Err(e) => {
            tracing::debug!("Login rejected: {}", e);
            let page = AuthPage {
                action: Some(ActionState::failed(e.user_message())),
                email: form.email,
                ..Default::default()
            };
            Ok(render_page("login.jinja", page)?.into_response())
        }
    }
}

pub async fn signup_page() -> Result<Html<String>> {
    Ok(render_page("signup.jinja", AuthPage::default())?)
}

pub async fn signup_submit(
    State(service): State<Arc<AuthService>>,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> Result<Response> {
    match service.signup(&form).await {
        Ok(pending) => {
            let cookie = service
                .codec()
                .pending_signup_cookie(&pending)
                .map_err(|e| AppError::Internal(e.to_string()))?;
            let location = format!(
                "{}?message={}",
                LOGIN_PAGE,
                urlencoding::encode(SIGNUP_SUCCESS)
            );
            Ok((jar.add(cookie), Redirect::to(&location)).into_response())
        }
        Err(e) => {
            tracing::debug!("Sign-up rejected: {}", e);
            let page = AuthPage {
                action: Some(ActionState::failed(e.user_message())),
                email: form.email,
                first_name: form.first_name,
                last_name: form.last_name,
                country_code: form.country_code,
                phone_number: form.phone_number,
                ..Default::default()
            };
            Ok(render_page("signup.jinja", page)?.into_response())
        }
    }
}

pub async fn reset_password_page() -> Result<Html<String>> {
    Ok(render_page("reset_password.jinja", AuthPage::default())?)
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfirmQuery {
    pub identifier: Option<String>,
    #[serde(rename = "type")]
    pub channel: Option<String>,
}

#[derive(Debug, Serialize)]
struct ConfirmPage {
    identifier: String,
    otp_type: &'static str,
}

pub async fn confirm_account_page(Query(query): Query<ConfirmQuery>) -> Result<Html<String>> {
    let otp_type = match query.channel.as_deref() {
        Some("phone") => "Phone Number Confirmation",
        _ => "Email Confirmation",
    };
    let page = ConfirmPage {
        identifier: query.identifier.unwrap_or_default(),
        otp_type,
    };
    Ok(render_page("confirm_account.jinja", page)?)
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (clear_session(jar), Redirect::to(LOGIN_PAGE))
}

#[cfg(test)]
mod tests {
    use crate::features::auth::routes;
    use crate::features::auth::clients::AccountClient;
    use crate::features::auth::services::AuthService;
    use crate::features::auth::session::{SessionCodec, SessionPayload};
    use crate::features::clients::ClientService;
    use crate::shared::constants::{SESSION_COOKIE, SIGNUP_COOKIE};
    use crate::shared::test_helpers::{backend_client, backend_config, session_config, spawn_backend};
    use axum::{
        http::{header, HeaderValue, StatusCode},
        routing::post,
        Json, Router,
    };
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use std::sync::Arc;

    async fn server() -> (TestServer, Arc<SessionCodec>) {
        let base_url = spawn_backend(Router::new().route(
            "/api/v1/Account/Login",
            post(|Json(body): Json<Value>| async move {
                if body["password"] == "secret" {
                    Json(json!({
                        "isSuccess": true,
                        "data": {"userKey": "uk", "clientId": "3", "clientKey": "ck"}
                    }))
                } else {
                    Json(json!({"isSuccess": false}))
                }
            }),
        ))
        .await;

        let backend = backend_client(&base_url);
        let codec = Arc::new(SessionCodec::new(&session_config()));
        let service = Arc::new(AuthService::new(
            Arc::new(AccountClient::new(backend.clone(), &backend_config(&base_url))),
            Arc::new(ClientService::new(backend)),
            codec.clone(),
        ));
        (TestServer::new(routes::routes(service)).unwrap(), codec)
    }

    #[tokio::test]
    async fn test_successful_login_sets_signed_cookie_and_redirects() {
        let (server, codec) = server().await;

        let response = server
            .post("/login")
            .form(&[("email", "user@example.com"), ("password", "secret")])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/dashboard");

        let cookie = response.cookie(SESSION_COOKIE);
        let session: SessionPayload = codec.verify(cookie.value()).unwrap();
        assert_eq!(session.client_id, "3");
        assert_eq!(session.user_key, "uk");
    }

    #[tokio::test]
    async fn test_rejected_login_renders_message() {
        let (server, _) = server().await;

        let response = server
            .post("/login")
            .form(&[("email", "user@example.com"), ("password", "nope")])
            .await;

        response.assert_status_ok();
        assert!(response.text().contains("Login failed."));
    }

    #[tokio::test]
    async fn test_logout_clears_cookies() {
        let (server, _) = server().await;

        let response = server
            .post("/logout")
            .add_header(
                header::COOKIE,
                HeaderValue::from_static("session_data=abc; temp_user_signup=def"),
            )
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/login");
        let removed = response.cookie(SESSION_COOKIE);
        assert_eq!(removed.value(), "");
        assert_eq!(response.cookie(SIGNUP_COOKIE).value(), "");
    }
}
