use crate::features::auth::handlers;
use crate::features::auth::services::AuthService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Auth pages, logout and the JSON session/OTP endpoints
pub fn routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route(
            "/login",
            get(handlers::login_page).post(handlers::login_submit),
        )
        .route(
            "/create-account",
            get(handlers::signup_page).post(handlers::signup_submit),
        )
        .route("/reset-password", get(handlers::reset_password_page))
        .route("/confirm-account", get(handlers::confirm_account_page))
        .route("/logout", post(handlers::logout))
        .route("/api/auth/session", get(handlers::get_session))
        .route("/api/auth/otp/request", post(handlers::request_otp))
        .route("/api/auth/otp/validate", post(handlers::validate_otp))
        .with_state(service)
}
