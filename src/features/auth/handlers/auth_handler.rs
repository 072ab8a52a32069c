use crate::core::error::Result;
use crate::core::extractor::ValidJson;
use crate::features::auth::dtos::{RequestOtpDto, SessionInfoDto, ValidateOtpDto};
use crate::features::auth::services::AuthService;
use crate::features::auth::session::SessionPayload;
use crate::shared::types::ApiResponse;
use axum::{extract::State, Json};
use std::sync::Arc;

/// Current session details
#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses(
        (status = 200, description = "Signed in", body = ApiResponse<SessionInfoDto>),
        (status = 401, description = "No session")
    ),
    tag = "auth"
)]
pub async fn get_session(session: SessionPayload) -> Result<Json<ApiResponse<SessionInfoDto>>> {
    Ok(Json(ApiResponse::success(
        Some(SessionInfoDto::from(&session)),
        None,
        None,
    )))
}

/// Send a verification code to an email address or phone number
#[utoipa::path(
    post,
    path = "/api/auth/otp/request",
    request_body = RequestOtpDto,
    responses(
        (status = 200, description = "Code sent"),
        (status = 400, description = "Backend refused the request")
    ),
    tag = "auth"
)]
pub async fn request_otp(
    State(service): State<Arc<AuthService>>,
    ValidJson(dto): ValidJson<RequestOtpDto>,
) -> Result<Json<ApiResponse<()>>> {
    let message = service.request_otp(&dto).await?;
    Ok(Json(ApiResponse::success(None, Some(message), None)))
}

/// Check a verification code
#[utoipa::path(
    post,
    path = "/api/auth/otp/validate",
    request_body = ValidateOtpDto,
    responses(
        (status = 200, description = "Code accepted"),
        (status = 400, description = "Invalid or expired code")
    ),
    tag = "auth"
)]
pub async fn validate_otp(
    State(service): State<Arc<AuthService>>,
    ValidJson(dto): ValidJson<ValidateOtpDto>,
) -> Result<Json<ApiResponse<()>>> {
    let message = service.validate_otp(&dto).await?;
    Ok(Json(ApiResponse::success(None, Some(message), None)))
}
