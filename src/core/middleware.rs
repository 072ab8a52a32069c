use crate::features::auth::session::SessionCodec;
use crate::shared::constants::{HOME_PAGE, LOGIN_PAGE, PUBLIC_PAGES};
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use base64::prelude::*;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

/// Request ID generator using UUID v7 (time-ordered)
#[derive(Clone, Copy)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Custom MakeSpan that includes request_id in the tracing span
#[derive(Clone, Debug)]
pub struct MakeSpanWithRequestId;

impl<B> tower_http::trace::MakeSpan<B> for MakeSpanWithRequestId {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> Span {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    }
}

pub fn cors_layer(allowed_origins: Vec<String>) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    // If origins list contains "*", allow any origin
    if allowed_origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(AllowOrigin::list(origins))
    }
}

pub fn basic_auth_middleware(
    valid_credentials: Arc<String>,
) -> impl Fn(
    Request,
    Next,
)
    -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, Response>> + Send>>
       + Clone {
    move |req: Request, next: Next| {
        let credentials = valid_credentials.clone();
        Box::pin(async move {
            let auth_header = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|header| header.to_str().ok());

            if let Some(auth_header) = auth_header {
                if let Some(encoded) = auth_header.strip_prefix("Basic ") {
                    if let Ok(decoded) = BASE64_STANDARD.decode(encoded) {
                        if let Ok(creds) = String::from_utf8(decoded) {
                            if creds == *credentials {
                                return Ok(next.run(req).await);
                            }
                        }
                    }
                }
            }

            let mut response = Response::new(Body::from("Unauthorized"));
            *response.status_mut() = StatusCode::UNAUTHORIZED;
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"Swagger UI\""),
            );

            Err(response)
        })
    }
}

/// Paths that never redirect; JSON endpoints answer 401 on their own
fn bypasses_guard(path: &str) -> bool {
    path.starts_with("/api/")
        || path == "/api"
        || path.starts_with("/static/")
        || path == "/health"
        || path.starts_with("/swagger-ui")
        || path.starts_with("/api-docs")
}

/// Where a page request must be sent instead, if anywhere
pub fn guard_redirect(path: &str, signed_in: bool) -> Option<String> {
    let public = PUBLIC_PAGES.contains(&path);

    if !signed_in && !public {
        return Some(format!("{}?next={}", LOGIN_PAGE, urlencoding::encode(path)));
    }

    if signed_in && public && !path.starts_with("/confirm-account") {
        return Some(HOME_PAGE.to_string());
    }

    None
}

/// Decode the session cookie into request extensions and apply the page guard
pub async fn session_middleware(
    State(codec): State<Arc<SessionCodec>>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let session = codec.read_session(&jar);
    let signed_in = session.is_some();
    if let Some(session) = session {
        req.extensions_mut().insert(session);
    }

    let path = req.uri().path().to_string();
    if bypasses_guard(&path) {
        return next.run(req).await;
    }

    match guard_redirect(&path, signed_in) {
        Some(location) => {
            tracing::debug!("Guard redirect {} -> {}", path, location);
            Redirect::to(&location).into_response()
        }
        None => next.run(req).await,
    }
}
