#[cfg(test)]
use crate::core::config::{BackendConfig, GatewayConfig, SessionConfig};
#[cfg(test)]
use crate::features::auth::session::SessionPayload;
#[cfg(test)]
use crate::modules::backend::{BackendAuth, BackendClient};

#[cfg(test)]
use axum::{extract::Request, middleware::Next, response::Response, Router};
#[cfg(test)]
use std::sync::Arc;
#[cfg(test)]
use std::time::Duration;

/// Secret used to sign cookies in tests
#[cfg(test)]
pub const TEST_SESSION_SECRET: &[u8] = b"test-session-secret-with-32-bytes!!";

/// Serve `router` on an ephemeral local port and return its base URL
#[cfg(test)]
pub async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

#[cfg(test)]
pub fn backend_config(base_url: &str) -> BackendConfig {
    BackendConfig {
        api_url: base_url.to_string(),
        timeout: Duration::from_secs(5),
        default_username: Some("admin@example.com".to_string()),
        default_password: Some("admin-pass".to_string()),
        demo_user_key: "demo-key".to_string(),
        demo_basic_auth: Some("ZGVtbzpkZW1v".to_string()),
    }
}

#[cfg(test)]
pub fn backend_client(base_url: &str) -> Arc<BackendClient> {
    Arc::new(BackendClient::new(&backend_config(base_url)).unwrap())
}

#[cfg(test)]
pub fn session_config() -> SessionConfig {
    SessionConfig {
        secret: TEST_SESSION_SECRET.to_vec(),
        cookie_secure: false,
        max_age: Duration::from_secs(3600),
    }
}

/// Gateway tuning without the production pauses
#[cfg(test)]
pub fn fast_gateway_config() -> GatewayConfig {
    GatewayConfig {
        expense_type_fetch_delay: Duration::ZERO,
        invoice_poll_initial_delay: Duration::ZERO,
        invoice_poll_interval: Duration::from_millis(10),
        invoice_poll_max_attempts: 3,
        ..GatewayConfig::default()
    }
}

#[cfg(test)]
pub fn test_auth() -> BackendAuth {
    BackendAuth {
        basic_auth: "dXNlckBleGFtcGxlLmNvbTpzZWNyZXQ=".to_string(),
        user_key: "user-key".to_string(),
        client_key: Some("client-key".to_string()),
    }
}

#[cfg(test)]
pub fn test_session() -> SessionPayload {
    SessionPayload {
        user_key: "user-key".to_string(),
        basic_auth: "dXNlckBleGFtcGxlLmNvbTpzZWNyZXQ=".to_string(),
        client_id: "2".to_string(),
        client_key: "client-key".to_string(),
        user_name: Some("Test User".to_string()),
        user_email: Some("user@example.com".to_string()),
    }
}

#[cfg(test)]
async fn inject_session_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(test_session());
    next.run(request).await
}

/// Wrap `router` so every request carries [`test_session`]
#[cfg(test)]
pub fn with_session(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_session_middleware))
}
