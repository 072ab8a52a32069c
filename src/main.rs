mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::middleware;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::features::api_keys::{routes as api_keys_routes, ApiKeyService};
use crate::features::auth::{routes as auth_routes, AccountClient, AuthService, SessionCodec};
use crate::features::clients::{routes as clients_routes, ClientService};
use crate::features::cost_centers::{routes as cost_centers_routes, CostCenterService};
use crate::features::dashboard::{routes as dashboard_routes, DashboardService};
use crate::features::demo_requests::{routes as demo_requests_routes, DemoRequestService};
use crate::features::expense_types::{routes as expense_types_routes, ExpenseTypeService};
use crate::features::invoices::{routes as invoices_routes, InvoiceService};
use crate::features::projects::{routes as projects_routes, ProjectService};
use crate::modules::backend::BackendClient;
use crate::shared::templates::init_templates;
use axum::extract::DefaultBodyLimit;
use axum::{middleware::from_fn, middleware::from_fn_with_state, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "Configuration loaded (workers={}, backend={})",
        worker_threads,
        config.backend.api_url
    );

    let template_count = init_templates(&config.app.template_dir);
    tracing::info!(
        "Loaded {} templates from {}",
        template_count,
        config.app.template_dir
    );

    // Backend API client shared by every feature
    let backend = Arc::new(
        BackendClient::new(&config.backend)
            .map_err(|e| anyhow::anyhow!("Failed to build backend client: {}", e))?,
    );
    tracing::info!("Backend client initialized for {}", backend.base_url());

    // Session signing
    let codec = Arc::new(SessionCodec::new(&config.session));

    // Clients and auth
    let client_service = Arc::new(ClientService::new(Arc::clone(&backend)));
    let account_client = Arc::new(AccountClient::new(Arc::clone(&backend), &config.backend));
    let auth_service = Arc::new(AuthService::new(
        account_client,
        Arc::clone(&client_service),
        Arc::clone(&codec),
    ));
    if config.backend.admin_credentials().is_none() {
        tracing::warn!("No admin account configured; sign-up and OTP will be unavailable");
    }
    tracing::info!("Auth service initialized");

    // Client-scoped entities
    let project_service = Arc::new(ProjectService::new(Arc::clone(&backend)));
    let api_key_service = Arc::new(ApiKeyService::new(Arc::clone(&backend)));
    let cost_center_service = Arc::new(CostCenterService::new(Arc::clone(&backend)));
    let expense_type_service = Arc::new(ExpenseTypeService::new(
        Arc::clone(&backend),
        Arc::clone(&cost_center_service),
    ));
    tracing::info!("Entity services initialized");

    // Invoice gateway (request cache + rate limiter)
    let invoice_service = Arc::new(InvoiceService::new(
        Arc::clone(&backend),
        config.gateway.clone(),
    ));
    tracing::info!(
        "Invoice service initialized (cache ttl {:?}, {} requests per {:?})",
        config.gateway.cache_ttl,
        config.gateway.rate_limit_per_minute,
        config.gateway.rate_limit_window
    );

    let dashboard_service = Arc::new(DashboardService::new(
        Arc::clone(&project_service),
        Arc::clone(&api_key_service),
        Arc::clone(&invoice_service),
        Arc::clone(&cost_center_service),
    ));
    let demo_request_service = Arc::new(DemoRequestService::new(
        Arc::clone(&backend),
        &config.backend,
    ));

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Simple health check endpoint (no session required)
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    // Pages and JSON endpoints; the session middleware decodes the cookie and
    // guards page navigation
    let site_routes = Router::new()
        .merge(demo_requests_routes::routes(demo_request_service))
        .merge(auth_routes::routes(auth_service))
        .merge(dashboard_routes::routes(dashboard_service))
        .merge(invoices_routes::routes(invoice_service))
        .merge(clients_routes::routes(client_service))
        .merge(cost_centers_routes::routes(cost_center_service))
        .merge(expense_types_routes::routes(expense_type_service))
        .merge(projects_routes::routes(project_service))
        .merge(api_keys_routes::routes(api_key_service))
        .layer(from_fn_with_state(
            Arc::clone(&codec),
            middleware::session_middleware,
        ));

    let app = Router::new()
        .merge(swagger)
        .merge(site_routes)
        .merge(health_route)
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    let addr = config.app.server_address();
    let listener = bind_listener(&addr)?;
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Non-blocking TCP listener with address reuse and keepalive probes
fn bind_listener(addr: &str) -> anyhow::Result<tokio::net::TcpListener> {
    use socket2::{Domain, Protocol, Socket, TcpKeepalive, Type};
    use std::time::Duration;

    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address {}: {}", addr, e))?;

    let socket = Socket::new(
        Domain::for_address(socket_addr),
        Type::STREAM,
        Some(Protocol::TCP),
    )?;
    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    let keepalive = TcpKeepalive::new().with_time(Duration::from_secs(60));
    #[cfg(target_os = "linux")]
    let keepalive = keepalive
        .with_interval(Duration::from_secs(10))
        .with_retries(3);
    socket.set_tcp_keepalive(&keepalive)?;

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    Ok(tokio::net::TcpListener::from_std(socket.into())?)
}
