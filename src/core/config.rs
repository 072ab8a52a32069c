use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub backend: BackendConfig,
    pub session: SessionConfig,
    pub gateway: GatewayConfig,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
    pub template_dir: String,
}

/// Remote REST API that owns all business data
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub api_url: String,
    pub timeout: Duration,
    /// Admin account used for user lookups and sign-up
    pub default_username: Option<String>,
    pub default_password: Option<String>,
    /// Credentials attached to anonymous demo requests
    pub demo_user_key: String,
    pub demo_basic_auth: Option<String>,
}

#[derive(Clone)]
pub struct SessionConfig {
    pub secret: Vec<u8>,
    pub cookie_secure: bool,
    pub max_age: Duration,
}

// Keep the signing secret out of logs
impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"***")
            .field("cookie_secure", &self.cookie_secure)
            .field("max_age", &self.max_age)
            .finish()
    }
}

/// Tuning for the invoice gateway (request cache, rate limiter, polling)
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub cache_ttl: Duration,
    pub rate_limit_per_minute: usize,
    pub rate_limit_window: Duration,
    pub expense_type_cost_center_limit: usize,
    pub expense_type_fetch_delay: Duration,
    pub invoice_poll_initial_delay: Duration,
    pub invoice_poll_interval: Duration,
    pub invoice_poll_max_attempts: u32,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            backend: BackendConfig::from_env()?,
            session: SessionConfig::from_env()?,
            gateway: GatewayConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
        })
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, String> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| format!("{} must be a valid number", name)),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    // Upload limit (10MB) plus room for multipart framing
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 11 * 1024 * 1024;

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size =
            parse_env("MAX_REQUEST_BODY_SIZE", Self::DEFAULT_MAX_REQUEST_BODY_SIZE)?;

        let template_dir =
            env::var("TEMPLATE_DIR").unwrap_or_else(|_| "templates/pages".to_string());

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
            template_dir,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl BackendConfig {
    const DEFAULT_TIMEOUT_SECS: u64 = 30;

    pub fn from_env() -> Result<Self, String> {
        let api_url = env::var("BACKEND_API_URL")
            .map_err(|_| "BACKEND_API_URL environment variable is required".to_string())?
            .trim_end_matches('/')
            .to_string();

        let timeout_secs = parse_env("BACKEND_TIMEOUT_SECS", Self::DEFAULT_TIMEOUT_SECS)?;

        let default_username = env::var("BACKEND_DEFAULT_USERNAME")
            .ok()
            .filter(|s| !s.is_empty());
        let default_password = env::var("BACKEND_DEFAULT_PASSWORD")
            .ok()
            .filter(|s| !s.is_empty());

        let demo_user_key =
            env::var("DEMO_USER_KEY").unwrap_or_else(|_| "demo_user_key_here".to_string());
        let demo_basic_auth = env::var("DEMO_BASIC_AUTH").ok().filter(|s| !s.is_empty());

        Ok(Self {
            api_url,
            timeout: Duration::from_secs(timeout_secs),
            default_username,
            default_password,
            demo_user_key,
            demo_basic_auth,
        })
    }

    /// Returns admin credentials in "username:password" format if configured
    pub fn admin_credentials(&self) -> Option<String> {
        match (&self.default_username, &self.default_password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl SessionConfig {
    const MIN_SECRET_LEN: usize = 32;
    const DEFAULT_MAX_AGE_SECS: u64 = 7 * 24 * 60 * 60; // 7 days

    pub fn from_env() -> Result<Self, String> {
        let secret = env::var("SESSION_SECRET")
            .map_err(|_| "SESSION_SECRET environment variable is required".to_string())?;
        if secret.len() < Self::MIN_SECRET_LEN {
            return Err(format!(
                "SESSION_SECRET must be at least {} bytes",
                Self::MIN_SECRET_LEN
            ));
        }

        let cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let max_age_secs = parse_env("SESSION_MAX_AGE_SECS", Self::DEFAULT_MAX_AGE_SECS)?;

        Ok(Self {
            secret: secret.into_bytes(),
            cookie_secure,
            max_age: Duration::from_secs(max_age_secs),
        })
    }
}

impl GatewayConfig {
    const DEFAULT_CACHE_TTL_SECS: u64 = 30;
    const DEFAULT_RATE_LIMIT_PER_MINUTE: usize = 8;
    const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;
    const DEFAULT_EXPENSE_TYPE_COST_CENTER_LIMIT: usize = 5;
    const DEFAULT_EXPENSE_TYPE_FETCH_DELAY_MS: u64 = 500;
    const DEFAULT_INVOICE_POLL_INITIAL_DELAY_MS: u64 = 3000;
    const DEFAULT_INVOICE_POLL_INTERVAL_MS: u64 = 2000;
    const DEFAULT_INVOICE_POLL_MAX_ATTEMPTS: u32 = 10;

    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            cache_ttl: Duration::from_secs(parse_env(
                "CACHE_TTL_SECS",
                Self::DEFAULT_CACHE_TTL_SECS,
            )?),
            rate_limit_per_minute: parse_env(
                "RATE_LIMIT_PER_MINUTE",
                Self::DEFAULT_RATE_LIMIT_PER_MINUTE,
            )?,
            rate_limit_window: Duration::from_secs(parse_env(
                "RATE_LIMIT_WINDOW_SECS",
                Self::DEFAULT_RATE_LIMIT_WINDOW_SECS,
            )?),
            expense_type_cost_center_limit: parse_env(
                "EXPENSE_TYPE_COST_CENTER_LIMIT",
                Self::DEFAULT_EXPENSE_TYPE_COST_CENTER_LIMIT,
            )?,
            expense_type_fetch_delay: Duration::from_millis(parse_env(
                "EXPENSE_TYPE_FETCH_DELAY_MS",
                Self::DEFAULT_EXPENSE_TYPE_FETCH_DELAY_MS,
            )?),
            invoice_poll_initial_delay: Duration::from_millis(parse_env(
                "INVOICE_POLL_INITIAL_DELAY_MS",
                Self::DEFAULT_INVOICE_POLL_INITIAL_DELAY_MS,
            )?),
            invoice_poll_interval: Duration::from_millis(parse_env(
                "INVOICE_POLL_INTERVAL_MS",
                Self::DEFAULT_INVOICE_POLL_INTERVAL_MS,
            )?),
            invoice_poll_max_attempts: parse_env(
                "INVOICE_POLL_MAX_ATTEMPTS",
                Self::DEFAULT_INVOICE_POLL_MAX_ATTEMPTS,
            )?,
        })
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(Self::DEFAULT_CACHE_TTL_SECS),
            rate_limit_per_minute: Self::DEFAULT_RATE_LIMIT_PER_MINUTE,
            rate_limit_window: Duration::from_secs(Self::DEFAULT_RATE_LIMIT_WINDOW_SECS),
            expense_type_cost_center_limit: Self::DEFAULT_EXPENSE_TYPE_COST_CENTER_LIMIT,
            expense_type_fetch_delay: Duration::from_millis(
                Self::DEFAULT_EXPENSE_TYPE_FETCH_DELAY_MS,
            ),
            invoice_poll_initial_delay: Duration::from_millis(
                Self::DEFAULT_INVOICE_POLL_INITIAL_DELAY_MS,
            ),
            invoice_poll_interval: Duration::from_millis(Self::DEFAULT_INVOICE_POLL_INTERVAL_MS),
            invoice_poll_max_attempts: Self::DEFAULT_INVOICE_POLL_MAX_ATTEMPTS,
        }
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title =
            env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Invoice Dashboard API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "JSON endpoints of the invoice dashboard".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}
