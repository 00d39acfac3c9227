use crate::auth::JwtConfig;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Purpose |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/storefront | Work directory (database, logs) |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | FRONTEND_URL | http://localhost:5173 | Base URL for gateway callbacks and reset links |
/// | PAYSTACK_SECRET_KEY | (empty) | Gateway API secret |
/// | PAYSTACK_BASE_URL | https://api.paystack.co | Gateway API base |
/// | ADMIN_EMAIL | admin@localhost | Destination for order notices |
/// | DEFAULT_FROM_EMAIL | noreply@localhost | Sender address on outbound mail |
/// | MAIL_API_URL | (unset) | HTTP mail relay; unset means log-only mail |
/// | MAIL_API_KEY | (unset) | Bearer key for the relay |
/// | ADMIN_USERNAME / ADMIN_PASSWORD | (unset) | First-run admin account seed |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/data/storefront HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Work directory holding the database and log files
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Running environment: development | staging | production
    pub environment: String,
    /// Frontend base URL, used for gateway callbacks and reset links
    pub frontend_url: String,
    /// JWT configuration
    pub jwt: JwtConfig,

    // === Payment gateway ===
    pub paystack_secret_key: String,
    pub paystack_base_url: String,

    // === Mail ===
    /// Destination for admin order notices
    pub admin_email: String,
    /// Sender address on outbound mail
    pub default_from_email: String,
    /// HTTP mail relay endpoint; `None` means mail is logged and dropped
    pub mail_api_url: Option<String>,
    pub mail_api_key: Option<String>,

    // === First-run admin seed ===
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults where unset
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/storefront".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
            jwt: JwtConfig::default(),

            paystack_secret_key: std::env::var("PAYSTACK_SECRET_KEY").unwrap_or_default(),
            paystack_base_url: std::env::var("PAYSTACK_BASE_URL")
                .unwrap_or_else(|_| "https://api.paystack.co".into()),

            admin_email: std::env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@localhost".into()),
            default_from_email: std::env::var("DEFAULT_FROM_EMAIL")
                .unwrap_or_else(|_| "noreply@localhost".into()),
            mail_api_url: std::env::var("MAIL_API_URL").ok(),
            mail_api_key: std::env::var("MAIL_API_KEY").ok(),

            admin_username: std::env::var("ADMIN_USERNAME").ok(),
            admin_password: std::env::var("ADMIN_PASSWORD").ok(),
        }
    }

    /// Override work directory and port, typically for tests
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
