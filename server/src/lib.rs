//! Storefront Server - e-commerce backend
//!
//! # Architecture overview
//!
//! - **Database** (`db`): embedded SurrealDB storage with repositories per
//!   table
//! - **Auth** (`auth`): JWT + Argon2 authentication
//! - **Services** (`services`): TTL read cache, payment gateway client,
//!   outbound mail, pending registrations, order lifecycle
//! - **HTTP API** (`api`): RESTful routes and handlers
//!
//! # Module layout
//!
//! ```text
//! server/src/
//! ├── core/          # config, state, server entry
//! ├── auth/          # JWT, extractor, middleware
//! ├── services/      # cache, gateway, mailer, payment, registration
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # models and repositories
//! └── utils/         # errors, logging, slugs
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod services;
pub mod utils;

pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResponse, AppResult};
pub use utils::logger::{init_logger, init_logger_with_file};

/// Load `.env`, make sure the work directory exists and set up logging
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/storefront".into());
    std::fs::create_dir_all(format!("{work_dir}/database"))?;
    std::fs::create_dir_all(format!("{work_dir}/logs"))?;

    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into());
    init_logger_with_file(Some(&log_level), Some(&format!("{work_dir}/logs")));

    Ok(())
}
