//! Utility module - shared helpers and types
//!
//! - [`AppError`] / [`AppResult`] - application error type
//! - [`logger`] - tracing setup
//! - [`slug`] - URL slug generation

pub mod error;
pub mod logger;
pub mod slug;

pub use error::{AppError, AppResponse, AppResult};
pub use logger::{init_logger, init_logger_with_file};
