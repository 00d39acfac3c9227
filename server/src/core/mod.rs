//! Core
//!
//! Configuration, shared server state and the HTTP server entry point.

pub mod config;
pub mod server;
pub mod state;

pub use config::Config;
pub use server::Server;
pub use state::ServerState;
