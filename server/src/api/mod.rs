//! API route modules
//!
//! # Structure
//!
//! - [`health`] - liveness probe
//! - [`users`] - registration, login, profile and password reset
//! - [`categories`] - category management
//! - [`products`] - catalog browsing and management
//! - [`reviews`] - review moderation listing
//! - [`orders`] - order listing and lifecycle actions
//! - [`payments`] - gateway checkout and verification
//! - [`sales`] - offline sales ledger

pub mod categories;
pub mod health;
pub mod orders;
pub mod payments;
pub mod products;
pub mod reviews;
pub mod sales;
pub mod users;

use axum::{Router, middleware};
use surrealdb::RecordId;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::auth::{CurrentUser, require_auth};
use crate::core::ServerState;
use crate::db::models::User;
use crate::db::repository::UserRepository;
use crate::utils::error::{AppError, AppResult};

pub use crate::utils::{AppResponse, AppResult as ApiResult};

/// Assemble the full application router
pub fn build_router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(users::router())
        .merge(categories::router())
        .merge(products::router())
        .merge(reviews::router())
        .merge(orders::router())
        .merge(payments::router())
        .merge(sales::router())
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Parse a path segment as a record id, accepting both `table:key` and the
/// bare key
pub(crate) fn parse_record_id(table: &str, raw: &str) -> AppResult<RecordId> {
    if raw.contains(':') {
        raw.parse::<RecordId>()
            .map_err(|_| AppError::validation(format!("Invalid id '{raw}'")))
    } else {
        Ok(RecordId::from((table, raw)))
    }
}

/// Admin-only handler guard
pub(crate) fn ensure_admin(user: &CurrentUser) -> AppResult<()> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::forbidden("Admin access required"))
    }
}

/// Resolve the token's subject to a live user record
pub(crate) async fn load_user(state: &ServerState, current: &CurrentUser) -> AppResult<User> {
    let id = parse_record_id("user", &current.id)?;
    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::unauthorized())?;
    Ok(user)
}
