//! Order API module
//!
//! Orders live under the products prefix but are never public.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/products/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/create", post(handler::create))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/mark-paid", post(handler::mark_paid))
        .route("/{id}/confirm-payment", post(handler::confirm_payment))
        .route("/{id}/reverse-payment", post(handler::reverse_payment))
}
