//! User API module

mod handler;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/users", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // Account bootstrap (public)
        .route("/register", post(handler::register))
        .route("/verify", post(handler::verify))
        .route("/login", post(handler::login))
        .route("/forgot-password", post(handler::forgot_password))
        .route(
            "/reset-password/{token}",
            get(handler::reset_password_check).post(handler::reset_password),
        )
        // Own profile
        .route(
            "/profile",
            get(handler::profile)
                .put(handler::update_profile)
                .patch(handler::update_profile)
                .delete(handler::delete_account),
        )
        // Administration
        .route("/all-users", get(handler::list_users))
        .route("/{id}/delete", delete(handler::delete_user))
}
