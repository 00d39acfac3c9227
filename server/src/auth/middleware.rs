//! Authentication middleware
//!
//! Axum middleware for JWT authentication and the admin-role guard.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::Method;

use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::utils::error::AppError;

/// Anonymous surface: browsing the catalog and the account bootstrap flow.
/// Everything else under `/api/` carries a bearer token.
fn is_public(method: &Method, path: &str) -> bool {
    if path == "/api/health" {
        return true;
    }

    if matches!(*method, Method::GET | Method::HEAD) {
        // Orders hang off the products prefix but are never anonymous
        if path.starts_with("/api/products/orders") {
            return false;
        }
        if path == "/api/categories" || path.starts_with("/api/categories/") {
            return true;
        }
        if path == "/api/products" || path.starts_with("/api/products/") {
            return true;
        }
        if path.starts_with("/api/users/reset-password/") {
            return true;
        }
    }

    if *method == Method::POST {
        return matches!(
            path,
            "/api/users/register"
                | "/api/users/verify"
                | "/api/users/login"
                | "/api/users/forgot-password"
        ) || path.starts_with("/api/users/reset-password/");
    }

    false
}

/// Authentication middleware
///
/// Extracts and validates the JWT from `Authorization: Bearer <token>`,
/// then injects [`CurrentUser`] into the request extensions. CORS preflight,
/// non-API paths and the public surface skip validation.
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    if req.method() == Method::OPTIONS {
        return Ok(next.run(req).await);
    }
    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }
    if is_public(req.method(), path) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            tracing::warn!(uri = %req.uri(), "Request without credentials");
            return Err(AppError::unauthorized());
        }
    };

    match state.jwt_service().validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::try_from(claims)
                .map_err(|e| AppError::invalid_token(format!("Malformed JWT claims: {e}")))?;
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::warn!(uri = %req.uri(), error = %e, "Token validation failed");
            match e {
                crate::auth::JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

/// Admin guard, layered on routes that mutate the catalog or settle orders
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::unauthorized())?;
    if !user.is_admin() {
        tracing::warn!(user = %user.username, uri = %req.uri(), "Admin access denied");
        return Err(AppError::forbidden("Admin access required"));
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_reads_are_public() {
        assert!(is_public(&Method::GET, "/api/categories"));
        assert!(is_public(&Method::GET, "/api/products"));
        assert!(is_public(&Method::GET, "/api/products/product:abc"));
        assert!(is_public(&Method::GET, "/api/products/product:abc/reviews-list"));
        assert!(is_public(&Method::GET, "/api/products/product:abc/related"));
    }

    #[test]
    fn orders_are_never_public() {
        assert!(!is_public(&Method::GET, "/api/products/orders"));
        assert!(!is_public(&Method::GET, "/api/products/orders/order:abc"));
        assert!(!is_public(&Method::POST, "/api/products/orders/create"));
    }

    #[test]
    fn catalog_writes_require_auth() {
        assert!(!is_public(&Method::POST, "/api/products"));
        assert!(!is_public(&Method::PUT, "/api/products/product:abc"));
        assert!(!is_public(&Method::DELETE, "/api/categories/category:abc"));
        assert!(!is_public(&Method::POST, "/api/products/product:abc/reviews"));
    }

    #[test]
    fn account_bootstrap_is_public() {
        assert!(is_public(&Method::POST, "/api/users/register"));
        assert!(is_public(&Method::POST, "/api/users/verify"));
        assert!(is_public(&Method::POST, "/api/users/login"));
        assert!(is_public(&Method::POST, "/api/users/forgot-password"));
        assert!(is_public(&Method::GET, "/api/users/reset-password/sometoken"));
        assert!(is_public(&Method::POST, "/api/users/reset-password/sometoken"));
        assert!(!is_public(&Method::GET, "/api/users/profile"));
    }
}
