//! Payment API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::api::load_user;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::OrderCreate;
use crate::services::payment::{CheckoutSession, PaymentVerification};
use crate::utils::error::AppResult;

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub reference: String,
}

/// POST /api/payments/initiate - open a gateway checkout session
pub async fn initiate(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<CheckoutSession>> {
    let user = load_user(&state, &current).await?;
    let session = state
        .payment_service()
        .initiate_payment(&user, payload)
        .await?;
    Ok(Json(session))
}

/// GET /api/payments/verify?reference=... - settle a gateway callback
pub async fn verify(
    State(state): State<ServerState>,
    current: CurrentUser,
    Query(query): Query<VerifyQuery>,
) -> AppResult<Json<PaymentVerification>> {
    let user = load_user(&state, &current).await?;
    let verification = state
        .payment_service()
        .verify_payment(&user, &query.reference)
        .await?;
    Ok(Json(verification))
}
