//! Order API Handlers
//!
//! Customers see and act on their own orders; admins see everything and own
//! the confirm/reverse controls. All lifecycle transitions go through the
//! payment service.

use axum::{
    Json,
    extract::{Path, State},
};
use surrealdb::RecordId;

use crate::api::{ensure_admin, load_user, parse_record_id};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Order, OrderCreate, OrderView, UserPublic};
use crate::db::repository::{OrderRepository, UserRepository};
use crate::utils::error::{AppError, AppResult};

/// Attach the owning user to each order payload
async fn order_views(state: &ServerState, orders: Vec<Order>) -> AppResult<Vec<OrderView>> {
    let users = UserRepository::new(state.db.clone());
    let mut views = Vec::with_capacity(orders.len());
    for order in orders {
        if let Some(user) = users.find_by_id(&order.user).await? {
            views.push(OrderView::new(order, UserPublic::from(user)));
        }
    }
    Ok(views)
}

async fn order_view(state: &ServerState, order: Order) -> AppResult<OrderView> {
    let user = UserRepository::new(state.db.clone())
        .find_by_id(&order.user)
        .await?
        .ok_or_else(|| AppError::database("Order owner no longer exists"))?;
    Ok(OrderView::new(order, UserPublic::from(user)))
}

async fn find_order(state: &ServerState, id: &RecordId) -> AppResult<Order> {
    OrderRepository::new(state.db.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {id} not found")))
}

/// GET /api/products/orders - own orders, or all orders for admins
pub async fn list(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<Vec<OrderView>>> {
    let repo = OrderRepository::new(state.db.clone());
    let orders = if current.is_admin() {
        repo.find_all().await?
    } else {
        let user_id = parse_record_id("user", &current.id)?;
        repo.find_by_user(&user_id).await?
    };
    Ok(Json(order_views(&state, orders).await?))
}

/// POST /api/products/orders/create - record a manual-transfer order
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<OrderView>> {
    let user = load_user(&state, &current).await?;
    let order = state.payment_service().create_order(&user, payload).await?;
    Ok(Json(OrderView::new(order, UserPublic::from(user))))
}

/// GET /api/products/orders/:id - one order, owner or admin
pub async fn get_by_id(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<OrderView>> {
    let order_id = parse_record_id("order", &id)?;
    let order = find_order(&state, &order_id).await?;

    if !current.is_admin() {
        let user_id = parse_record_id("user", &current.id)?;
        if order.user != user_id {
            return Err(AppError::forbidden("You do not own this order"));
        }
    }

    Ok(Json(order_view(&state, order).await?))
}

/// POST /api/products/orders/:id/mark-paid - customer signals a completed
/// transfer; owner or admin
pub async fn mark_paid(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<OrderView>> {
    let order_id = parse_record_id("order", &id)?;
    let user = load_user(&state, &current).await?;
    let order = state.payment_service().mark_paid(&user, &order_id).await?;
    Ok(Json(order_view(&state, order).await?))
}

/// POST /api/products/orders/:id/confirm-payment - admin confirms payment
pub async fn confirm_payment(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<OrderView>> {
    ensure_admin(&current)?;

    let order_id = parse_record_id("order", &id)?;
    let order = find_order(&state, &order_id).await?;
    let customer = UserRepository::new(state.db.clone())
        .find_by_id(&order.user)
        .await?
        .ok_or_else(|| AppError::database("Order owner no longer exists"))?;

    let order = state
        .payment_service()
        .confirm_payment(&order_id, &customer)
        .await?;
    Ok(Json(OrderView::new(order, UserPublic::from(customer))))
}

/// POST /api/products/orders/:id/reverse-payment - admin walks back a
/// confirmation
pub async fn reverse_payment(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<OrderView>> {
    ensure_admin(&current)?;

    let order_id = parse_record_id("order", &id)?;
    let order = state.payment_service().reverse_payment(&order_id).await?;
    Ok(Json(order_view(&state, order).await?))
}
