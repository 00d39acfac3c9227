//! Sales API Handlers
//!
//! Offline sales ledger, admin only. Profit fields are always derived
//! server-side.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::{ensure_admin, parse_record_id};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Sale, SaleCreate, SaleUpdate};
use crate::db::repository::SaleRepository;
use crate::utils::error::{AppError, AppResult};

/// GET /api/sales - all sales (admin)
pub async fn list(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<Vec<Sale>>> {
    ensure_admin(&current)?;
    let repo = SaleRepository::new(state.db.clone());
    Ok(Json(repo.find_all().await?))
}

/// GET /api/sales/:id - single sale (admin)
pub async fn get_by_id(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Sale>> {
    ensure_admin(&current)?;
    let id = parse_record_id("sale", &id)?;
    let repo = SaleRepository::new(state.db.clone());
    let sale = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Sale {id} not found")))?;
    Ok(Json(sale))
}

/// POST /api/sales - record a sale (admin)
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<SaleCreate>,
) -> AppResult<Json<Sale>> {
    ensure_admin(&current)?;
    let created_by = parse_record_id("user", &current.id)?;
    let repo = SaleRepository::new(state.db.clone());
    Ok(Json(repo.create(payload, created_by).await?))
}

/// PUT|PATCH /api/sales/:id - update a sale (admin)
pub async fn update(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<SaleUpdate>,
) -> AppResult<Json<Sale>> {
    ensure_admin(&current)?;
    let id = parse_record_id("sale", &id)?;
    let repo = SaleRepository::new(state.db.clone());
    Ok(Json(repo.update(&id, payload).await?))
}

/// DELETE /api/sales/:id - delete a sale (admin)
pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    ensure_admin(&current)?;
    let id = parse_record_id("sale", &id)?;
    let repo = SaleRepository::new(state.db.clone());
    Ok(Json(repo.delete(&id).await?))
}
