//! Category API Handlers
//!
//! Reads go through the TTL cache; every write drops the category list and
//! all product payloads, since product listings embed their category.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::Value;

use crate::api::{ensure_admin, parse_record_id};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Category, CategoryCreate, CategoryUpdate};
use crate::db::repository::CategoryRepository;
use crate::utils::error::{AppError, AppResult};
use crate::services::cache::{CATEGORY_LIST_TTL, keys};

fn invalidate(state: &ServerState) {
    state.cache.delete(&keys::category_list());
    state.cache.delete_pattern("products:*");
}

/// GET /api/categories - all categories (cached)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Value>> {
    let key = keys::category_list();
    if let Some(cached) = state.cache.get(&key) {
        return Ok(Json(cached));
    }

    let repo = CategoryRepository::new(state.db.clone());
    let categories = repo.find_all().await?;
    let payload = serde_json::to_value(&categories)
        .map_err(|e| AppError::internal(format!("Serialization failed: {e}")))?;

    state.cache.set(key, payload.clone(), CATEGORY_LIST_TTL);
    Ok(Json(payload))
}

/// GET /api/categories/:id - single category
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Category>> {
    let id = parse_record_id("category", &id)?;
    let repo = CategoryRepository::new(state.db.clone());
    let category = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Category {id} not found")))?;
    Ok(Json(category))
}

/// POST /api/categories - create a category (admin)
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<Json<Category>> {
    ensure_admin(&current)?;

    let repo = CategoryRepository::new(state.db.clone());
    let category = repo.create(payload).await?;
    invalidate(&state);
    Ok(Json(category))
}

/// PUT /api/categories/:id - rename a category (admin)
pub async fn update(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<CategoryUpdate>,
) -> AppResult<Json<Category>> {
    ensure_admin(&current)?;

    let id = parse_record_id("category", &id)?;
    let repo = CategoryRepository::new(state.db.clone());
    let category = repo.update(&id, payload).await?;
    invalidate(&state);
    Ok(Json(category))
}

/// DELETE /api/categories/:id - delete a category (admin)
pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    ensure_admin(&current)?;

    let id = parse_record_id("category", &id)?;
    let repo = CategoryRepository::new(state.db.clone());
    let deleted = repo.delete(&id).await?;
    if deleted {
        invalidate(&state);
    }
    Ok(Json(deleted))
}
