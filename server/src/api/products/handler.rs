//! Product API Handlers
//!
//! Catalog reads are cached per (category, search, page) for listings and
//! per product for detail/related payloads. Any product or review write
//! drops the affected keys.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use surrealdb::RecordId;

use crate::api::{ensure_admin, load_user, parse_record_id};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{
    Product, ProductCreate, ProductDetail, ProductUpdate, Review, ReviewCreate, ReviewView,
    UserPublic,
};
use crate::db::repository::{CategoryRepository, ProductRepository, ReviewRepository, UserRepository};
use crate::services::cache::{PRODUCT_DETAIL_TTL, PRODUCT_LIST_TTL, RELATED_PRODUCTS_TTL, keys};
use crate::utils::error::{AppError, AppResult};

const PAGE_SIZE: usize = 12;

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    /// Category slug filter
    pub category: Option<String>,
    /// Case-insensitive name/description search
    pub search: Option<String>,
    pub page: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ProductPage {
    pub count: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub results: Vec<Product>,
}

fn invalidate_product(state: &ServerState, id: &str) {
    state.cache.delete_pattern("products:*");
    state.cache.delete(&keys::product_detail(id));
    state.cache.delete(&keys::related_products(id));
}

fn invalidate_all_products(state: &ServerState) {
    state.cache.delete_pattern("products:*");
    state.cache.delete_pattern("product:*");
}

fn to_value<T: Serialize>(payload: &T) -> AppResult<Value> {
    serde_json::to_value(payload)
        .map_err(|e| AppError::internal(format!("Serialization failed: {e}")))
}

/// Embed review authors; reviews whose author vanished are skipped
async fn review_views(state: &ServerState, reviews: Vec<Review>) -> AppResult<Vec<ReviewView>> {
    let users = UserRepository::new(state.db.clone());
    let mut views = Vec::with_capacity(reviews.len());
    for review in reviews {
        if let Some(user) = users.find_by_id(&review.user).await? {
            views.push(ReviewView::new(review, UserPublic::from(user)));
        }
    }
    Ok(views)
}

/// GET /api/products - active products, filtered and paginated (cached)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ProductListQuery>,
) -> AppResult<Json<Value>> {
    let page = query.page.unwrap_or(1).max(1);
    let key = keys::product_list(query.category.as_deref(), query.search.as_deref(), page);
    if let Some(cached) = state.cache.get(&key) {
        return Ok(Json(cached));
    }

    // An unknown category slug yields an empty page, not an error
    let category_id: Option<RecordId> = match &query.category {
        Some(slug) => {
            let categories = CategoryRepository::new(state.db.clone());
            match categories.find_by_slug(slug).await? {
                Some(category) => category.id,
                None => {
                    let payload = to_value(&ProductPage {
                        count: 0,
                        page,
                        page_size: PAGE_SIZE,
                        total_pages: 1,
                        results: Vec::new(),
                    })?;
                    state.cache.set(key, payload.clone(), PRODUCT_LIST_TTL);
                    return Ok(Json(payload));
                }
            }
        }
        None => None,
    };

    let repo = ProductRepository::new(state.db.clone());
    let products = repo
        .find_active(category_id, query.search.as_deref())
        .await?;

    let count = products.len();
    let total_pages = count.div_ceil(PAGE_SIZE).max(1);
    let results: Vec<Product> = products
        .into_iter()
        .skip((page - 1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .collect();

    let payload = to_value(&ProductPage {
        count,
        page,
        page_size: PAGE_SIZE,
        total_pages,
        results,
    })?;
    state.cache.set(key, payload.clone(), PRODUCT_LIST_TTL);
    Ok(Json(payload))
}

/// GET /api/products/:id - product detail with category, reviews and
/// average rating (cached)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let key = keys::product_detail(&id);
    if let Some(cached) = state.cache.get(&key) {
        return Ok(Json(cached));
    }

    let record_id = parse_record_id("product", &id)?;
    let repo = ProductRepository::new(state.db.clone());
    let product = repo
        .find_by_id(&record_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {id} not found")))?;

    let category = match &product.category {
        Some(category_id) => {
            CategoryRepository::new(state.db.clone())
                .find_by_id(category_id)
                .await?
        }
        None => None,
    };

    let reviews = ReviewRepository::new(state.db.clone())
        .find_by_product(&record_id)
        .await?;
    let reviews = review_views(&state, reviews).await?;

    let payload = to_value(&ProductDetail::new(product, category, reviews))?;
    state.cache.set(key, payload.clone(), PRODUCT_DETAIL_TTL);
    Ok(Json(payload))
}

/// GET /api/products/:id/related - other products in the same category
/// (cached)
pub async fn related(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let key = keys::related_products(&id);
    if let Some(cached) = state.cache.get(&key) {
        return Ok(Json(cached));
    }

    let record_id = parse_record_id("product", &id)?;
    let repo = ProductRepository::new(state.db.clone());
    let product = repo
        .find_by_id(&record_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {id} not found")))?;
    let related = repo.find_related(&product).await?;

    let payload = to_value(&related)?;
    state.cache.set(key, payload.clone(), RELATED_PRODUCTS_TTL);
    Ok(Json(payload))
}

/// POST /api/products - create a product (admin)
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<Product>> {
    ensure_admin(&current)?;

    let category = match &payload.category {
        Some(raw) => Some(parse_record_id("category", raw)?),
        None => None,
    };

    let repo = ProductRepository::new(state.db.clone());
    let product = repo.create(payload, category).await?;
    invalidate_all_products(&state);
    Ok(Json(product))
}

/// PUT|PATCH /api/products/:id - update a product (admin)
pub async fn update(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    ensure_admin(&current)?;

    let record_id = parse_record_id("product", &id)?;
    let category = match &payload.category {
        Some(raw) => Some(Some(parse_record_id("category", raw)?)),
        None => None,
    };

    let repo = ProductRepository::new(state.db.clone());
    let product = repo.update(&record_id, payload, category).await?;
    invalidate_product(&state, &id);
    Ok(Json(product))
}

/// DELETE /api/products/:id - delete a product (admin)
pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    ensure_admin(&current)?;

    let record_id = parse_record_id("product", &id)?;
    let repo = ProductRepository::new(state.db.clone());
    let deleted = repo.delete(&record_id).await?;
    if deleted {
        invalidate_product(&state, &id);
    }
    Ok(Json(deleted))
}

/// GET /api/products/:id/reviews-list - reviews for a product
pub async fn list_reviews(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<ReviewView>>> {
    let record_id = parse_record_id("product", &id)?;
    let reviews = ReviewRepository::new(state.db.clone())
        .find_by_product(&record_id)
        .await?;
    let views = review_views(&state, reviews).await?;
    Ok(Json(views))
}

/// POST /api/products/:id/reviews - review a product (one per user)
pub async fn create_review(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<ReviewCreate>,
) -> AppResult<Json<ReviewView>> {
    let record_id = parse_record_id("product", &id)?;
    let repo = ProductRepository::new(state.db.clone());
    repo.find_by_id(&record_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {id} not found")))?;

    let user = load_user(&state, &current).await?;
    let user_id = user
        .id
        .clone()
        .ok_or_else(|| AppError::database("User record has no id"))?;

    let review = ReviewRepository::new(state.db.clone())
        .create(record_id, user_id, payload.rating, payload.comment)
        .await?;

    // The detail payload embeds reviews and the average rating
    state.cache.delete(&keys::product_detail(&id));

    Ok(Json(ReviewView::new(review, UserPublic::from(user))))
}
