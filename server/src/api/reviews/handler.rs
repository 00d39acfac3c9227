//! Review API Handlers

use axum::{Json, extract::State};
use serde::Serialize;

use crate::api::ensure_admin;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{ReviewView, UserPublic};
use crate::db::repository::{ReviewRepository, UserRepository};
use crate::utils::error::AppResult;

/// Moderation row: the review plus which product it belongs to
#[derive(Debug, Serialize)]
pub struct ModerationEntry {
    pub product: String,
    #[serde(flatten)]
    pub review: ReviewView,
}

/// GET /api/reviews/all - every review across the catalog (admin)
pub async fn list_all(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<Vec<ModerationEntry>>> {
    ensure_admin(&current)?;

    let reviews = ReviewRepository::new(state.db.clone()).find_all().await?;
    let users = UserRepository::new(state.db.clone());

    let mut entries = Vec::with_capacity(reviews.len());
    for review in reviews {
        if let Some(user) = users.find_by_id(&review.user).await? {
            entries.push(ModerationEntry {
                product: review.product.to_string(),
                review: ReviewView::new(review, UserPublic::from(user)),
            });
        }
    }
    Ok(Json(entries))
}
