//! Review Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Review;
use chrono::Utc;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "review";

#[derive(Clone)]
pub struct ReviewRepository {
    base: BaseRepository,
}

impl ReviewRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All reviews, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<Review>> {
        let reviews: Vec<Review> = self
            .base
            .db()
            .query("SELECT * FROM review ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(reviews)
    }

    /// Reviews for one product, newest first
    pub async fn find_by_product(&self, product: &RecordId) -> RepoResult<Vec<Review>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM review WHERE product = $product ORDER BY created_at DESC")
            .bind(("product", product.to_string()))
            .await?;
        let reviews: Vec<Review> = result.take(0)?;
        Ok(reviews)
    }

    pub async fn find_by_product_and_user(
        &self,
        product: &RecordId,
        user: &RecordId,
    ) -> RepoResult<Option<Review>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM review WHERE product = $product AND user = $user LIMIT 1")
            .bind(("product", product.to_string()))
            .bind(("user", user.to_string()))
            .await?;
        let reviews: Vec<Review> = result.take(0)?;
        Ok(reviews.into_iter().next())
    }

    /// Create a review; a user may review a product only once
    pub async fn create(
        &self,
        product: RecordId,
        user: RecordId,
        rating: u8,
        comment: String,
    ) -> RepoResult<Review> {
        if !(1..=5).contains(&rating) {
            return Err(RepoError::Validation(
                "Rating must be between 1 and 5".to_string(),
            ));
        }
        if self.find_by_product_and_user(&product, &user).await?.is_some() {
            return Err(RepoError::Validation(
                "You already reviewed this product".to_string(),
            ));
        }

        let review = Review {
            id: None,
            product,
            user,
            rating,
            comment,
            created_at: Utc::now(),
        };

        let created: Option<Review> = self.base.db().create(TABLE).content(review).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create review".to_string()))
    }
}
