//! Review Model

use super::serde_helpers;
use super::UserPublic;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Review ID type
pub type ReviewId = RecordId;

/// Product review, one per (product, user)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<ReviewId>,
    #[serde(with = "serde_helpers::record_id")]
    pub product: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Average of the given ratings, 0 when there are none
    pub fn average_rating(ratings: impl Iterator<Item = u8>) -> f64 {
        let (sum, count) = ratings.fold((0u32, 0u32), |(s, c), r| (s + u32::from(r), c + 1));
        if count == 0 {
            0.0
        } else {
            f64::from(sum) / f64::from(count)
        }
    }
}

/// Create review payload
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewCreate {
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

/// Review payload with the author embedded
#[derive(Debug, Clone, Serialize)]
pub struct ReviewView {
    #[serde(with = "serde_helpers::option_record_id")]
    pub id: Option<ReviewId>,
    pub user: UserPublic,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl ReviewView {
    pub fn new(review: Review, user: UserPublic) -> Self {
        Self {
            id: review.id,
            user,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_rating_empty_is_zero() {
        assert_eq!(Review::average_rating([].into_iter()), 0.0);
    }

    #[test]
    fn average_rating_mixed() {
        let avg = Review::average_rating([5u8, 4, 3].into_iter());
        assert!((avg - 4.0).abs() < f64::EPSILON);
    }
}
