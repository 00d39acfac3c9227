//! Product Model

use super::serde_helpers;
use super::{Category, Review};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Product ID type
pub type ProductId = RecordId;

/// Target audience for a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unisex,
    Kids,
}

/// Product model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<ProductId>,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default = "default_true")]
    pub available: bool,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub category: Option<RecordId>,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub color: String,
    #[serde(default = "default_pieces")]
    pub pieces_available: u32,
    #[serde(default)]
    pub size_guide: String,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub image1: Option<String>,
    #[serde(default)]
    pub image2: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

fn default_pieces() -> u32 {
    1
}

/// Create product payload
#[derive(Debug, Clone, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    /// Category id as "category:xxx"
    pub category: Option<String>,
    pub gender: Option<Gender>,
    #[serde(default)]
    pub color: String,
    pub pieces_available: Option<u32>,
    #[serde(default)]
    pub size_guide: String,
    #[serde(default)]
    pub sizes: Vec<String>,
    pub image1: Option<String>,
    pub image2: Option<String>,
}

/// Update product payload
#[derive(Debug, Clone, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub gender: Option<Gender>,
    pub color: Option<String>,
    pub pieces_available: Option<u32>,
    pub size_guide: Option<String>,
    pub sizes: Option<Vec<String>>,
    pub image1: Option<String>,
    pub image2: Option<String>,
    pub available: Option<bool>,
    pub is_active: Option<bool>,
}

/// Product detail payload: embeds the category, reviews and average rating
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub category_detail: Option<Category>,
    pub reviews: Vec<super::ReviewView>,
    pub avg_rating: f64,
}

impl ProductDetail {
    pub fn new(product: Product, category: Option<Category>, reviews: Vec<super::ReviewView>) -> Self {
        let avg_rating = Review::average_rating(reviews.iter().map(|r| r.rating));
        Self {
            product,
            category_detail: category,
            reviews,
            avg_rating,
        }
    }
}
