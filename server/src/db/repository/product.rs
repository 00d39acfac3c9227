//! Product Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use crate::utils::slug::unique_slug;
use chrono::Utc;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "product";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Active products, optionally filtered by category and a name/description
    /// search term, newest first
    pub async fn find_active(
        &self,
        category: Option<RecordId>,
        search: Option<&str>,
    ) -> RepoResult<Vec<Product>> {
        let mut sql = String::from("SELECT * FROM product WHERE is_active = true");
        if category.is_some() {
            sql.push_str(" AND category = $category");
        }
        if search.is_some() {
            sql.push_str(
                " AND (string::contains(string::lowercase(name), $search) \
                 OR string::contains(string::lowercase(description), $search))",
            );
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query = self.base.db().query(sql);
        if let Some(category) = category {
            // Record links are stored as "table:id" strings
            query = query.bind(("category", category.to_string()));
        }
        if let Some(search) = search {
            query = query.bind(("search", search.to_lowercase()));
        }

        let products: Vec<Product> = query.await?.take(0)?;
        Ok(products)
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Product>> {
        let product: Option<Product> = self.base.db().select(id.clone()).await?;
        Ok(product)
    }

    pub async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Product>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM product WHERE slug = $slug LIMIT 1")
            .bind(("slug", slug.to_string()))
            .await?;
        let products: Vec<Product> = result.take(0)?;
        Ok(products.into_iter().next())
    }

    /// Up to ten other active products in the same category
    pub async fn find_related(&self, product: &Product) -> RepoResult<Vec<Product>> {
        let Some(category) = product.category.clone() else {
            return Ok(Vec::new());
        };
        let Some(id) = product.id.clone() else {
            return Ok(Vec::new());
        };

        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM product WHERE is_active = true AND category = $category \
                 AND id != $id LIMIT 10",
            )
            .bind(("category", category.to_string()))
            .bind(("id", id))
            .await?;
        let products: Vec<Product> = result.take(0)?;
        Ok(products)
    }

    /// Create a product with a unique generated slug; new products are always
    /// available and active
    pub async fn create(&self, data: ProductCreate, category: Option<RecordId>) -> RepoResult<Product> {
        let slug = unique_slug(&data.name, |candidate| async move {
            self.find_by_slug(&candidate).await.map(|p| p.is_some())
        })
        .await?;

        let now = Utc::now();
        let product = Product {
            id: None,
            name: data.name,
            slug,
            description: data.description,
            price: data.price,
            available: true,
            category,
            gender: data.gender.unwrap_or_default(),
            color: data.color,
            pieces_available: data.pieces_available.unwrap_or(1),
            size_guide: data.size_guide,
            sizes: data.sizes,
            image1: data.image1,
            image2: data.image2,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let created: Option<Product> = self.base.db().create(TABLE).content(product).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Partial update; availability and active status are preserved unless
    /// explicitly changed
    pub async fn update(
        &self,
        id: &RecordId,
        data: ProductUpdate,
        category: Option<Option<RecordId>>,
    ) -> RepoResult<Product> {
        let mut existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))?;

        if let Some(name) = data.name
            && name != existing.name
        {
            existing.slug = unique_slug(&name, |candidate| async move {
                self.find_by_slug(&candidate).await.map(|p| p.is_some())
            })
            .await?;
            existing.name = name;
        }
        if let Some(description) = data.description {
            existing.description = description;
        }
        if let Some(price) = data.price {
            existing.price = price;
        }
        if let Some(category) = category {
            existing.category = category;
        }
        if let Some(gender) = data.gender {
            existing.gender = gender;
        }
        if let Some(color) = data.color {
            existing.color = color;
        }
        if let Some(pieces) = data.pieces_available {
            existing.pieces_available = pieces;
        }
        if let Some(size_guide) = data.size_guide {
            existing.size_guide = size_guide;
        }
        if let Some(sizes) = data.sizes {
            existing.sizes = sizes;
        }
        if let Some(image1) = data.image1 {
            existing.image1 = Some(image1);
        }
        if let Some(image2) = data.image2 {
            existing.image2 = Some(image2);
        }
        if let Some(available) = data.available {
            existing.available = available;
        }
        if let Some(is_active) = data.is_active {
            existing.is_active = is_active;
        }
        existing.updated_at = Utc::now();

        let updated: Option<Product> = self
            .base
            .db()
            .update(id.clone())
            .content(existing)
            .await?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
    }

    pub async fn delete(&self, id: &RecordId) -> RepoResult<bool> {
        let deleted: Option<Product> = self.base.db().delete(id.clone()).await?;
        Ok(deleted.is_some())
    }
}
