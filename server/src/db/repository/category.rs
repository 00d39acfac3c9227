//! Category Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Category, CategoryCreate, CategoryUpdate};
use crate::utils::slug::unique_slug;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "category";

#[derive(Clone)]
pub struct CategoryRepository {
    base: BaseRepository,
}

impl CategoryRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All categories ordered by name
    pub async fn find_all(&self) -> RepoResult<Vec<Category>> {
        let categories: Vec<Category> = self
            .base
            .db()
            .query("SELECT * FROM category ORDER BY name")
            .await?
            .take(0)?;
        Ok(categories)
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Category>> {
        let category: Option<Category> = self.base.db().select(id.clone()).await?;
        Ok(category)
    }

    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<Category>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM category WHERE name = $name LIMIT 1")
            .bind(("name", name.to_string()))
            .await?;
        let categories: Vec<Category> = result.take(0)?;
        Ok(categories.into_iter().next())
    }

    pub async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Category>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM category WHERE slug = $slug LIMIT 1")
            .bind(("slug", slug.to_string()))
            .await?;
        let categories: Vec<Category> = result.take(0)?;
        Ok(categories.into_iter().next())
    }

    /// Create a new category with a unique generated slug
    pub async fn create(&self, data: CategoryCreate) -> RepoResult<Category> {
        if self.find_by_name(&data.name).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Category '{}' already exists",
                data.name
            )));
        }

        let slug = unique_slug(&data.name, |candidate| async move {
            self.find_by_slug(&candidate).await.map(|c| c.is_some())
        })
        .await?;

        let category = Category {
            id: None,
            name: data.name,
            slug,
        };

        let created: Option<Category> = self.base.db().create(TABLE).content(category).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create category".to_string()))
    }

    /// Rename a category; the slug is regenerated when the name changes
    pub async fn update(&self, id: &RecordId, data: CategoryUpdate) -> RepoResult<Category> {
        let mut existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Category {id} not found")))?;

        if let Some(name) = data.name
            && name != existing.name
        {
            if self.find_by_name(&name).await?.is_some() {
                return Err(RepoError::Duplicate(format!(
                    "Category '{name}' already exists"
                )));
            }
            existing.slug = unique_slug(&name, |candidate| async move {
                self.find_by_slug(&candidate).await.map(|c| c.is_some())
            })
            .await?;
            existing.name = name;
        }

        let updated: Option<Category> = self
            .base
            .db()
            .update(id.clone())
            .content(existing)
            .await?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Category {id} not found")))
    }

    pub async fn delete(&self, id: &RecordId) -> RepoResult<bool> {
        let deleted: Option<Category> = self.base.db().delete(id.clone()).await?;
        Ok(deleted.is_some())
    }
}
