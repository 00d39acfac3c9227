//! Sale Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Sale, SaleCreate, SaleUpdate};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "sale";

#[derive(Clone)]
pub struct SaleRepository {
    base: BaseRepository,
}

impl SaleRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All sales, newest entries first
    pub async fn find_all(&self) -> RepoResult<Vec<Sale>> {
        let sales: Vec<Sale> = self
            .base
            .db()
            .query("SELECT * FROM sale ORDER BY date_paid DESC")
            .await?
            .take(0)?;
        Ok(sales)
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Sale>> {
        let sale: Option<Sale> = self.base.db().select(id.clone()).await?;
        Ok(sale)
    }

    /// Create a sale; profit fields are derived before persisting
    pub async fn create(&self, data: SaleCreate, created_by: RecordId) -> RepoResult<Sale> {
        let mut sale = Sale {
            id: None,
            customer_name: data.customer_name,
            amount_paid: data.amount_paid,
            cost_of_production: data.cost_of_production,
            workmanship: data.workmanship,
            date_paid: data.date_paid,
            date_completed: data.date_completed,
            created_by,
            profit_or_loss: Default::default(),
            is_profit: true,
        };
        sale.recompute();

        let created: Option<Sale> = self.base.db().create(TABLE).content(sale).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create sale".to_string()))
    }

    /// Partial update; profit fields are re-derived
    pub async fn update(&self, id: &RecordId, data: SaleUpdate) -> RepoResult<Sale> {
        let mut existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Sale {id} not found")))?;

        if let Some(customer_name) = data.customer_name {
            existing.customer_name = customer_name;
        }
        if let Some(amount_paid) = data.amount_paid {
            existing.amount_paid = amount_paid;
        }
        if let Some(cost) = data.cost_of_production {
            existing.cost_of_production = cost;
        }
        if let Some(workmanship) = data.workmanship {
            existing.workmanship = workmanship;
        }
        if let Some(date_paid) = data.date_paid {
            existing.date_paid = date_paid;
        }
        if let Some(date_completed) = data.date_completed {
            existing.date_completed = date_completed;
        }
        existing.recompute();

        let updated: Option<Sale> = self.base.db().update(id.clone()).content(existing).await?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Sale {id} not found")))
    }

    pub async fn delete(&self, id: &RecordId) -> RepoResult<bool> {
        let deleted: Option<Sale> = self.base.db().delete(id.clone()).await?;
        Ok(deleted.is_some())
    }
}
