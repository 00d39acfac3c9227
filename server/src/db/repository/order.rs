//! Order Repository
//!
//! All state mutations are conditional on the caller's last-read `version`
//! and bump it, so concurrent confirm/reverse/verify calls on one order
//! surface as conflicts instead of silently losing writes.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{ConfirmStatus, Order, OrderStatus};
use chrono::Utc;
use rust_decimal::Decimal;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "order";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All orders, newest first (admin listing)
    pub async fn find_all(&self) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Orders owned by one user, newest first. Record links are stored in
    /// their `"table:id"` string form, so the binding must match.
    pub async fn find_by_user(&self, user: &RecordId) -> RepoResult<Vec<Order>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM order WHERE user = $user ORDER BY created_at DESC")
            .bind(("user", user.to_string()))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders)
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Order>> {
        let order: Option<Order> = self.base.db().select(id.clone()).await?;
        Ok(order)
    }

    pub async fn find_by_reference(&self, reference: &str) -> RepoResult<Option<Order>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM order WHERE reference = $reference LIMIT 1")
            .bind(("reference", reference.to_string()))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders.into_iter().next())
    }

    /// Persist a new order; `reference` must be globally unique
    pub async fn create(
        &self,
        user: RecordId,
        reference: String,
        amount: Decimal,
        status: OrderStatus,
        confirm_status: ConfirmStatus,
        metadata: serde_json::Value,
    ) -> RepoResult<Order> {
        if self.find_by_reference(&reference).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Order reference '{reference}' already exists"
            )));
        }

        let order = Order {
            id: None,
            reference,
            user,
            amount,
            status,
            confirm_status,
            metadata,
            version: 0,
            created_at: Utc::now(),
        };

        let created: Option<Order> = self.base.db().create(TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Version-checked status transition
    pub async fn update_status(
        &self,
        id: &RecordId,
        expected_version: u64,
        status: OrderStatus,
        confirm_status: ConfirmStatus,
    ) -> RepoResult<Order> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE order SET status = $status, confirm_status = $confirm_status, \
                 version = version + 1 WHERE id = $id AND version = $version RETURN AFTER",
            )
            .bind(("id", id.clone()))
            .bind(("status", status))
            .bind(("confirm_status", confirm_status))
            .bind(("version", expected_version))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        orders.into_iter().next().ok_or_else(|| {
            RepoError::Conflict(format!("Order {id} was modified concurrently"))
        })
    }

    /// Version-checked metadata replacement (status untouched)
    pub async fn update_metadata(
        &self,
        id: &RecordId,
        expected_version: u64,
        metadata: serde_json::Value,
    ) -> RepoResult<Order> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE order SET metadata = $metadata, version = version + 1 \
                 WHERE id = $id AND version = $version RETURN AFTER",
            )
            .bind(("id", id.clone()))
            .bind(("metadata", metadata))
            .bind(("version", expected_version))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        orders.into_iter().next().ok_or_else(|| {
            RepoError::Conflict(format!("Order {id} was modified concurrently"))
        })
    }

    /// Version-checked transition applied by gateway verification: marks the
    /// order paid and replaces the metadata with the merged document
    pub async fn mark_paid(
        &self,
        id: &RecordId,
        expected_version: u64,
        metadata: serde_json::Value,
    ) -> RepoResult<Order> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE order SET status = 'paid', metadata = $metadata, \
                 version = version + 1 WHERE id = $id AND version = $version RETURN AFTER",
            )
            .bind(("id", id.clone()))
            .bind(("metadata", metadata))
            .bind(("version", expected_version))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        orders.into_iter().next().ok_or_else(|| {
            RepoError::Conflict(format!("Order {id} was modified concurrently"))
        })
    }
}
