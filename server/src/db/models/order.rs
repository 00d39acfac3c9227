//! Order Model
//!
//! Orders move through the payment lifecycle:
//! `initiated -> (gateway-confirmed) -> paid/pending -> (admin confirm) ->
//! confirmed -> (admin reverse) -> pending`.
//!
//! Every mutation is guarded by the optimistic `version` counter so that
//! concurrent confirm/reverse/verify calls cannot silently lose updates.

use super::serde_helpers;
use super::UserPublic;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Order ID type
pub type OrderId = RecordId;

/// Payment status as reported by the gateway flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Initiated,
    Paid,
    Pending,
    Failed,
}

/// Administrative confirmation status, gates fulfilment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmStatus {
    Pending,
    Confirmed,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<OrderId>,
    /// Opaque correlation token shared with the payment gateway, globally unique
    pub reference: String,
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
    pub amount: Decimal,
    pub status: OrderStatus,
    pub confirm_status: ConfirmStatus,
    /// Cart snapshot plus gateway callback data; recognized keys: `items`,
    /// `user_marked_paid`, `user_marked_paid_at`
    #[serde(default)]
    pub metadata: serde_json::Value,
    /// Optimistic concurrency counter, bumped on every mutation
    #[serde(default)]
    pub version: u64,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Item names from `metadata.items`, "Product(s)" when absent
    pub fn item_names(&self) -> String {
        item_names(&self.metadata)
    }
}

/// Item names from a cart metadata document, "Product(s)" when absent
pub fn item_names(metadata: &serde_json::Value) -> String {
    let names: Vec<&str> = metadata
        .get("items")
        .and_then(|items| items.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("name").and_then(|n| n.as_str()))
                .collect()
        })
        .unwrap_or_default();

    if names.is_empty() {
        "Product(s)".to_string()
    } else {
        names.join(", ")
    }
}

/// Create order payload (from the cart/checkout flow)
#[derive(Debug, Clone, Deserialize)]
pub struct OrderCreate {
    /// Decimal string, e.g. "49.99"
    pub amount: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Order payload with the owner embedded
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    #[serde(with = "serde_helpers::option_record_id")]
    pub id: Option<OrderId>,
    pub user: UserPublic,
    pub reference: String,
    pub amount: Decimal,
    pub status: OrderStatus,
    pub confirm_status: ConfirmStatus,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl OrderView {
    pub fn new(order: Order, user: UserPublic) -> Self {
        Self {
            id: order.id,
            user,
            reference: order.reference,
            amount: order.amount,
            status: order.status,
            confirm_status: order.confirm_status,
            metadata: order.metadata,
            created_at: order.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order_with_metadata(metadata: serde_json::Value) -> Order {
        Order {
            id: None,
            reference: "abc123def456".to_string(),
            user: "user:tester".parse().unwrap(),
            amount: Decimal::new(4999, 2),
            status: OrderStatus::Initiated,
            confirm_status: ConfirmStatus::Pending,
            metadata,
            version: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn item_names_joins_cart_items() {
        let order = order_with_metadata(json!({
            "items": [{"name": "Agbada", "qty": 1}, {"name": "Gown"}]
        }));
        assert_eq!(order.item_names(), "Agbada, Gown");
    }

    #[test]
    fn item_names_falls_back_without_items() {
        let order = order_with_metadata(json!({}));
        assert_eq!(order.item_names(), "Product(s)");
    }
}
