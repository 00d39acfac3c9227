//! Sale Model
//!
//! Offline sales ledger, admin-only. `profit_or_loss` and `is_profit` are
//! derived from the amounts on every write.

use super::serde_helpers;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Sale ID type
pub type SaleId = RecordId;

/// Sale ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<SaleId>,
    pub customer_name: String,
    pub amount_paid: Decimal,
    pub cost_of_production: Decimal,
    pub workmanship: Decimal,
    pub date_paid: NaiveDate,
    pub date_completed: NaiveDate,
    #[serde(with = "serde_helpers::record_id")]
    pub created_by: RecordId,
    pub profit_or_loss: Decimal,
    pub is_profit: bool,
}

impl Sale {
    /// Recompute the derived profit fields from the amounts
    pub fn recompute(&mut self) {
        let total_cost = self.cost_of_production + self.workmanship;
        self.profit_or_loss = self.amount_paid - total_cost;
        self.is_profit = self.profit_or_loss >= Decimal::ZERO;
    }
}

/// Create sale payload
#[derive(Debug, Clone, Deserialize)]
pub struct SaleCreate {
    pub customer_name: String,
    pub amount_paid: Decimal,
    pub cost_of_production: Decimal,
    pub workmanship: Decimal,
    pub date_paid: NaiveDate,
    pub date_completed: NaiveDate,
}

/// Update sale payload
#[derive(Debug, Clone, Deserialize)]
pub struct SaleUpdate {
    pub customer_name: Option<String>,
    pub amount_paid: Option<Decimal>,
    pub cost_of_production: Option<Decimal>,
    pub workmanship: Option<Decimal>,
    pub date_paid: Option<NaiveDate>,
    pub date_completed: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn recompute_flags_losses() {
        let mut sale = Sale {
            id: None,
            customer_name: "Ada".to_string(),
            amount_paid: Decimal::new(10_000, 2),
            cost_of_production: Decimal::new(8_000, 2),
            workmanship: Decimal::new(3_000, 2),
            date_paid: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            date_completed: NaiveDate::from_ymd_opt(2024, 5, 8).unwrap(),
            created_by: "user:admin".parse().unwrap(),
            profit_or_loss: Decimal::ZERO,
            is_profit: true,
        };

        sale.recompute();
        assert_eq!(sale.profit_or_loss, Decimal::new(-1_000, 2));
        assert!(!sale.is_profit);
    }
}
