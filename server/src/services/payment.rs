//! Payment Service
//!
//! Owns the order lifecycle: gateway checkout, manual-transfer orders, the
//! customer's "I have paid" signal, and the admin confirm/reverse controls.
//! All order writes funnel through the version-checked repository so two
//! racing transitions cannot both win. Notification mail is dispatched on a
//! background task; delivery failure never fails the request.

use crate::db::models::order;
use crate::db::models::{ConfirmStatus, Order, OrderCreate, OrderStatus, User, UserRole};
use crate::db::repository::OrderRepository;
use crate::services::gateway::{InitializeRequest, PaymentGateway};
use crate::services::mailer::{Mailer, OutgoingMail, templates};
use crate::utils::error::{AppError, AppResult};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use serde_json::{Value, json};
use std::str::FromStr;
use std::sync::Arc;
use surrealdb::RecordId;
use surrealdb::engine::local::Db;
use surrealdb::Surreal;
use tracing::{info, warn};
use uuid::Uuid;

/// Gateway checkout handoff
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSession {
    pub authorization_url: String,
    pub reference: String,
}

/// Outcome of gateway verification, shaped for the frontend redirect
#[derive(Debug, Clone, Serialize)]
pub struct PaymentVerification {
    pub success: bool,
    pub redirect_path: String,
    pub reference: String,
}

/// Mail addressing shared by every notification
#[derive(Debug, Clone)]
pub struct MailSettings {
    pub admin_email: String,
    pub from_email: String,
    pub frontend_url: String,
}

#[derive(Clone)]
pub struct PaymentService {
    orders: OrderRepository,
    gateway: Arc<dyn PaymentGateway>,
    mailer: Arc<dyn Mailer>,
    mail: MailSettings,
}

impl PaymentService {
    pub fn new(
        db: Surreal<Db>,
        gateway: Arc<dyn PaymentGateway>,
        mailer: Arc<dyn Mailer>,
        mail: MailSettings,
    ) -> Self {
        Self {
            orders: OrderRepository::new(db),
            gateway,
            mailer,
            mail,
        }
    }

    /// 12-char lowercase hex reference shared with the gateway
    pub fn new_reference() -> String {
        Uuid::new_v4().simple().to_string()[..12].to_string()
    }

    fn parse_amount(raw: &str) -> AppResult<Decimal> {
        let amount = Decimal::from_str(raw)
            .map_err(|_| AppError::validation(format!("Invalid amount '{raw}'")))?;
        if amount <= Decimal::ZERO {
            return Err(AppError::validation("Amount must be greater than zero"));
        }
        Ok(amount)
    }

    /// Major-unit decimal to gateway minor units (kobo)
    fn to_minor_units(amount: Decimal) -> AppResult<i64> {
        let minor = amount * Decimal::from(100);
        if minor.fract() != Decimal::ZERO {
            return Err(AppError::validation(
                "Amount must have at most two decimal places",
            ));
        }
        minor
            .to_i64()
            .ok_or_else(|| AppError::validation("Amount is out of range"))
    }

    fn from_minor_units(minor: i64) -> Decimal {
        Decimal::new(minor, 2)
    }

    /// Best-effort background mail dispatch
    fn dispatch_mail(&self, to: Vec<String>, subject: String, body: String) {
        let mailer = Arc::clone(&self.mailer);
        let from = self.mail.from_email.clone();
        tokio::spawn(async move {
            let mail = OutgoingMail {
                from,
                to,
                subject: subject.clone(),
                body,
            };
            if let Err(e) = mailer.send(mail).await {
                warn!("Failed to send mail '{subject}': {e}");
            }
        });
    }

    /// Start a gateway checkout. No order row is written here; the order
    /// materializes when the gateway verifies the charge.
    pub async fn initiate_payment(
        &self,
        user: &User,
        data: OrderCreate,
    ) -> AppResult<CheckoutSession> {
        let amount = Self::parse_amount(&data.amount)?;
        let amount_minor = Self::to_minor_units(amount)?;
        let reference = Self::new_reference();
        let callback_url = format!(
            "{}/verify-payment?reference={reference}",
            self.mail.frontend_url.trim_end_matches('/')
        );
        let items = order::item_names(&data.metadata);

        let outcome = self
            .gateway
            .initialize(InitializeRequest {
                email: user.email.clone(),
                amount_minor,
                reference: reference.clone(),
                callback_url,
                metadata: data.metadata,
            })
            .await?;

        let amount_text = amount.to_string();
        self.dispatch_mail(
            vec![self.mail.admin_email.clone()],
            "New payment attempt".to_string(),
            templates::payment_attempt_admin(&user.username, &items, &amount_text, &reference),
        );
        self.dispatch_mail(
            vec![user.email.clone()],
            "Your payment is being processed".to_string(),
            templates::payment_attempt_customer(&user.username, &items, &reference),
        );

        info!("Checkout session {reference} opened for {}", user.username);
        Ok(CheckoutSession {
            authorization_url: outcome.authorization_url,
            reference,
        })
    }

    /// Record a manual-transfer order awaiting payment
    pub async fn create_order(&self, user: &User, data: OrderCreate) -> AppResult<Order> {
        let amount = Self::parse_amount(&data.amount)?;
        let user_id = Self::require_id(user)?;

        let order = self
            .orders
            .create(
                user_id,
                Self::new_reference(),
                amount,
                OrderStatus::Initiated,
                ConfirmStatus::Pending,
                data.metadata,
            )
            .await?;

        info!("Order {} created for {}", order.reference, user.username);
        Ok(order)
    }

    /// Settle a gateway callback. A successful charge updates the order with
    /// the matching reference, or creates it if checkout never wrote one; a
    /// failed charge touches nothing.
    pub async fn verify_payment(
        &self,
        user: &User,
        reference: &str,
    ) -> AppResult<PaymentVerification> {
        let outcome = self.gateway.verify(reference).await?;

        if !outcome.is_successful() {
            info!("Verification failed for reference {reference}");
            return Ok(PaymentVerification {
                success: false,
                redirect_path: "/payment-failed".to_string(),
                reference: reference.to_string(),
            });
        }

        let amount = Self::from_minor_units(outcome.amount_minor);
        let order = match self.orders.find_by_reference(reference).await? {
            Some(existing) => {
                let id = existing
                    .id
                    .clone()
                    .ok_or_else(|| AppError::database("Order record has no id"))?;
                let metadata = merge_metadata(existing.metadata.clone(), &outcome.metadata);
                self.orders
                    .mark_paid(&id, existing.version, metadata)
                    .await?
            }
            None => {
                let user_id = Self::require_id(user)?;
                let metadata = merge_metadata(json!({}), &outcome.metadata);
                self.orders
                    .create(
                        user_id,
                        reference.to_string(),
                        amount,
                        OrderStatus::Paid,
                        ConfirmStatus::Pending,
                        metadata,
                    )
                    .await?
            }
        };

        self.dispatch_mail(
            vec![user.email.clone()],
            "Payment received".to_string(),
            templates::payment_received(
                &user.username,
                &order.item_names(),
                &order.amount.to_string(),
                reference,
            ),
        );

        info!("Reference {reference} verified and order marked paid");
        Ok(PaymentVerification {
            success: true,
            redirect_path: format!("/payment-success?reference={reference}"),
            reference: reference.to_string(),
        })
    }

    /// Customer's "I have paid" signal on a manual-transfer order. Owner or
    /// admin; flags the metadata and nothing else, `status` stays where the
    /// admin controls left it.
    pub async fn mark_paid(&self, user: &User, order_id: &RecordId) -> AppResult<Order> {
        let order = self.find_order(order_id).await?;
        let user_id = Self::require_id(user)?;
        if order.user != user_id && user.role != UserRole::Admin {
            return Err(AppError::forbidden("You do not own this order"));
        }

        let mut metadata = order.metadata.clone();
        if let Value::Object(map) = &mut metadata {
            map.insert("user_marked_paid".to_string(), json!(true));
            map.insert(
                "user_marked_paid_at".to_string(),
                json!(chrono::Utc::now().to_rfc3339()),
            );
        } else {
            metadata = json!({
                "user_marked_paid": true,
                "user_marked_paid_at": chrono::Utc::now().to_rfc3339(),
            });
        }

        let order = self
            .orders
            .update_metadata(order_id, order.version, metadata)
            .await?;

        self.dispatch_mail(
            vec![self.mail.admin_email.clone()],
            "Customer payment notice".to_string(),
            templates::payment_attempt_admin(
                &user.username,
                &order.item_names(),
                &order.amount.to_string(),
                &order.reference,
            ),
        );

        Ok(order)
    }

    /// Admin settles an order: payment sighted, fulfilment may proceed.
    /// Re-confirming rewrites identical state and re-sends the email.
    pub async fn confirm_payment(&self, order_id: &RecordId, customer: &User) -> AppResult<Order> {
        let order = self.find_order(order_id).await?;

        let order = self
            .orders
            .update_status(
                order_id,
                order.version,
                OrderStatus::Paid,
                ConfirmStatus::Confirmed,
            )
            .await?;

        self.dispatch_mail(
            vec![customer.email.clone()],
            "Order confirmed".to_string(),
            templates::order_confirmed(&customer.username, &order.item_names(), &order.reference),
        );

        info!("Order {} confirmed", order.reference);
        Ok(order)
    }

    /// Admin walks back a confirmation; only a confirmed order can be
    /// reversed
    pub async fn reverse_payment(&self, order_id: &RecordId) -> AppResult<Order> {
        let order = self.find_order(order_id).await?;
        if order.confirm_status != ConfirmStatus::Confirmed {
            return Err(AppError::validation("Order has not been confirmed"));
        }

        let order = self
            .orders
            .update_status(
                order_id,
                order.version,
                OrderStatus::Pending,
                ConfirmStatus::Pending,
            )
            .await?;

        info!("Order {} confirmation reversed", order.reference);
        Ok(order)
    }

    async fn find_order(&self, order_id: &RecordId) -> AppResult<Order> {
        self.orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {order_id} not found")))
    }

    fn require_id(user: &User) -> AppResult<RecordId> {
        user.id
            .clone()
            .ok_or_else(|| AppError::database("User record has no id"))
    }
}

/// Merge gateway callback data into the order's metadata object
fn merge_metadata(existing: Value, gateway: &Value) -> Value {
    let mut base = match existing {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    if let Value::Object(extra) = gateway {
        for (key, value) in extra {
            base.insert(key.clone(), value.clone());
        }
    }
    Value::Object(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_are_twelve_hex_chars() {
        for _ in 0..10 {
            let reference = PaymentService::new_reference();
            assert_eq!(reference.len(), 12);
            assert!(reference.chars().all(|c| c.is_ascii_hexdigit()));
            assert!(!reference.contains('-'));
        }
    }

    #[test]
    fn minor_unit_conversion_round_trips() {
        let amount = PaymentService::parse_amount("49.99").unwrap();
        let minor = PaymentService::to_minor_units(amount).unwrap();
        assert_eq!(minor, 4999);
        assert_eq!(PaymentService::from_minor_units(minor), amount);
    }

    #[test]
    fn sub_kobo_amounts_are_rejected() {
        let amount = PaymentService::parse_amount("10.999").unwrap();
        assert!(PaymentService::to_minor_units(amount).is_err());
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        assert!(PaymentService::parse_amount("0").is_err());
        assert!(PaymentService::parse_amount("-5").is_err());
        assert!(PaymentService::parse_amount("abc").is_err());
    }

    #[test]
    fn merge_keeps_existing_and_overlays_gateway_keys() {
        let merged = merge_metadata(
            json!({"items": [{"name": "Gown"}], "note": "old"}),
            &json!({"note": "new", "channel": "card"}),
        );
        assert_eq!(merged["items"][0]["name"], "Gown");
        assert_eq!(merged["note"], "new");
        assert_eq!(merged["channel"], "card");
    }
}
