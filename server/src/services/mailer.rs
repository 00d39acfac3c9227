//! Mail Service
//!
//! Notification mail goes out through a trait seam so handlers never block
//! on delivery. Production posts to an HTTP mail relay; when no relay is
//! configured, messages are logged and dropped.

use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info};

/// One outbound message
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingMail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Mail delivery seam
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> AppResult<()>;
}

/// Mailer posting messages to an HTTP relay API
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl HttpMailer {
    pub fn new(api_url: String, api_key: Option<String>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url,
            api_key,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, mail: OutgoingMail) -> AppResult<()> {
        let mut request = self.client.post(&self.api_url).json(&mail);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            error!("Mail relay request failed: {e}");
            AppError::internal("Mail relay is unreachable")
        })?;

        if !response.status().is_success() {
            let status = response.status();
            error!("Mail relay rejected message ({status})");
            return Err(AppError::internal(format!(
                "Mail relay rejected message: {status}"
            )));
        }

        info!("Sent mail '{}' to {:?}", mail.subject, mail.to);
        Ok(())
    }
}

/// Fallback mailer that only logs; used when no relay is configured and in
/// tests
#[derive(Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: OutgoingMail) -> AppResult<()> {
        info!(
            "Mail (not delivered, no relay configured) to {:?}: {} -- {}",
            mail.to, mail.subject, mail.body
        );
        Ok(())
    }
}

/// Plain-text message bodies for the notification mails
pub mod templates {
    /// Admin notice: a customer claims to have completed a transfer
    pub fn payment_attempt_admin(username: &str, items: &str, amount: &str, reference: &str) -> String {
        format!(
            "{username} indicated they have paid {amount} for {items} \
             (reference {reference}). Verify the transfer and confirm the order."
        )
    }

    /// Customer notice after marking an order as paid
    pub fn payment_attempt_customer(username: &str, items: &str, reference: &str) -> String {
        format!(
            "Hi {username}, we received your payment notice for {items} \
             (reference {reference}). Your order will be confirmed once the \
             transfer is verified."
        )
    }

    /// Customer notice after an admin confirms the order
    pub fn order_confirmed(username: &str, items: &str, reference: &str) -> String {
        format!(
            "Hi {username}, your payment for {items} (reference {reference}) \
             has been confirmed. Your order is now being processed."
        )
    }

    /// Customer notice after a card payment verifies successfully
    pub fn payment_received(username: &str, items: &str, amount: &str, reference: &str) -> String {
        format!(
            "Hi {username}, your payment of {amount} for {items} \
             (reference {reference}) was successful. Thank you for shopping \
             with us."
        )
    }

    /// Account verification code
    pub fn verification_code(username: &str, code: &str) -> String {
        format!(
            "Hi {username}, your verification code is {code}. It expires in \
             15 minutes."
        )
    }

    /// Password reset link
    pub fn password_reset(username: &str, reset_url: &str) -> String {
        format!(
            "Hi {username}, follow this link to reset your password: \
             {reset_url}\nThe link expires in 30 minutes. If you did not \
             request this, ignore this mail."
        )
    }
}
