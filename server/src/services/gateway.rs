//! Payment Gateway Client
//!
//! Trait seam over the external card-payment provider plus the production
//! Paystack implementation. Amounts cross this boundary in minor units
//! (kobo), never as decimals.

use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info};

/// Initialize-transaction request forwarded to the gateway
#[derive(Debug, Clone, Serialize)]
pub struct InitializeRequest {
    pub email: String,
    /// Amount in minor units (major * 100)
    pub amount_minor: i64,
    pub reference: String,
    pub callback_url: String,
    pub metadata: Value,
}

/// Successful initialize response: where to send the customer
#[derive(Debug, Clone, Deserialize)]
pub struct InitializeOutcome {
    pub status: bool,
    pub message: String,
    pub authorization_url: String,
}

/// Verify-transaction response
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyOutcome {
    /// Envelope-level status from the gateway API call itself
    pub status: bool,
    /// Transaction status, "success" when the charge went through
    pub gateway_status: String,
    pub amount_minor: i64,
    #[serde(default)]
    pub metadata: Value,
}

impl VerifyOutcome {
    pub fn is_successful(&self) -> bool {
        self.status && self.gateway_status == "success"
    }
}

/// External payment provider seam
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initialize(&self, request: InitializeRequest) -> AppResult<InitializeOutcome>;
    async fn verify(&self, reference: &str) -> AppResult<VerifyOutcome>;
}

/// Paystack HTTP client
pub struct PaystackClient {
    client: reqwest::Client,
    base_url: String,
    secret_key: String,
}

#[derive(Debug, Deserialize)]
struct PaystackEnvelope {
    status: bool,
    message: String,
    #[serde(default)]
    data: Value,
}

impl PaystackClient {
    pub fn new(base_url: String, secret_key: String) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key,
        })
    }

    async fn parse_envelope(&self, response: reqwest::Response) -> AppResult<PaystackEnvelope> {
        let status = response.status();
        let envelope: PaystackEnvelope = response.json().await.map_err(|e| {
            error!("Malformed gateway response ({status}): {e}");
            AppError::gateway("Unexpected response from payment gateway")
        })?;
        Ok(envelope)
    }
}

#[async_trait]
impl PaymentGateway for PaystackClient {
    async fn initialize(&self, request: InitializeRequest) -> AppResult<InitializeOutcome> {
        let url = format!("{}/transaction/initialize", self.base_url);
        let body = serde_json::json!({
            "email": request.email,
            "amount": request.amount_minor,
            "reference": request.reference,
            "callback_url": request.callback_url,
            "metadata": request.metadata,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.secret_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Gateway initialize request failed: {e}");
                AppError::gateway("Payment gateway is unreachable")
            })?;

        let envelope = self.parse_envelope(response).await?;
        if !envelope.status {
            return Err(AppError::gateway(envelope.message));
        }

        let authorization_url = envelope
            .data
            .get("authorization_url")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AppError::gateway("Gateway response missing authorization_url"))?
            .to_string();

        info!("Initialized gateway transaction {}", request.reference);
        Ok(InitializeOutcome {
            status: envelope.status,
            message: envelope.message,
            authorization_url,
        })
    }

    async fn verify(&self, reference: &str) -> AppResult<VerifyOutcome> {
        let url = format!("{}/transaction/verify/{reference}", self.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| {
                error!("Gateway verify request failed: {e}");
                AppError::gateway("Payment gateway is unreachable")
            })?;

        let envelope = self.parse_envelope(response).await?;
        let gateway_status = envelope
            .data
            .get("status")
            .and_then(|v| v.as_str())
            .unwrap_or("failed")
            .to_string();
        let amount_minor = envelope
            .data
            .get("amount")
            .and_then(|v| v.as_i64())
            .unwrap_or(0);
        let metadata = envelope
            .data
            .get("metadata")
            .cloned()
            .unwrap_or(Value::Null);

        Ok(VerifyOutcome {
            status: envelope.status,
            gateway_status,
            amount_minor,
            metadata,
        })
    }
}
