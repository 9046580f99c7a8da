//! Gateway payment lifecycle: initiate, process, cancel, inspect.
//!
//! These are the portal-side payment operations (wallet-to-wallet transfers
//! between gateway users). The storefront checkout flow uses the bank
//! processor in [`crate::bank`] instead.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use ethpay_core::{PaymentId, PaymentStatus, ReceiptId, TransactionId, UserId};

use crate::client::ApiClient;
use crate::error::ApiError;

/// Request to start a payment to another gateway user.
#[derive(Debug, Clone, Serialize)]
pub struct NewPayment {
    pub amount: Decimal,
    #[serde(rename = "recipientID")]
    pub recipient_id: UserId,
    #[serde(rename = "paymentMethod")]
    pub payment_method: String,
    pub currency: String,
}

impl NewPayment {
    /// A wallet payment in birr, the common case.
    #[must_use]
    pub fn wallet(amount: Decimal, recipient_id: UserId) -> Self {
        Self {
            amount,
            recipient_id,
            payment_method: "Wallet".to_owned(),
            currency: "ETB".to_owned(),
        }
    }
}

/// A payment record as returned by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct Payment {
    #[serde(rename = "paymentID", alias = "payment_id")]
    pub payment_id: PaymentId,
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Option<String>,
    pub status: PaymentStatus,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub processed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Result of processing a pending payment.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessedPayment {
    pub message: String,
    #[serde(rename = "transactionID")]
    pub transaction_id: TransactionId,
    #[serde(rename = "receiptID")]
    pub receipt_id: ReceiptId,
}

/// Payment operations against the gateway.
#[derive(Debug, Clone)]
pub struct PaymentService {
    client: ApiClient,
}

impl PaymentService {
    /// Create the service.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Create a pending payment and get its id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a non-positive amount before any
    /// network call, otherwise the gateway's error.
    #[instrument(skip(self, payment), fields(amount = %payment.amount))]
    pub async fn initiate(&self, payment: &NewPayment) -> Result<Payment, ApiError> {
        if payment.amount <= Decimal::ZERO {
            return Err(ApiError::Validation("amount must be positive".into()));
        }
        self.client.post("payment/initiate/", payment).await
    }

    /// Process a pending payment into a settled transaction.
    ///
    /// Not idempotent: the gateway rejects a second process call for the
    /// same id, and this layer never retries it.
    ///
    /// # Errors
    ///
    /// Returns the gateway's error for unknown ids or non-pending payments.
    #[instrument(skip(self))]
    pub async fn process(&self, payment_id: &PaymentId) -> Result<ProcessedPayment, ApiError> {
        self.client
            .post(
                "payment/process/",
                &serde_json::json!({ "paymentID": payment_id }),
            )
            .await
    }

    /// Cancel a pending payment.
    ///
    /// # Errors
    ///
    /// Returns the gateway's error if the payment is not cancellable.
    #[instrument(skip(self))]
    pub async fn cancel(&self, payment_id: &PaymentId) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .client
            .post(
                "payment/cancel/",
                &serde_json::json!({ "paymentID": payment_id }),
            )
            .await?;
        Ok(())
    }

    /// Fetch a single payment.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Api`] with status 404 for an unknown id.
    #[instrument(skip(self))]
    pub async fn details(&self, payment_id: &PaymentId) -> Result<Payment, ApiError> {
        self.client.get(&format!("payment/{payment_id}/")).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;
    use crate::session::{AuthTokens, SessionStore};
    use crate::store::MemoryStore;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use uuid::Uuid;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service_for(uri: &str) -> PaymentService {
        let config =
            GatewayConfig::with_urls(&format!("{uri}/api"), "http://localhost:8000/api").unwrap();
        let session = SessionStore::new(Arc::new(MemoryStore::new()));
        session
            .set_tokens(&AuthTokens {
                access: "acc".into(),
                refresh: "ref".into(),
            })
            .unwrap();
        PaymentService::new(ApiClient::new(&config, session).unwrap())
    }

    #[tokio::test]
    async fn test_initiate_rejects_zero_amount_before_network() {
        let payments = service_for("http://127.0.0.1:9");
        let err = payments
            .initiate(&NewPayment::wallet(Decimal::ZERO, UserId::new(Uuid::new_v4())))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_initiate_and_process() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/payment/initiate/"))
            .and(body_partial_json(serde_json::json!({
                "paymentMethod": "Wallet",
                "currency": "ETB",
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "paymentID": "PAY-1",
                "amount": "250.00",
                "currency": "ETB",
                "status": "Pending",
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/payment/process/"))
            .and(body_partial_json(serde_json::json!({ "paymentID": "PAY-1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "Payment processed successfully",
                "transactionID": "TXN-1",
                "receiptID": "RCPT-1",
            })))
            .mount(&server)
            .await;

        let payments = service_for(&server.uri());
        let payment = payments
            .initiate(&NewPayment::wallet(dec!(250.00), UserId::new(Uuid::new_v4())))
            .await
            .unwrap();
        assert_eq!(payment.status, PaymentStatus::Pending);

        let processed = payments.process(&payment.payment_id).await.unwrap();
        assert_eq!(processed.transaction_id.as_str(), "TXN-1");
    }
}
