//! Bank payment processor client.
//!
//! The bank surface settles e-commerce checkouts: it verifies the customer's
//! bank credentials, deducts the amount, splits off the service fee, and
//! credits the merchant. Credentials pass through one request and are never
//! persisted anywhere in this process.

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;

use ethpay_core::{AccountNumber, PaymentId, TransactionId};

use crate::client::ApiClient;
use crate::error::ApiError;

/// Bank account credentials entered into the payment form.
///
/// The password is wrapped so it stays out of `Debug` output and logs.
#[derive(Clone)]
pub struct BankCredentials {
    pub account_number: AccountNumber,
    pub password: SecretString,
}

impl std::fmt::Debug for BankCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BankCredentials")
            .field("account_number", &self.account_number)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Settlement returned by a successful `bank/process/` call.
#[derive(Debug, Clone, Deserialize)]
pub struct BankSettlement {
    pub transaction_id: TransactionId,
    pub amount: Decimal,
    pub service_fee: Decimal,
    /// What was taken from the customer: `amount + service_fee`.
    #[serde(default)]
    pub total_deducted: Option<Decimal>,
    pub merchant_received: Decimal,
    #[serde(default)]
    pub customer_balance: Option<Decimal>,
    #[serde(default)]
    pub merchant_balance: Option<Decimal>,
    #[serde(default)]
    pub fee_percentage: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Raw wire shape of `bank/process/`: a tagged success flag rather than a
/// status-code contract.
#[derive(Debug, Deserialize)]
struct BankProcessResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    settlement: Option<BankSettlement>,
}

/// Outcome of a credential check against `bank/verify/`.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountVerification {
    pub verified: bool,
    #[serde(default)]
    pub balance: Option<Decimal>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Client for the bank payment processor.
#[derive(Debug, Clone)]
pub struct BankClient {
    client: ApiClient,
}

impl BankClient {
    /// Create the client.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Settle a payment against the customer's bank account.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Validation`] when a field is empty, before any network
    ///   call
    /// - [`ApiError::Declined`] when the bank rejects the payment
    ///   (bad credentials, unknown account, insufficient funds)
    /// - the usual network/API errors otherwise
    #[instrument(skip(self, credentials), fields(payment_id = %payment_id, amount = %amount))]
    pub async fn process_payment(
        &self,
        payment_id: &PaymentId,
        credentials: &BankCredentials,
        amount: Decimal,
    ) -> Result<BankSettlement, ApiError> {
        if credentials.account_number.as_str().trim().is_empty() {
            return Err(ApiError::Validation("bank account number is required".into()));
        }
        if credentials.password.expose_secret().is_empty() {
            return Err(ApiError::Validation("bank password is required".into()));
        }

        let result: Result<BankProcessResponse, ApiError> = self
            .client
            .post(
                "bank/process/",
                &serde_json::json!({
                    "payment_id": payment_id,
                    "account_number": credentials.account_number,
                    "password": credentials.password.expose_secret(),
                    "amount": amount,
                }),
            )
            .await;

        match result {
            Ok(response) if response.success => response
                .settlement
                .ok_or_else(|| ApiError::Validation("bank omitted settlement details".into())),
            Ok(response) => Err(ApiError::Declined(
                response.error.unwrap_or_else(|| "Payment failed".to_owned()),
            )),
            // The bank signals declines as 4xx with {"success": false,
            // "error": ...}; the generic client has already extracted the
            // reason into the message.
            Err(ApiError::Api { status, message }) if (400..500).contains(&status) => {
                Err(ApiError::Declined(message))
            }
            Err(err) => Err(err),
        }
    }

    /// Check bank credentials without moving money.
    ///
    /// # Errors
    ///
    /// Returns the usual network/API errors; a failed verification is a
    /// normal `Ok` with `verified == false`.
    #[instrument(skip(self, credentials))]
    pub async fn verify_account(
        &self,
        credentials: &BankCredentials,
    ) -> Result<AccountVerification, ApiError> {
        let result: Result<AccountVerification, ApiError> = self
            .client
            .post(
                "bank/verify/",
                &serde_json::json!({
                    "account_number": credentials.account_number,
                    "password": credentials.password.expose_secret(),
                }),
            )
            .await;

        match result {
            Err(ApiError::Api { status, message }) if (400..500).contains(&status) => {
                Ok(AccountVerification {
                    verified: false,
                    balance: None,
                    error: Some(message),
                })
            }
            other => other,
        }
    }

    /// Create or reset the sandbox demo accounts.
    ///
    /// Sandbox bootstrap only; the bank refuses this outside demo mode.
    ///
    /// # Errors
    ///
    /// Returns the usual network/API errors.
    #[instrument(skip(self))]
    pub async fn create_demo_accounts(&self) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .client
            .post("bank/create-demo/", &serde_json::json!({}))
            .await?;
        Ok(())
    }
}
