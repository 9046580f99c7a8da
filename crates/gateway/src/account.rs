//! Read-only account views: dashboard, transactions, notifications, profile.
//!
//! These are independent reads, so [`AccountService::overview`] issues them
//! concurrently and joins. Fee quotes are served from the gateway's
//! calculator when reachable (its figures are authoritative) and fall back
//! to the local [`ethpay_core::fees`] mirror when it is not; quotes are
//! cached briefly since the rate changes rarely.

use std::time::Duration;

use moka::future::Cache;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use ethpay_core::{NotificationId, TransactionId, UserRole, fees};

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::session::UserProfile;

/// How long a fee quote stays cached.
const FEE_QUOTE_TTL: Duration = Duration::from_secs(300);

/// A dashboard widget descriptor. The gateway decides the set per role.
#[derive(Debug, Clone, Deserialize)]
pub struct Widget {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub id: String,
}

/// Role-specific dashboard layout.
#[derive(Debug, Clone, Deserialize)]
pub struct Dashboard {
    pub role: UserRole,
    #[serde(default)]
    pub widgets: Vec<Widget>,
}

/// One ledger entry from `transactions/`.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionRecord {
    pub transaction_id: TransactionId,
    pub amount: Decimal,
    #[serde(default)]
    pub service_fee: Option<Decimal>,
    #[serde(default)]
    pub total_amount: Option<Decimal>,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// One entry from `notifications/`.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationRecord {
    pub notification_id: NotificationId,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
}

/// A server-computed fee quote from `fee/calculate/`.
///
/// The gateway quotes the fee as a surcharge: `total_amount` is the amount
/// plus the fee. The checkout flow's deduction split comes from the bank
/// response instead.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeQuote {
    pub amount: Decimal,
    pub service_fee: Decimal,
    pub total_amount: Decimal,
}

/// The three independent reads joined for a dashboard landing view.
#[derive(Debug)]
pub struct AccountOverview {
    pub dashboard: Dashboard,
    pub transactions: Vec<TransactionRecord>,
    pub notifications: Vec<NotificationRecord>,
}

/// Read-only account operations against the gateway.
#[derive(Clone)]
pub struct AccountService {
    client: ApiClient,
    fee_quotes: Cache<String, FeeQuote>,
}

impl AccountService {
    /// Create the service.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        let fee_quotes = Cache::builder()
            .max_capacity(100)
            .time_to_live(FEE_QUOTE_TTL)
            .build();
        Self { client, fee_quotes }
    }

    /// The role-specific dashboard layout.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> Result<Dashboard, ApiError> {
        self.client.get("auth/dashboard/").await
    }

    /// The current user's transactions.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    #[instrument(skip(self))]
    pub async fn transactions(&self) -> Result<Vec<TransactionRecord>, ApiError> {
        self.client.get("transactions/").await
    }

    /// The current user's notifications.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    #[instrument(skip(self))]
    pub async fn notifications(&self) -> Result<Vec<NotificationRecord>, ApiError> {
        self.client.get("notifications/").await
    }

    /// The current user's profile as the gateway sees it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        self.client.get("auth/profile/").await
    }

    /// Load dashboard, transactions, and notifications together.
    ///
    /// The three reads are mutually independent, so they run concurrently;
    /// the first failure wins.
    ///
    /// # Errors
    ///
    /// Returns the first [`ApiError`] any of the reads produced.
    #[instrument(skip(self))]
    pub async fn overview(&self) -> Result<AccountOverview, ApiError> {
        let (dashboard, transactions, notifications) = tokio::try_join!(
            self.dashboard(),
            self.transactions(),
            self.notifications(),
        )?;

        Ok(AccountOverview {
            dashboard,
            transactions,
            notifications,
        })
    }

    /// Quote the service fee for `amount`.
    ///
    /// Asks the gateway first (its calculator is authoritative and its rate
    /// configurable server-side); falls back to the local 2% mirror when the
    /// gateway is unreachable or erroring. Auth failures propagate: an
    /// expired session should not silently produce an offline quote.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Auth`] when the session has expired.
    #[instrument(skip(self))]
    pub async fn fee_quote(&self, amount: Decimal) -> Result<FeeQuote, ApiError> {
        let key = amount.to_string();
        if let Some(cached) = self.fee_quotes.get(&key).await {
            debug!("fee quote cache hit");
            return Ok(cached);
        }

        let result: Result<FeeQuote, ApiError> =
            self.client.get(&format!("fee/calculate/?amount={amount}")).await;

        let quote = match result {
            Ok(quote) => quote,
            Err(err @ ApiError::Auth) => return Err(err),
            Err(err) => {
                warn!(error = %err, "fee endpoint unavailable, using local calculator");
                let breakdown = fees::compute_fee(amount, fees::DEFAULT_FEE_RATE);
                FeeQuote {
                    amount,
                    service_fee: breakdown.service_fee,
                    total_amount: amount + breakdown.service_fee,
                }
            }
        };

        self.fee_quotes.insert(key, quote.clone()).await;
        Ok(quote)
    }
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService").finish_non_exhaustive()
    }
}
