//! Checkout flow: order creation, bank payment, callback.
//!
//! One `CheckoutFlow` drives one checkout attempt through an explicit state
//! machine:
//!
//! ```text
//! Idle -> OrderCreating -> OrderCreated -> PaymentFormOpen
//!      -> PaymentSubmitting -> PaymentSucceeded | PaymentFailed
//! ```
//!
//! The steps are strictly sequential; each network call's output (order id,
//! payment id, transaction id) is input to the next. A declined payment
//! keeps the created order and payment id so the user can retry with other
//! credentials without re-creating the order; cancelling makes no rollback
//! call, the order simply stays pending server-side.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};
use uuid::Uuid;

use ethpay_core::{FeeBreakdown, OrderId, OrderStatus, PaymentId, fees};
use ethpay_gateway::bank::{BankClient, BankCredentials, BankSettlement};
use ethpay_gateway::config::SandboxAccount;
use ethpay_gateway::store::StoreError;
use ethpay_gateway::{ApiError, AuthDecision, AuthService};

use crate::cart::CartStore;
use crate::receipt::{CurrentOrder, PaymentReceipt, ReceiptStore};
use crate::shop::ShopClient;

/// UI path used as the auth-gate return target.
const CHECKOUT_VIEW: &str = "/checkout";

/// Where a checkout attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckoutStage {
    /// Nothing in flight.
    Idle,
    /// The order-creation call is running.
    OrderCreating,
    /// The shop accepted the order; transitions to the payment form
    /// immediately.
    OrderCreated,
    /// The bank-credential form is presented.
    PaymentFormOpen,
    /// The bank-processing call is running.
    PaymentSubmitting,
    /// Terminal: the payment settled.
    PaymentSucceeded,
    /// The bank rejected the payment or the call failed; the form is
    /// re-enterable with the same order and payment id.
    PaymentFailed,
}

/// Contact and delivery fields collected before payment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShippingDetails {
    pub name: String,
    pub email: String,
    pub address: String,
    /// Optional.
    pub phone: String,
}

/// Everything the bank-payment form needs to render.
#[derive(Debug, Clone)]
pub struct PaymentForm {
    pub order_id: OrderId,
    pub payment_id: PaymentId,
    pub amount: Decimal,
    /// Local fee estimate for display; the settled figures come from the
    /// bank response.
    pub estimated_fees: FeeBreakdown,
    /// Sandbox credentials to pre-fill, when configured.
    pub prefill: Option<BankCredentials>,
}

/// Failures of the checkout flow, in user-facing terms.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// Checkout was started with nothing in the cart.
    #[error("Your cart is empty")]
    EmptyCart,

    /// A required shipping field is blank.
    #[error("Please fill all required fields ({0})")]
    MissingField(&'static str),

    /// No session; the caller must redirect to login and come back.
    #[error("Please login to proceed with checkout")]
    NotAuthenticated {
        /// Login view to redirect to.
        login: String,
        /// Path to return to after login.
        return_to: String,
    },

    /// An operation was invoked in a stage that does not accept it.
    #[error("Checkout is not at the right step for this action")]
    InvalidStage(CheckoutStage),

    /// The bank declined the payment; the form may be resubmitted.
    #[error("Payment declined: {0}")]
    Declined(String),

    /// A backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Client state could not be persisted.
    #[error("State store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
struct PendingPayment {
    order_id: OrderId,
    payment_id: PaymentId,
    amount: Decimal,
}

/// Drives one checkout attempt.
pub struct CheckoutFlow {
    shop: ShopClient,
    bank: BankClient,
    auth: AuthService,
    cart: CartStore,
    receipts: ReceiptStore,
    sandbox: Option<SandboxAccount>,
    stage: CheckoutStage,
    pending: Option<PendingPayment>,
}

impl CheckoutFlow {
    /// Assemble the flow from its collaborators.
    ///
    /// `sandbox` supplies the optional demo-account prefill for the payment
    /// form; it comes from configuration, never from constants in this
    /// module.
    #[must_use]
    pub const fn new(
        shop: ShopClient,
        bank: BankClient,
        auth: AuthService,
        cart: CartStore,
        receipts: ReceiptStore,
        sandbox: Option<SandboxAccount>,
    ) -> Self {
        Self {
            shop,
            bank,
            auth,
            cart,
            receipts,
            sandbox,
            stage: CheckoutStage::Idle,
            pending: None,
        }
    }

    /// Current stage of the flow.
    #[must_use]
    pub const fn stage(&self) -> CheckoutStage {
        self.stage
    }

    /// Create the order and open the payment form.
    ///
    /// Gated before any network call: an active session, a non-empty cart,
    /// and the required shipping fields. On failure of the order-creation
    /// call the flow returns to `Idle`; nothing is retried automatically.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::NotAuthenticated`] when no session exists
    /// - [`CheckoutError::EmptyCart`] / [`CheckoutError::MissingField`] for
    ///   client-side validation failures
    /// - [`CheckoutError::Api`] when the shop rejects the order
    #[instrument(skip(self, shipping))]
    pub async fn proceed_to_payment(
        &mut self,
        shipping: &ShippingDetails,
    ) -> Result<PaymentForm, CheckoutError> {
        if self.stage != CheckoutStage::Idle {
            return Err(CheckoutError::InvalidStage(self.stage));
        }

        if let AuthDecision::Redirect { to, return_to } = self.auth.require_auth(CHECKOUT_VIEW) {
            return Err(CheckoutError::NotAuthenticated {
                login: to,
                return_to: return_to.unwrap_or_else(|| CHECKOUT_VIEW.to_owned()),
            });
        }

        let lines = self.cart.lines();
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        validate_shipping(shipping)?;

        let total = self.cart.total();

        self.stage = CheckoutStage::OrderCreating;
        let order = match self.shop.create_order(&lines, total, shipping).await {
            Ok(order) => order,
            Err(err) => {
                self.stage = CheckoutStage::Idle;
                return Err(err.into());
            }
        };
        self.stage = CheckoutStage::OrderCreated;

        // Older shop deployments omit the payment id; generate one so the
        // bank step still has a correlation key.
        let payment_id = order
            .payment_id
            .unwrap_or_else(|| PaymentId::new(format!("PAY-{}", Uuid::new_v4().simple())));

        let pending = PendingPayment {
            order_id: order.order_id.clone(),
            payment_id: payment_id.clone(),
            amount: total,
        };

        // Best-effort mirror for recovery across a redirect.
        if let Err(err) = self.receipts.set_current_order(&CurrentOrder {
            order_id: pending.order_id.clone(),
            payment_id: pending.payment_id.clone(),
            total,
            timestamp: chrono::Utc::now(),
        }) {
            warn!(error = %err, "failed to persist order snapshot");
        }

        self.pending = Some(pending);
        self.stage = CheckoutStage::PaymentFormOpen;

        Ok(PaymentForm {
            order_id: order.order_id,
            payment_id,
            amount: total,
            estimated_fees: fees::compute_fee(total, fees::DEFAULT_FEE_RATE),
            prefill: self.sandbox.as_ref().map(|account| BankCredentials {
                account_number: account.account_number.clone(),
                password: account.password.clone(),
            }),
        })
    }

    /// Submit bank credentials for the pending payment.
    ///
    /// Accepted from `PaymentFormOpen` and from `PaymentFailed` (the form is
    /// re-enterable after a decline, with the same order and payment id).
    /// Credentials live only for the duration of the call.
    ///
    /// On success: the shop callback is notified best-effort, the cart is
    /// cleared, and the receipt is persisted and returned.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::Declined`] when the bank rejects the payment; the
    ///   flow stays re-enterable
    /// - [`CheckoutError::Api`] for network failures (re-enterable) and for
    ///   an expired session (which abandons the attempt)
    #[instrument(skip(self, credentials))]
    pub async fn submit_payment(
        &mut self,
        credentials: &BankCredentials,
    ) -> Result<PaymentReceipt, CheckoutError> {
        if !matches!(
            self.stage,
            CheckoutStage::PaymentFormOpen | CheckoutStage::PaymentFailed
        ) {
            return Err(CheckoutError::InvalidStage(self.stage));
        }
        let Some(pending) = self.pending.clone() else {
            return Err(CheckoutError::InvalidStage(self.stage));
        };

        self.stage = CheckoutStage::PaymentSubmitting;
        let settlement = match self
            .bank
            .process_payment(&pending.payment_id, credentials, pending.amount)
            .await
        {
            Ok(settlement) => settlement,
            Err(ApiError::Declined(reason)) => {
                self.stage = CheckoutStage::PaymentFailed;
                return Err(CheckoutError::Declined(reason));
            }
            Err(err @ ApiError::Auth) => {
                // Forced logout abandons the attempt; the created order
                // stays pending server-side.
                self.stage = CheckoutStage::Idle;
                self.pending = None;
                return Err(err.into());
            }
            Err(err) => {
                self.stage = CheckoutStage::PaymentFailed;
                return Err(err.into());
            }
        };

        self.settle(&pending, settlement).await
    }

    /// Complete a settled payment: callback, cart clear, receipt.
    async fn settle(
        &mut self,
        pending: &PendingPayment,
        settlement: BankSettlement,
    ) -> Result<PaymentReceipt, CheckoutError> {
        // Payment already succeeded; a failed callback must not fail the
        // flow. The shop reconciles pending orders out of band.
        if let Err(err) = self
            .shop
            .payment_callback(&pending.payment_id, "success", &settlement.transaction_id)
            .await
        {
            warn!(error = %err, "payment callback failed after successful settlement");
        }

        if let Err(err) = self.cart.clear() {
            warn!(error = %err, "failed to clear cart after payment");
        }

        // The bank's figures are authoritative; the local calculator only
        // ever produced the display estimate.
        let receipt = PaymentReceipt {
            order_id: pending.order_id.clone(),
            transaction_id: settlement.transaction_id,
            amount: pending.amount,
            fee_breakdown: FeeBreakdown {
                total: pending.amount,
                service_fee: settlement.service_fee,
                merchant_received: settlement.merchant_received,
            },
            status: OrderStatus::Completed,
            payment_method: "bank_transfer".to_owned(),
            timestamp: chrono::Utc::now(),
        };

        self.receipts.set_last_payment(&receipt)?;
        if let Err(err) = self.receipts.clear_current_order() {
            warn!(error = %err, "failed to drop order snapshot");
        }

        self.stage = CheckoutStage::PaymentSucceeded;
        self.pending = None;
        Ok(receipt)
    }

    /// Abandon the attempt and return to `Idle`.
    ///
    /// No rollback call is made; a created order stays `pending` server-side
    /// and is reconciled there.
    pub fn cancel(&mut self) {
        self.stage = CheckoutStage::Idle;
        self.pending = None;
        if let Err(err) = self.receipts.clear_current_order() {
            warn!(error = %err, "failed to drop order snapshot on cancel");
        }
    }
}

impl std::fmt::Debug for CheckoutFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutFlow")
            .field("stage", &self.stage)
            .finish_non_exhaustive()
    }
}

fn validate_shipping(shipping: &ShippingDetails) -> Result<(), CheckoutError> {
    if shipping.name.trim().is_empty() {
        return Err(CheckoutError::MissingField("name"));
    }
    if shipping.email.trim().is_empty() {
        return Err(CheckoutError::MissingField("email"));
    }
    if shipping.address.trim().is_empty() {
        return Err(CheckoutError::MissingField("address"));
    }
    Ok(())
}
