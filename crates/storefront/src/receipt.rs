//! Order and payment receipts mirrored into the client state store.
//!
//! The checkout flow writes a snapshot of the in-flight order before the
//! payment step and a full receipt after it, so a success view (or a
//! restarted process) can recover the details without re-asking the backend.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use ethpay_core::{FeeBreakdown, OrderId, OrderStatus, PaymentId, TransactionId};
use ethpay_gateway::store::{self, KeyValueStore, StoreError, keys};

/// Snapshot of an order that has been created but not yet paid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentOrder {
    pub order_id: OrderId,
    pub payment_id: PaymentId,
    pub total: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// Receipt of a settled payment, shown on the success view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub order_id: OrderId,
    pub transaction_id: TransactionId,
    pub amount: Decimal,
    pub fee_breakdown: FeeBreakdown,
    pub status: OrderStatus,
    pub payment_method: String,
    pub timestamp: DateTime<Utc>,
}

/// Typed facade over the injected [`KeyValueStore`] for receipts.
#[derive(Clone)]
pub struct ReceiptStore {
    store: Arc<dyn KeyValueStore>,
}

impl ReceiptStore {
    /// Wrap a key/value store.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The in-flight order, if one was snapshotted.
    #[must_use]
    pub fn current_order(&self) -> Option<CurrentOrder> {
        store::get_json(self.store.as_ref(), keys::CURRENT_ORDER)
    }

    /// Snapshot an order ahead of the payment step.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the snapshot cannot be persisted.
    pub fn set_current_order(&self, order: &CurrentOrder) -> Result<(), StoreError> {
        store::set_json(self.store.as_ref(), keys::CURRENT_ORDER, order)
    }

    /// Drop the in-flight order snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the removal cannot be persisted.
    pub fn clear_current_order(&self) -> Result<(), StoreError> {
        self.store.remove(keys::CURRENT_ORDER)
    }

    /// The most recent settled payment, if any.
    #[must_use]
    pub fn last_payment(&self) -> Option<PaymentReceipt> {
        store::get_json(self.store.as_ref(), keys::LAST_PAYMENT)
    }

    /// Record a settled payment.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the receipt cannot be persisted.
    pub fn set_last_payment(&self, receipt: &PaymentReceipt) -> Result<(), StoreError> {
        store::set_json(self.store.as_ref(), keys::LAST_PAYMENT, receipt)
    }
}

impl std::fmt::Debug for ReceiptStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReceiptStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ethpay_core::fees;
    use ethpay_gateway::store::MemoryStore;
    use rust_decimal_macros::dec;

    #[test]
    fn test_current_order_roundtrip() {
        let receipts = ReceiptStore::new(Arc::new(MemoryStore::new()));
        assert!(receipts.current_order().is_none());

        let order = CurrentOrder {
            order_id: OrderId::new("ORD-1"),
            payment_id: PaymentId::new("PAY-1"),
            total: dec!(200.00),
            timestamp: Utc::now(),
        };
        receipts.set_current_order(&order).unwrap();
        assert_eq!(receipts.current_order(), Some(order));

        receipts.clear_current_order().unwrap();
        assert!(receipts.current_order().is_none());
    }

    #[test]
    fn test_last_payment_roundtrip() {
        let receipts = ReceiptStore::new(Arc::new(MemoryStore::new()));

        let receipt = PaymentReceipt {
            order_id: OrderId::new("ORD-1"),
            transaction_id: TransactionId::new("TXN-1"),
            amount: dec!(200.00),
            fee_breakdown: fees::compute_fee(dec!(200.00), fees::DEFAULT_FEE_RATE),
            status: OrderStatus::Completed,
            payment_method: "bank_transfer".into(),
            timestamp: Utc::now(),
        };
        receipts.set_last_payment(&receipt).unwrap();

        let loaded = receipts.last_payment().unwrap();
        assert_eq!(loaded, receipt);
        assert_eq!(
            loaded.fee_breakdown.service_fee + loaded.fee_breakdown.merchant_received,
            loaded.amount
        );
    }
}
