//! Service-fee arithmetic.
//!
//! The gateway deducts a fixed percentage from every payment as a service
//! fee; the merchant receives the remainder. The split is computed here with
//! exact decimal arithmetic: the fee is rounded half-up to two decimal
//! places and the merchant payout is derived by subtraction, so
//! `service_fee + merchant_received == total` holds for every input.
//!
//! The gateway's own calculator is authoritative when reachable (see the
//! `fee/calculate/` endpoint in `ethpay-gateway`); this module is the local
//! mirror used for display and as the offline fallback.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Default service-fee rate: 2%.
pub const DEFAULT_FEE_RATE: Decimal = Decimal::from_parts(2, 0, 0, false, 2);

/// Minimum service fee the gateway charges on any non-zero payment.
pub const MINIMUM_FEE: Decimal = Decimal::from_parts(50, 0, 0, false, 2);

/// How a payment total splits between the service fee and the merchant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    /// The full amount the customer pays.
    pub total: Decimal,
    /// The gateway's cut, rounded half-up to two decimal places.
    pub service_fee: Decimal,
    /// What the merchant receives: always exactly `total - service_fee`.
    pub merchant_received: Decimal,
}

/// Split `total` into a service fee and a merchant payout at the given rate.
///
/// The fee is `total * rate` rounded half-up to two decimal places; the
/// merchant payout is the subtraction remainder rather than an independently
/// rounded product, which is what makes the sum invariant exact.
#[must_use]
pub fn compute_fee(total: Decimal, rate: Decimal) -> FeeBreakdown {
    let service_fee =
        (total * rate).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    FeeBreakdown {
        total,
        service_fee,
        merchant_received: total - service_fee,
    }
}

/// Like [`compute_fee`], but applies the gateway's minimum-fee floor.
///
/// Payments small enough that the percentage fee would fall below
/// [`MINIMUM_FEE`] are charged the minimum instead. A zero total stays free.
#[must_use]
pub fn compute_fee_with_minimum(total: Decimal, rate: Decimal) -> FeeBreakdown {
    let mut breakdown = compute_fee(total, rate);
    if total > Decimal::ZERO && breakdown.service_fee < MINIMUM_FEE {
        breakdown.service_fee = MINIMUM_FEE;
        breakdown.merchant_received = total - MINIMUM_FEE;
    }
    breakdown
}
