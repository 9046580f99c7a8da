//! EthPay Core - Shared types library.
//!
//! This crate provides common types used across all EthPay client components:
//! - `gateway` - Client for the payment-gateway API (auth, payments, bank)
//! - `storefront` - Client for the e-commerce shop API (cart, checkout)
//! - `cli` - Command-line driver for the full payment flow
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, emails, and statuses
//! - [`fees`] - Service-fee arithmetic shared by the checkout flow and receipts

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod fees;
pub mod types;

pub use fees::{FeeBreakdown, compute_fee};
pub use types::*;
