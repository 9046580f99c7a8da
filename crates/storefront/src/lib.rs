//! EthPay storefront client.
//!
//! The e-commerce side of the EthPay client workspace: product catalog
//! access, the client-held cart, and the checkout flow that sequences order
//! creation, bank payment, and the post-payment callback against the shop
//! and gateway backends.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod receipt;
pub mod shop;

pub use cart::{CartLine, CartStore};
pub use catalog::{CatalogClient, Product};
pub use checkout::{CheckoutError, CheckoutFlow, CheckoutStage, PaymentForm, ShippingDetails};
pub use receipt::{CurrentOrder, PaymentReceipt, ReceiptStore};
pub use shop::{CreatedOrder, ShopClient};
