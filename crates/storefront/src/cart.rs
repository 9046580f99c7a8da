//! Client-held shopping cart.
//!
//! An ordered list of line items persisted in the injected key/value store.
//! Adding an existing product merges into its line; a quantity dropping to
//! zero removes the line, so a stored quantity is always at least one.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use ethpay_core::ProductId;

use ethpay_gateway::store::{self, KeyValueStore, StoreError, keys};

/// One cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(rename = "id")]
    pub product_id: ProductId,
    pub name: String,
    #[serde(rename = "price")]
    pub unit_price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub category: String,
}

impl CartLine {
    /// Line total: unit price times quantity.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Typed facade over the injected [`KeyValueStore`] for the cart.
#[derive(Clone)]
pub struct CartStore {
    store: Arc<dyn KeyValueStore>,
}

impl CartStore {
    /// Wrap a key/value store.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Current cart contents, oldest line first.
    ///
    /// A missing or malformed stored cart reads as empty.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        store::get_json(self.store.as_ref(), keys::CART).unwrap_or_default()
    }

    /// True when no lines are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }

    /// Total quantity across all lines, for the cart badge.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines().iter().map(|line| line.quantity).sum()
    }

    /// Cart total in exact decimal arithmetic.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines().iter().map(CartLine::total).sum()
    }

    /// Add `quantity` of a product.
    ///
    /// If the product is already in the cart its line quantity grows; the
    /// line is never duplicated. Adding zero is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the cart cannot be persisted.
    pub fn add(&self, line: CartLine) -> Result<(), StoreError> {
        if line.quantity == 0 {
            return Ok(());
        }

        let mut lines = self.lines();
        if let Some(existing) = lines
            .iter_mut()
            .find(|existing| existing.product_id == line.product_id)
        {
            existing.quantity += line.quantity;
        } else {
            lines.push(line);
        }
        self.persist(&lines)
    }

    /// Set the quantity of a product's line; zero removes the line.
    ///
    /// Setting a quantity for a product that is not in the cart is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the cart cannot be persisted.
    pub fn set_quantity(&self, product_id: ProductId, quantity: u32) -> Result<(), StoreError> {
        let mut lines = self.lines();
        if quantity == 0 {
            lines.retain(|line| line.product_id != product_id);
        } else if let Some(line) = lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
        {
            line.quantity = quantity;
        } else {
            return Ok(());
        }
        self.persist(&lines)
    }

    /// Remove a product's line entirely.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the cart cannot be persisted.
    pub fn remove(&self, product_id: ProductId) -> Result<(), StoreError> {
        let mut lines = self.lines();
        lines.retain(|line| line.product_id != product_id);
        self.persist(&lines)
    }

    /// Empty the cart (successful order placement, or explicit clear).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the removal cannot be persisted.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(keys::CART)
    }

    fn persist(&self, lines: &[CartLine]) -> Result<(), StoreError> {
        store::set_json(self.store.as_ref(), keys::CART, &lines)
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("items", &self.item_count())
            .finish()
    }
}
