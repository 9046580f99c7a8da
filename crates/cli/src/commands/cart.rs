//! Local cart commands.
//!
//! The cart lives in the state file; nothing here talks to the backend
//! except `add`, which looks the product up in the catalog so the stored
//! line carries the real name and price.

use clap::Subcommand;

use ethpay_core::{Money, ProductId};
use ethpay_storefront::CartLine;

use super::{CliContext, CliError};

#[derive(Subcommand)]
pub enum CartAction {
    /// Add a product from the catalog
    Add {
        /// Product id
        #[arg(long)]
        product: i64,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        qty: u32,
    },
    /// Remove a product's line
    Remove {
        /// Product id
        #[arg(long)]
        product: i64,
    },
    /// Set a line's quantity (0 removes it)
    SetQty {
        /// Product id
        #[arg(long)]
        product: i64,

        /// New quantity
        #[arg(short, long)]
        qty: u32,
    },
    /// Show the cart
    List,
    /// Empty the cart
    Clear,
}

pub async fn run(ctx: &CliContext, action: CartAction) -> Result<(), CliError> {
    match action {
        CartAction::Add { product, qty } => {
            let product = ctx.catalog.get_product(ProductId::new(product)).await?;
            ctx.cart.add(CartLine {
                product_id: product.id,
                name: product.name.clone(),
                unit_price: product.price,
                quantity: qty,
                category: product.category,
            })?;
            tracing::info!("Added {} x {}", qty, product.name);
        }
        CartAction::Remove { product } => {
            ctx.cart.remove(ProductId::new(product))?;
            tracing::info!("Removed product #{product}");
        }
        CartAction::SetQty { product, qty } => {
            ctx.cart.set_quantity(ProductId::new(product), qty)?;
            tracing::info!("Set product #{product} quantity to {qty}");
        }
        CartAction::List => {
            let lines = ctx.cart.lines();
            if lines.is_empty() {
                tracing::info!("Cart is empty");
                return Ok(());
            }
            for line in &lines {
                tracing::info!(
                    "  #{}  {}  {} x {} = {}",
                    line.product_id,
                    line.name,
                    line.quantity,
                    Money::new(line.unit_price),
                    Money::new(line.total())
                );
            }
            tracing::info!("Total: {}", Money::new(ctx.cart.total()));
        }
        CartAction::Clear => {
            ctx.cart.clear()?;
            tracing::info!("Cart cleared");
        }
    }
    Ok(())
}
