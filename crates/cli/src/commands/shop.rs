//! Catalog commands.

use clap::Subcommand;

use ethpay_core::Money;

use super::{CliContext, CliError};

#[derive(Subcommand)]
pub enum ShopAction {
    /// List products, optionally filtered by category
    Products {
        /// Only show this category
        #[arg(short, long)]
        category: Option<String>,
    },
}

pub async fn run(ctx: &CliContext, action: ShopAction) -> Result<(), CliError> {
    match action {
        ShopAction::Products { category } => {
            let products = match category {
                Some(category) => ctx.catalog.products_in_category(&category).await?,
                None => ctx.catalog.list_products().await?,
            };

            if products.is_empty() {
                tracing::info!("No products found");
            }
            for product in &products {
                tracing::info!(
                    "  #{}  {}  {}  ({})",
                    product.id,
                    product.name,
                    Money::new(product.price),
                    product.category
                );
            }
        }
    }
    Ok(())
}
