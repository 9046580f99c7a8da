//! End-to-end checkout command.
//!
//! Runs the full flow: order creation, bank payment, callback. Bank
//! credentials come from the arguments or fall back to the configured
//! sandbox account.

use clap::Args;
use secrecy::SecretString;

use ethpay_core::{AccountNumber, Money};
use ethpay_gateway::bank::BankCredentials;
use ethpay_storefront::{CheckoutFlow, ShippingDetails};

use super::{CliContext, CliError};

#[derive(Args)]
pub struct CheckoutArgs {
    /// Recipient full name
    #[arg(long)]
    name: String,

    /// Contact email
    #[arg(long)]
    email: String,

    /// Shipping address
    #[arg(long)]
    address: String,

    /// Phone number
    #[arg(long, default_value = "")]
    phone: String,

    /// Bank account number (default: the configured sandbox account)
    #[arg(long)]
    account: Option<String>,

    /// Bank password (default: the configured sandbox password)
    #[arg(long, env = "ETHPAY_BANK_PASSWORD", hide_env_values = true)]
    bank_password: Option<String>,
}

pub async fn run(ctx: &CliContext, args: CheckoutArgs) -> Result<(), CliError> {
    let mut flow = CheckoutFlow::new(
        ctx.shop.clone(),
        ctx.bank.clone(),
        ctx.auth.clone(),
        ctx.cart.clone(),
        ctx.receipts.clone(),
        ctx.config.sandbox.clone(),
    );

    let form = flow
        .proceed_to_payment(&ShippingDetails {
            name: args.name,
            email: args.email,
            address: args.address,
            phone: args.phone,
        })
        .await?;

    tracing::info!("Order {} created", form.order_id);
    tracing::info!("  Payment ID: {}", form.payment_id);
    tracing::info!("  Amount: {}", Money::new(form.amount));
    tracing::info!(
        "  Estimated fee: {} (merchant receives {})",
        Money::new(form.estimated_fees.service_fee),
        Money::new(form.estimated_fees.merchant_received)
    );

    let credentials = match (args.account, args.bank_password) {
        (Some(account), Some(password)) => BankCredentials {
            account_number: AccountNumber::new(account),
            password: SecretString::from(password),
        },
        (None, None) => form.prefill.ok_or_else(|| {
            CliError::InvalidInput(
                "no bank credentials given and no sandbox account configured \
                 (set ETHPAY_SANDBOX_ACCOUNT / ETHPAY_SANDBOX_PASSWORD)"
                    .to_owned(),
            )
        })?,
        _ => {
            return Err(CliError::InvalidInput(
                "give both --account and --bank-password, or neither".to_owned(),
            ));
        }
    };

    let receipt = flow.submit_payment(&credentials).await?;

    tracing::info!("Payment successful!");
    tracing::info!("  Transaction: {}", receipt.transaction_id);
    tracing::info!("  Total: {}", Money::new(receipt.amount));
    tracing::info!("  Service fee: {}", Money::new(receipt.fee_breakdown.service_fee));
    tracing::info!(
        "  Merchant received: {}",
        Money::new(receipt.fee_breakdown.merchant_received)
    );
    Ok(())
}
