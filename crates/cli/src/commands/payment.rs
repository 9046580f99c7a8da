//! Gateway payment lifecycle commands.

use clap::Subcommand;
use rust_decimal::Decimal;
use uuid::Uuid;

use ethpay_core::{Money, PaymentId, UserId};
use ethpay_gateway::payment::NewPayment;

use super::{CliContext, CliError};

#[derive(Subcommand)]
pub enum PayAction {
    /// Create a pending wallet payment
    Initiate {
        /// Amount in ETB
        #[arg(short, long)]
        amount: Decimal,

        /// Recipient user id (UUID)
        #[arg(short, long)]
        recipient: String,
    },
    /// Process a pending payment
    Process {
        /// Payment id
        #[arg(long)]
        id: String,
    },
    /// Cancel a pending payment
    Cancel {
        /// Payment id
        #[arg(long)]
        id: String,
    },
    /// Show a payment
    Show {
        /// Payment id
        #[arg(long)]
        id: String,
    },
}

pub async fn run(ctx: &CliContext, action: PayAction) -> Result<(), CliError> {
    match action {
        PayAction::Initiate { amount, recipient } => {
            let recipient = recipient
                .parse::<Uuid>()
                .map_err(|e| CliError::InvalidInput(format!("recipient must be a UUID: {e}")))?;
            let payment = ctx
                .payments
                .initiate(&NewPayment::wallet(amount, UserId::new(recipient)))
                .await?;
            tracing::info!(
                "Payment {} initiated: {} ({:?})",
                payment.payment_id,
                Money::new(payment.amount),
                payment.status
            );
        }
        PayAction::Process { id } => {
            let processed = ctx.payments.process(&PaymentId::new(id)).await?;
            tracing::info!("{}", processed.message);
            tracing::info!("  Transaction: {}", processed.transaction_id);
            tracing::info!("  Receipt: {}", processed.receipt_id);
        }
        PayAction::Cancel { id } => {
            ctx.payments.cancel(&PaymentId::new(id)).await?;
            tracing::info!("Payment cancelled");
        }
        PayAction::Show { id } => {
            let payment = ctx.payments.details(&PaymentId::new(id)).await?;
            tracing::info!(
                "Payment {}: {} ({:?})",
                payment.payment_id,
                Money::new(payment.amount),
                payment.status
            );
        }
    }
    Ok(())
}
