//! Account view commands: dashboard, transactions, notifications.

use clap::Subcommand;

use ethpay_core::Money;

use super::{CliContext, CliError};

#[derive(Subcommand)]
pub enum AccountAction {
    /// Role-specific dashboard layout
    Dashboard,
    /// Transaction history
    Transactions,
    /// Notifications
    Notifications,
    /// All three views, fetched concurrently
    Overview,
}

pub async fn run(ctx: &CliContext, action: AccountAction) -> Result<(), CliError> {
    match action {
        AccountAction::Dashboard => {
            let dashboard = ctx.account.dashboard().await?;
            tracing::info!("Dashboard ({} widgets):", dashboard.widgets.len());
            for widget in &dashboard.widgets {
                tracing::info!("  [{}] {}", widget.kind, widget.title);
            }
        }
        AccountAction::Transactions => {
            let transactions = ctx.account.transactions().await?;
            if transactions.is_empty() {
                tracing::info!("No transactions yet");
            }
            for tx in &transactions {
                tracing::info!(
                    "  {}  {}  {}",
                    tx.transaction_id,
                    Money::new(tx.amount),
                    tx.status
                );
            }
        }
        AccountAction::Notifications => {
            let notifications = ctx.account.notifications().await?;
            if notifications.is_empty() {
                tracing::info!("No notifications");
            }
            for note in &notifications {
                tracing::info!("  [{}] {}", note.kind, note.message);
            }
        }
        AccountAction::Overview => {
            let overview = ctx.account.overview().await?;
            tracing::info!(
                "Dashboard: {} widgets | {} transactions | {} notifications",
                overview.dashboard.widgets.len(),
                overview.transactions.len(),
                overview.notifications.len()
            );
        }
    }
    Ok(())
}
