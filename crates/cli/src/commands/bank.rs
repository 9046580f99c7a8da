//! Bank sandbox commands.

use clap::Subcommand;
use secrecy::SecretString;

use ethpay_core::{AccountNumber, Money};
use ethpay_gateway::bank::BankCredentials;

use super::{CliContext, CliError};

#[derive(Subcommand)]
pub enum BankAction {
    /// Create or reset the sandbox demo accounts
    DemoSetup,
    /// Check bank credentials without moving money
    Verify {
        /// Bank account number
        #[arg(long)]
        account: String,

        /// Account password
        #[arg(long, env = "ETHPAY_BANK_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

pub async fn run(ctx: &CliContext, action: BankAction) -> Result<(), CliError> {
    match action {
        BankAction::DemoSetup => {
            ctx.bank.create_demo_accounts().await?;
            tracing::info!("Demo accounts created/verified");
        }
        BankAction::Verify { account, password } => {
            let verification = ctx
                .bank
                .verify_account(&BankCredentials {
                    account_number: AccountNumber::new(account),
                    password: SecretString::from(password),
                })
                .await?;

            if verification.verified {
                match verification.balance {
                    Some(balance) => tracing::info!("Verified. Balance: {}", Money::new(balance)),
                    None => tracing::info!("Verified."),
                }
            } else {
                tracing::info!(
                    "Not verified: {}",
                    verification.error.unwrap_or_else(|| "unknown reason".to_owned())
                );
            }
        }
    }
    Ok(())
}
