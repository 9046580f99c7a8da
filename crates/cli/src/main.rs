//! EthPay CLI - drives the payment-gateway and shop flows end to end.
//!
//! # Usage
//!
//! ```bash
//! # Create an account and log in
//! ethpay auth register -e customer@demo.com -n "Demo Customer" --phone +251911111111 -p <password>
//! ethpay auth login -e customer@demo.com -p <password>
//!
//! # Browse and fill the cart
//! ethpay shop products
//! ethpay cart add --product 1 --qty 2
//! ethpay cart list
//!
//! # Check out (uses ETHPAY_SANDBOX_* credentials unless given explicitly)
//! ethpay checkout --name "Demo Customer" --email customer@demo.com \
//!     --address "Bole Road, Addis Ababa"
//!
//! # Account views
//! ethpay account overview
//! ```
//!
//! # Environment Variables
//!
//! - `ETHPAY_API_URL` / `ETHPAY_SHOP_API_URL` - backend base URLs
//! - `ETHPAY_STATE_FILE` - where session/cart state is persisted
//!   (default: `$HOME/.ethpay/state.json`)
//! - `ETHPAY_SANDBOX_ACCOUNT` / `ETHPAY_SANDBOX_PASSWORD` - demo bank account

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

use commands::CliContext;

#[derive(Parser)]
#[command(name = "ethpay")]
#[command(author, version, about = "EthPay payment-gateway CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register, log in, log out, inspect the session
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Dashboard, transactions, and notifications
    Account {
        #[command(subcommand)]
        action: commands::account::AccountAction,
    },
    /// Browse the shop catalog
    Shop {
        #[command(subcommand)]
        action: commands::shop::ShopAction,
    },
    /// Manage the local cart
    Cart {
        #[command(subcommand)]
        action: commands::cart::CartAction,
    },
    /// Run the checkout flow end to end
    Checkout(commands::checkout::CheckoutArgs),
    /// Gateway payment lifecycle (initiate, process, cancel, show)
    Pay {
        #[command(subcommand)]
        action: commands::payment::PayAction,
    },
    /// Bank sandbox helpers
    Bank {
        #[command(subcommand)]
        action: commands::bank::BankAction,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    let ctx = CliContext::from_env()?;

    match cli.command {
        Commands::Auth { action } => commands::auth::run(&ctx, action).await?,
        Commands::Account { action } => commands::account::run(&ctx, action).await?,
        Commands::Shop { action } => commands::shop::run(&ctx, action).await?,
        Commands::Cart { action } => commands::cart::run(&ctx, action).await?,
        Commands::Checkout(args) => commands::checkout::run(&ctx, args).await?,
        Commands::Pay { action } => commands::payment::run(&ctx, action).await?,
        Commands::Bank { action } => commands::bank::run(&ctx, action).await?,
    }
    Ok(())
}
