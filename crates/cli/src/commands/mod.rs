//! CLI command implementations.

pub mod account;
pub mod auth;
pub mod bank;
pub mod cart;
pub mod checkout;
pub mod payment;
pub mod shop;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use ethpay_gateway::store::{FileStore, KeyValueStore, StoreError};
use ethpay_gateway::{
    AccountService, ApiClient, ApiError, AuthService, BankClient, ConfigError, GatewayConfig,
    PaymentService, SessionStore,
};
use ethpay_storefront::{CartStore, CatalogClient, CheckoutError, ReceiptStore, ShopClient};

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The checkout flow failed.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// Client state could not be persisted.
    #[error("State store error: {0}")]
    Store(#[from] StoreError),

    /// A command argument was unusable.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Shared wiring for all commands: config, state store, and the service
/// clients, all bound to one session.
pub struct CliContext {
    pub config: GatewayConfig,
    pub session: SessionStore,
    pub auth: AuthService,
    pub account: AccountService,
    pub payments: PaymentService,
    pub bank: BankClient,
    pub catalog: CatalogClient,
    pub shop: ShopClient,
    pub cart: CartStore,
    pub receipts: ReceiptStore,
}

impl CliContext {
    /// Build the context from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`CliError`] if configuration is invalid or the state file
    /// cannot be opened.
    pub fn from_env() -> Result<Self, CliError> {
        let config = GatewayConfig::from_env()?;

        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(state_file_path())?);
        let session = SessionStore::new(Arc::clone(&store));

        let gateway_client = ApiClient::new(&config, session.clone())?;
        let shop_client = ApiClient::for_shop(&config, session.clone())?;

        Ok(Self {
            auth: AuthService::new(gateway_client.clone(), session.clone()),
            account: AccountService::new(gateway_client.clone()),
            payments: PaymentService::new(gateway_client.clone()),
            bank: BankClient::new(gateway_client),
            catalog: CatalogClient::new(shop_client.clone()),
            shop: ShopClient::new(shop_client),
            cart: CartStore::new(Arc::clone(&store)),
            receipts: ReceiptStore::new(store),
            session,
            config,
        })
    }
}

/// Where session/cart state lives between invocations.
fn state_file_path() -> PathBuf {
    if let Ok(path) = std::env::var("ETHPAY_STATE_FILE") {
        return PathBuf::from(path);
    }
    std::env::var("HOME").map_or_else(
        |_| PathBuf::from(".ethpay/state.json"),
        |home| PathBuf::from(home).join(".ethpay").join("state.json"),
    )
}
