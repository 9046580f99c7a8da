//! Integration test harness for the EthPay client workspace.
//!
//! Spins up `wiremock` stand-ins for the gateway and shop backends and wires
//! every client to one in-memory state store, the same way the CLI wires
//! them to the file store.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p ethpay-integration-tests
//! ```

// Test-support crate: failing fast on bad wiring is the point.
#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use wiremock::MockServer;

use ethpay_gateway::store::{KeyValueStore, MemoryStore};
use ethpay_gateway::{
    AccountService, ApiClient, AuthService, AuthTokens, BankClient, GatewayConfig, SessionStore,
};
use ethpay_storefront::{CartStore, CheckoutFlow, ReceiptStore, ShopClient};

/// Mock backends plus a fully wired set of clients sharing one store.
pub struct TestHarness {
    pub gateway: MockServer,
    pub shop: MockServer,
    pub store: Arc<dyn KeyValueStore>,
    pub session: SessionStore,
    pub config: GatewayConfig,
}

impl TestHarness {
    /// Start both mock backends and wire the store.
    ///
    /// # Panics
    ///
    /// Panics if the mock servers cannot be started (test-only code).
    #[must_use]
    pub async fn start() -> Self {
        let gateway = MockServer::start().await;
        let shop = MockServer::start().await;

        let config = GatewayConfig::with_urls(
            &format!("{}/api", gateway.uri()),
            &format!("{}/api", shop.uri()),
        )
        .unwrap();

        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let session = SessionStore::new(Arc::clone(&store));

        Self {
            gateway,
            shop,
            store,
            session,
            config,
        }
    }

    /// Pretend a login already happened.
    ///
    /// # Panics
    ///
    /// Panics if the in-memory store rejects the write (it never does).
    pub fn seed_session(&self, access: &str, refresh: &str) {
        self.session
            .set_tokens(&AuthTokens {
                access: access.to_owned(),
                refresh: refresh.to_owned(),
            })
            .unwrap();
    }

    /// A client for the gateway surface.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (test-only code).
    #[must_use]
    pub fn gateway_client(&self) -> ApiClient {
        ApiClient::new(&self.config, self.session.clone()).unwrap()
    }

    /// A client for the shop surface.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (test-only code).
    #[must_use]
    pub fn shop_client(&self) -> ApiClient {
        ApiClient::for_shop(&self.config, self.session.clone()).unwrap()
    }

    #[must_use]
    pub fn auth(&self) -> AuthService {
        AuthService::new(self.gateway_client(), self.session.clone())
    }

    #[must_use]
    pub fn account(&self) -> AccountService {
        AccountService::new(self.gateway_client())
    }

    #[must_use]
    pub fn cart(&self) -> CartStore {
        CartStore::new(Arc::clone(&self.store))
    }

    #[must_use]
    pub fn receipts(&self) -> ReceiptStore {
        ReceiptStore::new(Arc::clone(&self.store))
    }

    /// A checkout flow wired like the CLI wires it.
    #[must_use]
    pub fn checkout_flow(&self) -> CheckoutFlow {
        CheckoutFlow::new(
            ShopClient::new(self.shop_client()),
            BankClient::new(self.gateway_client()),
            self.auth(),
            self.cart(),
            self.receipts(),
            self.config.sandbox.clone(),
        )
    }
}
