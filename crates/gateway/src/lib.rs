//! EthPay payment-gateway client.
//!
//! Typed client for the EthPay REST API: authentication with JWT
//! refresh-and-retry, account views, the payment lifecycle, and the bank
//! payment processor. State that the browser apps kept in `localStorage`
//! (tokens, cached profile, receipts) lives behind the injected
//! [`store::KeyValueStore`] abstraction instead.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ethpay_gateway::{ApiClient, AuthService, GatewayConfig, MemoryStore, SessionStore};
//!
//! let config = GatewayConfig::from_env()?;
//! let session = SessionStore::new(Arc::new(MemoryStore::new()));
//! let client = ApiClient::new(&config, session.clone())?;
//!
//! let auth = AuthService::new(client.clone(), session.clone());
//! auth.login("customer@demo.com", "secret", None).await?;
//!
//! // Subsequent requests carry `Authorization: Bearer <access>` and survive
//! // access-token expiry via a single transparent refresh-and-retry.
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
pub mod auth;
pub mod bank;
pub mod client;
pub mod config;
pub mod error;
pub mod payment;
pub mod session;
pub mod store;

pub use account::AccountService;
pub use auth::{AuthDecision, AuthService};
pub use bank::BankClient;
pub use client::ApiClient;
pub use config::{ConfigError, GatewayConfig, SandboxAccount};
pub use error::ApiError;
pub use payment::PaymentService;
pub use session::{AuthTokens, SessionStore, UserProfile};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
