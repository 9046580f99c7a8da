//! Gateway client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `ETHPAY_API_URL` - Base URL of the payment-gateway API
//!   (default: `http://localhost:8001/api/`)
//! - `ETHPAY_SHOP_API_URL` - Base URL of the e-commerce shop API
//!   (default: `http://localhost:8000/api/`)
//! - `ETHPAY_TIMEOUT_MS` - Request timeout in milliseconds (default: 10000)
//! - `ETHPAY_SANDBOX_ACCOUNT` - Demo bank account number used to pre-fill
//!   the bank-payment form in sandbox mode
//! - `ETHPAY_SANDBOX_PASSWORD` - Password for the sandbox bank account
//!
//! The defaults match the local development ports of the two backends. In a
//! deployed build both URLs must be set explicitly; sandbox credentials are
//! only ever read from the environment, never compiled in.

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use ethpay_core::AccountNumber;

const DEFAULT_GATEWAY_URL: &str = "http://localhost:8001/api/";
const DEFAULT_SHOP_URL: &str = "http://localhost:8000/api/";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Sandbox account requires both ETHPAY_SANDBOX_ACCOUNT and ETHPAY_SANDBOX_PASSWORD")]
    IncompleteSandboxAccount,
}

/// Gateway client configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the payment-gateway API (auth, payments, bank).
    pub gateway_url: Url,
    /// Base URL of the e-commerce shop API (catalog, orders, callbacks).
    pub shop_url: Url,
    /// Per-request timeout; requests exceeding it are treated as failed.
    pub timeout: Duration,
    /// Demo bank account used to pre-fill the sandbox payment form.
    pub sandbox: Option<SandboxAccount>,
}

/// A demo bank account for the sandbox payment flow.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct SandboxAccount {
    /// Bank account number.
    pub account_number: AccountNumber,
    /// Account password, kept out of logs and `Debug` output.
    pub password: SecretString,
}

impl std::fmt::Debug for SandboxAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SandboxAccount")
            .field("account_number", &self.account_number)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a URL or numeric variable fails to parse, or
    /// if only one half of the sandbox credential pair is set.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let gateway_url = parse_url_env("ETHPAY_API_URL", DEFAULT_GATEWAY_URL)?;
        let shop_url = parse_url_env("ETHPAY_SHOP_API_URL", DEFAULT_SHOP_URL)?;

        let timeout_ms = get_env_or_default("ETHPAY_TIMEOUT_MS", &DEFAULT_TIMEOUT_MS.to_string())
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar("ETHPAY_TIMEOUT_MS".to_owned(), e.to_string()))?;

        let sandbox = sandbox_from_env()?;

        Ok(Self {
            gateway_url,
            shop_url,
            timeout: Duration::from_millis(timeout_ms),
            sandbox,
        })
    }

    /// A configuration pointing at explicit base URLs, with defaults for the
    /// rest. Used by tests and by callers that manage their own settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if either URL fails to parse.
    pub fn with_urls(gateway_url: &str, shop_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            gateway_url: parse_url("ETHPAY_API_URL", gateway_url)?,
            shop_url: parse_url("ETHPAY_SHOP_API_URL", shop_url)?,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            sandbox: None,
        })
    }
}

fn sandbox_from_env() -> Result<Option<SandboxAccount>, ConfigError> {
    let account = get_optional_env("ETHPAY_SANDBOX_ACCOUNT");
    let password = get_optional_env("ETHPAY_SANDBOX_PASSWORD");
    match (account, password) {
        (Some(account), Some(password)) => Ok(Some(SandboxAccount {
            account_number: AccountNumber::new(account),
            password: SecretString::from(password),
        })),
        (None, None) => Ok(None),
        _ => Err(ConfigError::IncompleteSandboxAccount),
    }
}

fn parse_url_env(key: &str, default: &str) -> Result<Url, ConfigError> {
    parse_url(key, &get_env_or_default(key, default))
}

fn parse_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    // A base URL without a trailing slash would silently drop its last path
    // segment when joined against, so normalize here.
    let normalized = if value.ends_with('/') {
        value.to_owned()
    } else {
        format!("{value}/")
    };
    Url::parse(&normalized).map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_with_urls_normalizes_trailing_slash() {
        let config = GatewayConfig::with_urls("http://localhost:8001/api", "http://localhost:8000/api").unwrap();
        assert_eq!(config.gateway_url.as_str(), "http://localhost:8001/api/");
        assert_eq!(config.shop_url.as_str(), "http://localhost:8000/api/");
    }

    #[test]
    fn test_with_urls_rejects_garbage() {
        assert!(GatewayConfig::with_urls("not a url", "http://localhost:8000").is_err());
    }

    #[test]
    fn test_join_keeps_base_path() {
        let config = GatewayConfig::with_urls("http://localhost:8001/api", "http://localhost:8000/api").unwrap();
        let joined = config.gateway_url.join("auth/login/").unwrap();
        assert_eq!(joined.as_str(), "http://localhost:8001/api/auth/login/");
    }

    #[test]
    fn test_sandbox_debug_redacts_password() {
        let sandbox = SandboxAccount {
            account_number: AccountNumber::new("910000001"),
            password: SecretString::from("super-secret"),
        };
        let debug_output = format!("{sandbox:?}");
        assert!(debug_output.contains("910000001"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super-secret"));
        // The secret itself is still reachable for the payment call.
        assert_eq!(sandbox.password.expose_secret(), "super-secret");
    }
}
