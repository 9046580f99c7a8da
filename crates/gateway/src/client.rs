//! Configured HTTP client for the EthPay backends.
//!
//! Wraps `reqwest` with the base URL, default headers, timeout, bearer-token
//! injection, and the 401 refresh-and-retry policy. A request that comes back
//! 401 (on anything but the login endpoint) triggers one token refresh and
//! one replay of the original request; a second 401 destroys the session and
//! surfaces [`ApiError::Auth`] so the caller redirects to login.
//!
//! Refresh is single-flight: concurrent requests that hit 401 while a
//! refresh is already running await the same rotation instead of issuing
//! their own refresh calls. Each task re-reads the access token under the
//! refresh lock and skips the network call if another task already rotated
//! the pair.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::{ConfigError, GatewayConfig};
use crate::error::{ApiError, message_from_body};
use crate::session::{AuthTokens, SessionStore};

/// Paths that never participate in refresh-and-retry: a 401 from login is a
/// credential failure, and the refresh call must not recurse into itself.
const LOGIN_PATH: &str = "auth/login/";
const REFRESH_PATH: &str = "auth/refresh/";

/// Client for an EthPay REST surface.
///
/// Cheap to clone; all clones share one connection pool, one session store,
/// and one refresh lock.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    /// Base URL requests are joined against.
    base_url: Url,
    /// Base URL of the gateway, where the refresh endpoint lives. Differs
    /// from `base_url` for the shop surface.
    auth_url: Url,
    session: SessionStore,
    refresh_lock: Mutex<()>,
}

impl ApiClient {
    /// Create a client for the payment-gateway API.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the underlying HTTP client cannot be built.
    pub fn new(config: &GatewayConfig, session: SessionStore) -> Result<Self, ConfigError> {
        Self::with_base(config, config.gateway_url.clone(), session)
    }

    /// Create a client for the e-commerce shop API.
    ///
    /// Shop requests still refresh their tokens against the gateway, since
    /// both surfaces share one session.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the underlying HTTP client cannot be built.
    pub fn for_shop(config: &GatewayConfig, session: SessionStore) -> Result<Self, ConfigError> {
        Self::with_base(config, config.shop_url.clone(), session)
    }

    fn with_base(
        config: &GatewayConfig,
        base_url: Url,
        session: SessionStore,
    ) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("ETHPAY_TIMEOUT_MS".to_owned(), e.to_string())
            })?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url,
                auth_url: config.gateway_url.clone(),
                session,
                refresh_lock: Mutex::new(()),
            }),
        })
    }

    /// The session store this client reads tokens from.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Issue a GET request.
    ///
    /// # Errors
    ///
    /// See [`Self::request`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::GET, path, None).await
    }

    /// Issue a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`Self::request`].
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.request(Method::POST, path, Some(body)).await
    }

    /// Issue a request, injecting the bearer token and applying the
    /// refresh-and-retry policy.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Network`] when no response was received
    /// - [`ApiError::Auth`] when a 401 could not be resolved by refresh
    ///   (the session has been cleared)
    /// - [`ApiError::Api`] for any other non-2xx response
    /// - [`ApiError::Decode`] when a 2xx body fails to decode
    #[instrument(skip(self, body), fields(method = %method, path = %path))]
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError> {
        let url = self
            .inner
            .base_url
            .join(path)
            .map_err(|e| ApiError::Validation(format!("invalid request path {path}: {e}")))?;

        let token = self.inner.session.access_token();
        let response = self
            .send_once(method.clone(), &url, body.as_ref(), token.as_deref())
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED || path == LOGIN_PATH {
            return Self::decode(response).await;
        }

        debug!("401 received, attempting token refresh");
        let retry_token = self.refreshed_token(token.as_deref()).await?;

        let retried = self
            .send_once(method, &url, body.as_ref(), Some(&retry_token))
            .await?;

        if retried.status() == StatusCode::UNAUTHORIZED {
            // Refresh succeeded but the server still refuses: force logout
            // rather than loop.
            self.inner.session.clear()?;
            return Err(ApiError::Auth);
        }

        Self::decode(retried).await
    }

    /// Send a single request with no retry policy.
    async fn send_once(
        &self,
        method: Method,
        url: &Url,
        body: Option<&serde_json::Value>,
        token: Option<&str>,
    ) -> Result<reqwest::Response, ApiError> {
        let mut request = self
            .inner
            .http
            .request(method, url.clone())
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        request.send().await.map_err(ApiError::from_transport)
    }

    /// Produce an access token to retry with, refreshing if nobody else has.
    ///
    /// Holds the refresh lock so concurrent 401s serialize here; whichever
    /// task wins performs the rotation and the rest observe the new token.
    async fn refreshed_token(&self, stale: Option<&str>) -> Result<String, ApiError> {
        let Some(refresh) = self.inner.session.refresh_token() else {
            self.inner.session.clear()?;
            return Err(ApiError::Auth);
        };

        let _guard = self.inner.refresh_lock.lock().await;

        // Another task may have rotated the pair while we waited for the
        // lock; its token is good, don't refresh again.
        if let Some(current) = self.inner.session.access_token()
            && stale != Some(current.as_str())
        {
            return Ok(current);
        }

        match self.exchange_refresh_token(&refresh).await {
            Ok(tokens) => {
                self.inner.session.set_tokens(&tokens)?;
                debug!("access token refreshed");
                Ok(tokens.access)
            }
            Err(err) => {
                // An unusable refresh token is a dead session. Clearing it
                // here is what prevents an infinite 401/refresh loop.
                warn!(error = %err, "token refresh failed, clearing session");
                self.inner.session.clear()?;
                Err(ApiError::Auth)
            }
        }
    }

    /// Exchange the refresh token for a new pair.
    ///
    /// Goes straight to the gateway's refresh endpoint with a bare request:
    /// no bearer header, no retry policy.
    async fn exchange_refresh_token(&self, refresh: &str) -> Result<AuthTokens, ApiError> {
        let url = self
            .inner
            .auth_url
            .join(REFRESH_PATH)
            .map_err(|e| ApiError::Validation(format!("invalid refresh path: {e}")))?;

        let response = self
            .inner
            .http
            .post(url)
            .header("Content-Type", "application/json")
            .json(&serde_json::json!({ "refresh": refresh }))
            .send()
            .await
            .map_err(ApiError::from_transport)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status,
                message: message_from_body(&body),
            });
        }

        let tokens: AuthTokens = response.json().await.map_err(ApiError::from_transport)?;
        Ok(tokens)
    }

    /// Decode a terminal response: 2xx bodies parse into `T`, everything
    /// else becomes [`ApiError::Api`].
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();

        // Read the body as text first for better error diagnostics.
        let text = response.text().await.map_err(ApiError::from_transport)?;

        if !status.is_success() {
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: message_from_body(&text),
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            warn!(
                status = %status,
                body = %text.chars().take(200).collect::<String>(),
                "failed to decode response body"
            );
            ApiError::Decode(e)
        })
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}
