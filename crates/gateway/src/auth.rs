//! Authentication service and auth gate.
//!
//! Registration and login against the gateway, logout, and the gate that
//! protected flows (checkout, dashboards) consult before doing any work.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use ethpay_core::{Email, UserId, UserRole};

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::session::{AuthTokens, SessionStore, UserProfile};

/// Minimum password length, enforced client-side before registration.
const MIN_PASSWORD_LENGTH: usize = 8;

/// UI path of the login view, used in redirect decisions.
const LOGIN_VIEW: &str = "/login";

/// Details for a new gateway account.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub full_name: String,
    pub email: Email,
    pub phone_number: String,
    pub password: String,
    pub role: UserRole,
    /// Required for merchants; the gateway accepts an empty string for
    /// end users.
    pub company_name: String,
}

/// User record echoed back by a successful registration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUser {
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub email: Email,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access: String,
    refresh: String,
    user_id: UserId,
    email: Email,
    role: UserRole,
    full_name: String,
}

/// Outcome of an auth-gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    /// The protected action may proceed.
    Allow,
    /// The user must be sent elsewhere first.
    Redirect {
        /// View to redirect to.
        to: String,
        /// Path to return to after a successful login, when applicable.
        return_to: Option<String>,
    },
}

impl AuthDecision {
    /// True when the protected action may proceed.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Authentication operations against the gateway.
#[derive(Debug, Clone)]
pub struct AuthService {
    client: ApiClient,
    session: SessionStore,
}

impl AuthService {
    /// Create the service.
    #[must_use]
    pub const fn new(client: ApiClient, session: SessionStore) -> Self {
        Self { client, session }
    }

    // =========================================================================
    // Account lifecycle
    // =========================================================================

    /// Register a new gateway account.
    ///
    /// Field validation happens here; a request with a missing name or a
    /// short password never reaches the network.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for client-side field problems, or
    /// the usual network/API errors from the gateway.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<RegisteredUser, ApiError> {
        if registration.full_name.trim().is_empty() {
            return Err(ApiError::Validation("full name is required".into()));
        }
        if registration.password.len() < MIN_PASSWORD_LENGTH {
            return Err(ApiError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        if registration.role == UserRole::Merchant && registration.company_name.trim().is_empty() {
            return Err(ApiError::Validation(
                "company name is required for merchant accounts".into(),
            ));
        }

        self.client.post("auth/register/", registration).await
    }

    /// Log in and establish a session.
    ///
    /// On success the token pair and profile are persisted; subsequent
    /// requests from any client sharing this session carry the bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Api`] with the gateway's message for bad
    /// credentials (a 401 from login is not retried), or
    /// [`ApiError::Validation`] for an unparseable email.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
        company_name: Option<&str>,
    ) -> Result<UserProfile, ApiError> {
        let email = Email::parse(email).map_err(|e| ApiError::Validation(e.to_string()))?;

        let response: LoginResponse = self
            .client
            .post(
                "auth/login/",
                &serde_json::json!({
                    "email": email,
                    "password": password.expose_secret(),
                    "companyName": company_name.unwrap_or(""),
                }),
            )
            .await?;

        let profile = UserProfile {
            user_id: response.user_id,
            email: response.email,
            role: response.role,
            full_name: response.full_name,
        };
        self.session.establish(
            &AuthTokens {
                access: response.access,
                refresh: response.refresh,
            },
            &profile,
        )?;

        Ok(profile)
    }

    /// Log out: tell the gateway to blacklist the refresh token, then clear
    /// the local session.
    ///
    /// The server call is best-effort; local state is cleared even when the
    /// gateway is unreachable.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Store`] only if clearing local state fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        if let Some(refresh) = self.session.refresh_token() {
            let result: Result<serde_json::Value, ApiError> = self
                .client
                .post("auth/logout/", &serde_json::json!({ "refresh": refresh }))
                .await;
            if let Err(err) = result {
                warn!(error = %err, "server-side logout failed, clearing local session anyway");
            }
        }

        self.session.clear()?;
        Ok(())
    }

    // =========================================================================
    // Auth gate
    // =========================================================================

    /// True when a session is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Gate a protected action: allow when a session exists, otherwise
    /// redirect to login carrying the path to return to.
    #[must_use]
    pub fn require_auth(&self, current_path: &str) -> AuthDecision {
        if self.session.is_authenticated() {
            AuthDecision::Allow
        } else {
            AuthDecision::Redirect {
                to: LOGIN_VIEW.to_owned(),
                return_to: Some(current_path.to_owned()),
            }
        }
    }

    /// Gate a role-restricted view (merchant dashboards vs general ones).
    ///
    /// An unauthenticated user is sent to login; an authenticated user with
    /// the wrong role is sent to `fallback_path`.
    #[must_use]
    pub fn require_role(&self, role: UserRole, fallback_path: &str) -> AuthDecision {
        if !self.session.is_authenticated() {
            return AuthDecision::Redirect {
                to: LOGIN_VIEW.to_owned(),
                return_to: Some(fallback_path.to_owned()),
            };
        }

        match self.session.profile() {
            Some(profile) if profile.role == role => AuthDecision::Allow,
            _ => AuthDecision::Redirect {
                to: fallback_path.to_owned(),
                return_to: None,
            },
        }
    }
}
