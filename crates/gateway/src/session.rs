//! Session state: JWT pair and cached user profile.
//!
//! A session is created on login, its access token is silently replaced on
//! refresh, and all of it is destroyed together on logout or when a refresh
//! finally fails. No component other than this facade touches the session
//! keys directly.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use ethpay_core::{Email, UserId, UserRole};

use crate::store::{self, KeyValueStore, StoreError, keys};

/// The JWT pair issued by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokens {
    /// Short-lived access token, sent as `Authorization: Bearer <access>`.
    pub access: String,
    /// Longer-lived refresh token, exchanged for a new pair on 401.
    pub refresh: String,
}

/// Cached profile of the logged-in user.
///
/// Written once at login from the login response; the gateway remains the
/// source of truth for anything beyond identity and role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Gateway user ID.
    pub user_id: UserId,
    /// Login email.
    pub email: Email,
    /// Role, used for merchant-only view gating.
    pub role: UserRole,
    /// Display name.
    pub full_name: String,
}

/// Typed facade over the injected [`KeyValueStore`] for session state.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    /// Wrap a key/value store.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The underlying store, for components that keep other state (cart,
    /// receipts) alongside the session.
    #[must_use]
    pub fn raw(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.store)
    }

    /// Current access token, if a session is present.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.store.get(keys::ACCESS_TOKEN)
    }

    /// Current refresh token, if a session is present.
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.store.get(keys::REFRESH_TOKEN)
    }

    /// Cached profile of the logged-in user.
    #[must_use]
    pub fn profile(&self) -> Option<UserProfile> {
        store::get_json(self.store.as_ref(), keys::USER)
    }

    /// True when an access token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    /// Establish a fresh session from a successful login.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the tokens or profile cannot be persisted.
    pub fn establish(&self, tokens: &AuthTokens, profile: &UserProfile) -> Result<(), StoreError> {
        self.set_tokens(tokens)?;
        store::set_json(self.store.as_ref(), keys::USER, profile)
    }

    /// Replace the token pair after a refresh, leaving the profile in place.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the tokens cannot be persisted.
    pub fn set_tokens(&self, tokens: &AuthTokens) -> Result<(), StoreError> {
        self.store.set(keys::ACCESS_TOKEN, &tokens.access)?;
        self.store.set(keys::REFRESH_TOKEN, &tokens.refresh)
    }

    /// Destroy the session: tokens and cached profile together.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a removal cannot be persisted.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(keys::ACCESS_TOKEN)?;
        self.store.remove(keys::REFRESH_TOKEN)?;
        self.store.remove(keys::USER)
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Tokens stay out of Debug output.
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
