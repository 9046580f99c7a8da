//! Error taxonomy for the gateway and shop clients.
//!
//! Mirrors how failures surface to a user of the flow:
//! validation problems never leave the process, network failures carry a
//! "is the backend running?" hint distinct from server-returned errors, and
//! an unrecoverable 401 is its own variant because it forces a logout.

use thiserror::Error;

use crate::store::StoreError;

/// Errors produced by API operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required field was missing or malformed; caught before any network
    /// call was made.
    #[error("Validation error: {0}")]
    Validation(String),

    /// No response was received (connection refused, timeout, DNS).
    #[error("Cannot connect to server. Please make sure the backend is running.")]
    Network(#[source] reqwest::Error),

    /// A 401 that refresh could not resolve. The session has been cleared;
    /// the caller must treat this as a redirect-to-login condition.
    #[error("Session expired, please log in again")]
    Auth,

    /// The server answered with a non-2xx status.
    #[error("Server error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Human-readable message extracted from the response body.
        message: String,
    },

    /// The bank processor explicitly declined the payment
    /// (`{"success": false}` with a reason).
    #[error("Payment declined: {0}")]
    Declined(String),

    /// Reading or writing the client state store failed.
    #[error("State store error: {0}")]
    Store(#[from] StoreError),

    /// The response body could not be decoded.
    #[error("Unexpected response from server: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// True when the caller should abandon in-flight state and send the user
    /// back to the login screen.
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(self, Self::Auth)
    }

    /// Classify a `reqwest` transport error.
    ///
    /// Everything that never produced a response is a [`Self::Network`]
    /// failure; decode errors on a received body become [`Self::Decode`]-like
    /// API errors upstream, not here.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        Self::Network(err)
    }
}

/// Pull a human-readable message out of a backend error body.
///
/// The backends are inconsistent: some errors arrive as `{"error": "..."}`,
/// some as `{"detail": "..."}`, and field validation as
/// `{"field": ["msg", ...]}`. Falls back to the raw body, truncated.
#[must_use]
pub(crate) fn message_from_body(body: &str) -> String {
    const MAX_RAW: usize = 200;

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "detail", "message"] {
            if let Some(message) = value.get(key).and_then(serde_json::Value::as_str) {
                return message.to_owned();
            }
        }
        // Field-level validation errors: {"email": ["already registered"]}
        if let Some(map) = value.as_object() {
            let mut parts = Vec::new();
            for (field, messages) in map {
                if let Some(list) = messages.as_array() {
                    let joined = list
                        .iter()
                        .filter_map(serde_json::Value::as_str)
                        .collect::<Vec<_>>()
                        .join(", ");
                    if !joined.is_empty() {
                        parts.push(format!("{field}: {joined}"));
                    }
                }
            }
            if !parts.is_empty() {
                return parts.join("; ");
            }
        }
    }

    body.chars().take(MAX_RAW).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_from_error_key() {
        assert_eq!(message_from_body(r#"{"error": "Insufficient funds"}"#), "Insufficient funds");
        assert_eq!(message_from_body(r#"{"detail": "Not found."}"#), "Not found.");
    }

    #[test]
    fn test_message_from_field_errors() {
        let body = r#"{"email": ["already registered"], "password": ["too short"]}"#;
        let message = message_from_body(body);
        assert!(message.contains("email: already registered"));
        assert!(message.contains("password: too short"));
    }

    #[test]
    fn test_message_falls_back_to_raw_body() {
        assert_eq!(message_from_body("<html>502</html>"), "<html>502</html>");
    }

    #[test]
    fn test_requires_login() {
        assert!(ApiError::Auth.requires_login());
        assert!(!ApiError::Validation("x".into()).requires_login());
    }
}
