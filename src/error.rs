//! Error handling for the Hopyfy Cart client

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Field-keyed validation messages as returned by the backend for 400
/// responses, e.g. `{"email": ["Email already registered"]}`.
pub type FieldErrors = HashMap<String, Vec<String>>;

/// Unified error type for the Hopyfy Cart client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP transport errors (connection refused, timeout, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Authentication errors (final 401, missing login, bad credentials)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The session could not be recovered: the refresh token is missing or
    /// was rejected by the server. Tokens have been cleared.
    #[error("Session expired")]
    SessionExpired,

    /// Field-level validation failure, keyed by field for form display
    #[error("Validation failed: {0:?}")]
    Validation(FieldErrors),

    /// Server or business failure (insufficient stock, invalid status, ...)
    #[error("API error ({status}): {detail}")]
    Api { status: u16, detail: String },

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Create a new authentication error
    pub fn auth<T: fmt::Display>(msg: T) -> Self {
        Error::Auth(msg.to_string())
    }

    /// Create a new API error from a status code and response body
    pub fn api(status: u16, detail: impl Into<String>) -> Self {
        Error::Api {
            status,
            detail: detail.into(),
        }
    }

    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }

    /// Whether this error means the session is gone and the user must log
    /// in again.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Error::SessionExpired)
    }
}
