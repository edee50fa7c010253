//! Configuration options for the Hopyfy Cart client

use std::path::PathBuf;
use std::time::Duration;

/// Configuration options for the Hopyfy Cart client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// Whether to persist the session tokens across restarts
    pub persist_session: bool,

    /// Where persisted tokens are written. `None` with `persist_session`
    /// enabled keeps tokens in memory only.
    pub token_file: Option<PathBuf>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            persist_session: true,
            token_file: None,
        }
    }
}

impl ClientOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set whether to persist the session
    pub fn with_persist_session(mut self, value: bool) -> Self {
        self.persist_session = value;
        self
    }

    /// Set the file the session tokens are persisted to
    pub fn with_token_file(mut self, value: impl Into<PathBuf>) -> Self {
        self.token_file = Some(value.into());
        self
    }
}
