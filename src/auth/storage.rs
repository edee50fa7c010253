//! Durable storage for session tokens
//!
//! The backend issues a short-lived access token and a longer-lived refresh
//! token; both survive application restarts when persisted. The two tokens
//! are always written and cleared together, never independently.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::warn;

/// The persisted token pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredTokens {
    /// The access token
    pub access: String,

    /// The refresh token
    pub refresh: String,
}

/// Backend for persisting session tokens across restarts
///
/// Reads and writes are synchronous; concurrent writers follow
/// last-writer-wins semantics.
pub trait TokenStorage: Send + Sync {
    /// Load the persisted tokens, if any
    fn load(&self) -> Option<StoredTokens>;

    /// Persist the token pair
    fn save(&self, tokens: &StoredTokens);

    /// Remove any persisted tokens
    fn clear(&self);
}

/// In-memory token storage; tokens live only as long as the process
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    tokens: Mutex<Option<StoredTokens>>,
}

impl MemoryTokenStorage {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Option<StoredTokens> {
        self.tokens.lock().unwrap().clone()
    }

    fn save(&self, tokens: &StoredTokens) {
        *self.tokens.lock().unwrap() = Some(tokens.clone());
    }

    fn clear(&self) {
        *self.tokens.lock().unwrap() = None;
    }
}

/// Token storage backed by a single JSON file
#[derive(Debug)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    /// Create a file-backed store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Option<StoredTokens> {
        let data = std::fs::read(&self.path).ok()?;
        serde_json::from_slice(&data).ok()
    }

    fn save(&self, tokens: &StoredTokens) {
        let data = match serde_json::to_vec(tokens) {
            Ok(data) => data,
            Err(err) => {
                warn!("failed to serialize session tokens: {}", err);
                return;
            }
        };
        if let Err(err) = std::fs::write(&self.path, data) {
            warn!("failed to persist session tokens: {}", err);
        }
    }

    fn clear(&self) {
        if let Err(err) = std::fs::remove_file(&self.path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!("failed to clear persisted session tokens: {}", err);
            }
        }
    }
}
