//! Session state for authentication

use crate::auth::types::User;

/// The lifecycle state of the current session
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    /// Startup restore is still in progress; no access decision can be made
    #[default]
    Resolving,

    /// No authenticated user
    Anonymous,

    /// An authenticated user
    Authenticated(User),
}

impl SessionState {
    /// The current user, if authenticated
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// A point-in-time view of the session, consumed by route guards and UI code
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    /// Whether the initial session restore is still resolving
    pub loading: bool,

    /// The current user, if any
    pub user: Option<User>,
}

impl SessionSnapshot {
    /// Whether a user is authenticated
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Whether the authenticated user is an administrator
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_admin)
    }
}
