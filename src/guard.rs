//! Route guards: deterministic, side-effect-free access control
//!
//! Guards only inspect a [`SessionSnapshot`]; they perform no I/O and make
//! no redirect decision while the session is still resolving.

use crate::auth::SessionSnapshot;

/// The access class of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// Open to everyone
    Public,

    /// Requires an authenticated session
    Protected,

    /// Requires an administrator
    Admin,
}

/// What the caller should render or do for a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session state is still resolving; render a neutral pending state
    Pending,

    /// Render the route
    Allow,

    /// Redirect to the login view. Used both for "not logged in" and "not
    /// permitted"; the routing layer makes no distinction.
    RedirectToLogin,
}

/// Decide access for a route from the current session snapshot
pub fn decide(session: &SessionSnapshot, route: RouteKind) -> GuardDecision {
    if session.loading {
        return GuardDecision::Pending;
    }

    match route {
        RouteKind::Public => GuardDecision::Allow,
        RouteKind::Protected => {
            if session.is_authenticated() {
                GuardDecision::Allow
            } else {
                GuardDecision::RedirectToLogin
            }
        }
        RouteKind::Admin => {
            if session.is_admin() {
                GuardDecision::Allow
            } else {
                GuardDecision::RedirectToLogin
            }
        }
    }
}
