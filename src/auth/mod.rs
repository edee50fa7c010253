//! Authentication and session lifecycle for the Hopyfy Cart API

mod session;
pub mod storage;
mod types;

use serde::Serialize;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

use crate::error::Error;
use crate::fetch::Fetch;
use crate::http::HttpSession;

pub use session::{SessionSnapshot, SessionState};
pub use types::{LoginResponse, SignupRequest, User};

/// Shared, exclusively-owned session state. The [`Auth`] store is the only
/// writer; other stores read it to gate their operations.
pub(crate) type SharedSessionState = Arc<RwLock<SessionState>>;

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// The session store: authentication lifecycle and identity state
pub struct Auth {
    http: Arc<HttpSession>,
    state: SharedSessionState,
}

impl Auth {
    pub(crate) fn new(http: Arc<HttpSession>, state: SharedSessionState) -> Self {
        Self { http, state }
    }

    /// Log in with email and password. On success the token pair and user
    /// are stored together; on any failure nothing is stored.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, Error> {
        let spec = Fetch::post("auth/login/").json(&LoginRequest { email, password })?;

        let response: LoginResponse = self
            .http
            .execute_unauthenticated(spec)
            .await
            .map_err(|err| match err {
                Error::Api { status: 401, .. } => {
                    Error::auth("invalid credentials or unverified account")
                }
                other => other,
            })?;

        self.http.set_tokens(&response.access, &response.refresh);
        *self.state.write().unwrap() = SessionState::Authenticated(response.user.clone());
        debug!(user = %response.user.username, "logged in");
        Ok(response.user)
    }

    /// Register a new account. Field-level validation failures surface as
    /// [`Error::Validation`] keyed by field. Registration does not itself
    /// establish a session; follow up with [`Auth::login`].
    pub async fn signup(&self, request: &SignupRequest) -> Result<(), Error> {
        let spec = Fetch::post("auth/register/").json(request)?;
        let _body: serde_json::Value = self.http.execute_unauthenticated(spec).await?;
        Ok(())
    }

    /// Log out locally: clears the tokens and the current user. Never fails
    /// and performs no network call.
    pub fn logout(&self) {
        self.http.clear_tokens();
        *self.state.write().unwrap() = SessionState::Anonymous;
        debug!("logged out");
    }

    /// Resolve the session at startup. If a stored access token exists the
    /// current user is fetched; any failure clears the tokens and resolves
    /// to an unauthenticated session rather than blocking startup.
    pub async fn restore_session(&self) -> Option<User> {
        if !self.http.has_access_token() {
            *self.state.write().unwrap() = SessionState::Anonymous;
            return None;
        }

        match self.http.execute::<User>(Fetch::get("auth/user/")).await {
            Ok(user) => {
                *self.state.write().unwrap() = SessionState::Authenticated(user.clone());
                debug!(user = %user.username, "session restored");
                Some(user)
            }
            Err(err) => {
                warn!("session restore failed: {}", err);
                self.http.clear_tokens();
                *self.state.write().unwrap() = SessionState::Anonymous;
                None
            }
        }
    }

    /// Request a password-reset email
    pub async fn request_password_reset(&self, email: &str) -> Result<(), Error> {
        let spec =
            Fetch::post("auth/password-reset/").json(&serde_json::json!({ "email": email }))?;
        let _body: serde_json::Value = self.http.execute_unauthenticated(spec).await?;
        Ok(())
    }

    /// Complete a password reset with the uid/token pair from the email link
    pub async fn confirm_password_reset(
        &self,
        uid: &str,
        token: &str,
        password: &str,
    ) -> Result<(), Error> {
        let spec = Fetch::post("auth/password-reset-confirm/").json(&serde_json::json!({
            "uid": uid,
            "token": token,
            "password": password,
        }))?;
        let _body: serde_json::Value = self.http.execute_unauthenticated(spec).await?;
        Ok(())
    }

    /// The current user, if authenticated
    pub fn current_user(&self) -> Option<User> {
        self.state.read().unwrap().user().cloned()
    }

    /// Whether the current user may access the admin console
    pub fn is_admin(&self) -> bool {
        self.current_user().is_some_and(|user| user.is_admin())
    }

    /// A point-in-time view of the session for guards and UI code
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read().unwrap();
        SessionSnapshot {
            loading: matches!(*state, SessionState::Resolving),
            user: state.user().cloned(),
        }
    }
}
