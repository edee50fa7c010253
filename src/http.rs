//! HTTP session for the Hopyfy Cart API
//!
//! [`HttpSession`] is the single point of outbound request construction and
//! the owner of the authorization-refresh protocol. It attaches the current
//! access token to every request and, on a 401, coordinates exactly one
//! token refresh: concurrent requests that fail authorization while a
//! refresh is outstanding queue on the refresh gate instead of each issuing
//! their own refresh call. The refresh-in-flight state and its wait queue
//! are fields of this one object, not process-wide globals.

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::auth::storage::{StoredTokens, TokenStorage};
use crate::auth::{SessionState, SharedSessionState};
use crate::error::{Error, FieldErrors};
use crate::fetch::{Fetch, RequestSpec};

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
}

/// Shared token state: the current pair, its durable backing store, and the
/// refresh coordination primitives.
struct TokenCell {
    storage: Box<dyn TokenStorage>,
    tokens: RwLock<Option<StoredTokens>>,
    /// Completed refresh attempts, successful or not. Lets a request that
    /// queued on an in-flight refresh adopt its outcome instead of issuing
    /// a second refresh call.
    attempts: AtomicU64,
    refresh_gate: Mutex<()>,
}

impl TokenCell {
    fn new(storage: Box<dyn TokenStorage>) -> Self {
        let tokens = storage.load();
        Self {
            storage,
            tokens: RwLock::new(tokens),
            attempts: AtomicU64::new(0),
            refresh_gate: Mutex::new(()),
        }
    }

    fn access_token(&self) -> Option<String> {
        self.tokens
            .read()
            .unwrap()
            .as_ref()
            .map(|t| t.access.clone())
    }

    fn refresh_token(&self) -> Option<String> {
        self.tokens
            .read()
            .unwrap()
            .as_ref()
            .map(|t| t.refresh.clone())
    }

    fn set(&self, access: &str, refresh: &str) {
        let pair = StoredTokens {
            access: access.to_string(),
            refresh: refresh.to_string(),
        };
        self.storage.save(&pair);
        *self.tokens.write().unwrap() = Some(pair);
    }

    /// Replace the access token after a refresh, keeping the refresh token
    fn rotate_access(&self, access: &str) {
        let mut guard = self.tokens.write().unwrap();
        if let Some(pair) = guard.as_mut() {
            pair.access = access.to_string();
            self.storage.save(pair);
        }
    }

    fn clear(&self) {
        self.storage.clear();
        *self.tokens.write().unwrap() = None;
    }

    fn attempt_count(&self) -> u64 {
        self.attempts.load(Ordering::Acquire)
    }

    fn record_attempt(&self) {
        self.attempts.fetch_add(1, Ordering::Release);
    }
}

/// Owner of the base URL, HTTP client and token state for one application
/// lifetime
pub struct HttpSession {
    base_url: String,
    client: Client,
    tokens: TokenCell,
    session: SharedSessionState,
}

impl HttpSession {
    /// Create a new session against the given API base URL
    pub(crate) fn new(
        base_url: &str,
        client: Client,
        storage: Box<dyn TokenStorage>,
        session: SharedSessionState,
    ) -> Self {
        // a trailing slash makes Url::join treat the base as a directory
        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };

        Self {
            base_url,
            client,
            tokens: TokenCell::new(storage),
            session,
        }
    }

    /// Drop the tokens and flip the session store to unauthenticated. Only
    /// called when the session is irrecoverable.
    fn expire_session(&self) {
        self.tokens.clear();
        *self.session.write().unwrap() = SessionState::Anonymous;
    }

    /// The API base URL, always with a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether an access token is currently stored
    pub fn has_access_token(&self) -> bool {
        self.tokens.access_token().is_some()
    }

    /// Store a new token pair (login, signup)
    pub(crate) fn set_tokens(&self, access: &str, refresh: &str) {
        self.tokens.set(access, refresh);
    }

    /// Clear both tokens (logout, irrecoverable refresh failure)
    pub(crate) fn clear_tokens(&self) {
        self.tokens.clear();
    }

    /// Execute a request and decode the JSON response
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        spec: RequestSpec,
    ) -> Result<T, Error> {
        let response = self.send_with_refresh(&spec).await?;
        Self::decode(response).await
    }

    /// Execute a request without a token and without the refresh protocol.
    /// Used for the endpoints that establish a session in the first place
    /// (login, register, password reset), where a 401 means bad credentials
    /// rather than an expired token.
    pub(crate) async fn execute_unauthenticated<T: DeserializeOwned>(
        &self,
        spec: RequestSpec,
    ) -> Result<T, Error> {
        let response = spec.build(&self.client, &self.base_url, None)?.send().await?;
        Self::decode(response).await
    }

    /// Execute a request, checking only for success
    pub(crate) async fn execute_empty(&self, spec: RequestSpec) -> Result<(), Error> {
        let response = self.send_with_refresh(&spec).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(Self::error_from(status, response.text().await.unwrap_or_default()))
    }

    /// Send a request, transparently recovering from a single 401 via the
    /// refresh protocol. A request is retried at most once; a second 401 is
    /// a final failure.
    async fn send_with_refresh(&self, spec: &RequestSpec) -> Result<Response, Error> {
        let token = self.tokens.access_token();
        let response = spec
            .build(&self.client, &self.base_url, token.as_deref())?
            .send()
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let new_token = self.refresh_access_token(token).await?;
        let retry = spec
            .build(&self.client, &self.base_url, Some(&new_token))?
            .send()
            .await?;

        if retry.status() == StatusCode::UNAUTHORIZED {
            return Err(Error::auth("request rejected after token refresh"));
        }
        Ok(retry)
    }

    /// Obtain a usable access token after a 401, performing at most one
    /// refresh call across all concurrent callers.
    ///
    /// `seen` is the access token the failed request was sent with. If the
    /// stored token has already changed, another caller refreshed it and the
    /// rotated token is adopted as-is.
    async fn refresh_access_token(&self, seen: Option<String>) -> Result<String, Error> {
        let seen_attempt = self.tokens.attempt_count();

        // queue point: while a refresh is in flight every other 401'd
        // request waits here
        let _gate = self.tokens.refresh_gate.lock().await;

        if self.tokens.attempt_count() != seen_attempt {
            // a refresh completed while we were queued; adopt its outcome
            return self.tokens.access_token().ok_or(Error::SessionExpired);
        }
        if let Some(current) = self.tokens.access_token() {
            if seen.as_deref() != Some(current.as_str()) {
                return Ok(current);
            }
        }

        let Some(refresh) = self.tokens.refresh_token() else {
            // nothing to refresh with; the session is gone
            self.expire_session();
            return Err(Error::SessionExpired);
        };

        debug!("access token rejected, attempting refresh");
        let spec = Fetch::post("auth/token/refresh/")
            .json(&serde_json::json!({ "refresh": refresh }))?;
        let sent = spec
            .build(&self.client, &self.base_url, None)?
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(err) => {
                // the server was never reached; the session may still be
                // valid, so keep the tokens and let the caller retry later
                self.tokens.record_attempt();
                warn!("token refresh did not reach the server: {}", err);
                return Err(Error::Http(err));
            }
        };

        if !response.status().is_success() {
            self.tokens.record_attempt();
            self.expire_session();
            warn!("refresh token rejected, session expired");
            return Err(Error::SessionExpired);
        }

        let body: RefreshResponse = response.json().await?;
        self.tokens.rotate_access(&body.access);
        self.tokens.record_attempt();
        debug!("access token refreshed");
        Ok(body.access)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, Error> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }
        Err(Self::error_from(status, response.text().await.unwrap_or_default()))
    }

    /// Map a non-2xx response body to the error taxonomy: a 400 carrying a
    /// field map becomes a validation error, anything else an API error
    /// with the server's `detail` message when present.
    fn error_from(status: StatusCode, body: String) -> Error {
        if status == StatusCode::BAD_REQUEST {
            if let Ok(fields) = serde_json::from_str::<FieldErrors>(&body) {
                return Error::Validation(fields);
            }
        }

        let detail = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from))
            .unwrap_or(body);
        Error::api(status.as_u16(), detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::storage::MemoryTokenStorage;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{bearer_token, body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn anonymous_state() -> SharedSessionState {
        Arc::new(RwLock::new(SessionState::Anonymous))
    }

    fn session_with_tokens(uri: &str, access: &str, refresh: &str) -> HttpSession {
        let storage = MemoryTokenStorage::new();
        storage.save(&StoredTokens {
            access: access.to_string(),
            refresh: refresh.to_string(),
        });
        HttpSession::new(uri, Client::new(), Box::new(storage), anonymous_state())
    }

    #[derive(Debug, Deserialize)]
    struct Payload {
        ok: bool,
    }

    #[tokio::test]
    async fn attaches_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cart/"))
            .and(bearer_token("tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let session = session_with_tokens(&server.uri(), "tok", "ref");
        let result: Payload = session.execute(Fetch::get("cart/")).await.unwrap();
        assert!(result.ok);
    }

    #[tokio::test]
    async fn refreshes_once_and_replays_the_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/cart/"))
            .and(bearer_token("stale"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/token/refresh/"))
            .and(body_json(json!({"refresh": "ref"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "fresh"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cart/"))
            .and(bearer_token("fresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let session = session_with_tokens(&server.uri(), "stale", "ref");
        let result: Payload = session.execute(Fetch::get("cart/")).await.unwrap();
        assert!(result.ok);
        assert!(session.has_access_token());
    }

    #[tokio::test]
    async fn concurrent_401s_share_a_single_refresh() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/cart/"))
            .and(bearer_token("stale"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/wishlist/"))
            .and(bearer_token("stale"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        // the delay keeps the refresh in flight long enough for the second
        // request to queue on it
        Mock::given(method("POST"))
            .and(path("/auth/token/refresh/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access": "fresh"}))
                    .set_delay(Duration::from_millis(100)),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cart/"))
            .and(bearer_token("fresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/wishlist/"))
            .and(bearer_token("fresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;

        let session = Arc::new(session_with_tokens(&server.uri(), "stale", "ref"));
        let a = {
            let session = session.clone();
            tokio::spawn(async move { session.execute::<Payload>(Fetch::get("cart/")).await })
        };
        let b = {
            let session = session.clone();
            tokio::spawn(async move { session.execute::<Payload>(Fetch::get("wishlist/")).await })
        };

        assert!(a.await.unwrap().is_ok());
        assert!(b.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn rejected_refresh_clears_tokens_and_fails_all_waiters() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/cart/"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/wishlist/"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/token/refresh/"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"detail": "Token is invalid or expired"}))
                    .set_delay(Duration::from_millis(100)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let session = Arc::new(session_with_tokens(&server.uri(), "stale", "dead"));
        let a = {
            let session = session.clone();
            tokio::spawn(async move { session.execute::<Payload>(Fetch::get("cart/")).await })
        };
        let b = {
            let session = session.clone();
            tokio::spawn(async move { session.execute::<Payload>(Fetch::get("wishlist/")).await })
        };

        for handle in [a, b] {
            let err = handle.await.unwrap().unwrap_err();
            assert!(err.is_session_expired(), "expected SessionExpired, got {err:?}");
        }
        assert!(!session.has_access_token());
    }

    #[tokio::test]
    async fn missing_refresh_token_fails_without_a_refresh_call() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/cart/"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/token/refresh/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "x"})))
            .expect(0)
            .mount(&server)
            .await;

        let session =
            HttpSession::new(&server.uri(), Client::new(), Box::new(MemoryTokenStorage::new()), anonymous_state());
        let err = session.execute::<Payload>(Fetch::get("cart/")).await.unwrap_err();
        assert!(err.is_session_expired());
    }

    #[tokio::test]
    async fn second_401_after_refresh_is_a_final_failure() {
        let server = MockServer::start().await;

        // the protected endpoint rejects every token it sees
        Mock::given(method("GET"))
            .and(path("/cart/"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/token/refresh/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "fresh"})))
            .expect(1)
            .mount(&server)
            .await;

        let session = session_with_tokens(&server.uri(), "stale", "ref");
        let err = session.execute::<Payload>(Fetch::get("cart/")).await.unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[tokio::test]
    async fn unreachable_refresh_keeps_tokens() {
        // port 1 is essentially never listening; the refresh call fails at
        // the transport layer without an HTTP response
        let session = session_with_tokens("http://127.0.0.1:1", "stale", "ref");
        let err = session
            .refresh_access_token(Some("stale".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Http(_)));
        assert!(session.has_access_token());
    }

    #[tokio::test]
    async fn validation_body_surfaces_field_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/register/"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "email": ["Email already registered"],
                "username": ["Username already exists"]
            })))
            .mount(&server)
            .await;

        let session =
            HttpSession::new(&server.uri(), Client::new(), Box::new(MemoryTokenStorage::new()), anonymous_state());
        let spec = Fetch::post("auth/register/").json(&json!({})).unwrap();
        let err = session.execute::<Payload>(spec).await.unwrap_err();

        match err {
            Error::Validation(fields) => {
                assert_eq!(fields["email"], vec!["Email already registered"]);
                assert_eq!(fields["username"], vec!["Username already exists"]);
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn detail_body_surfaces_as_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/checkout/"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"detail": "Cart empty"})),
            )
            .mount(&server)
            .await;

        let session =
            HttpSession::new(&server.uri(), Client::new(), Box::new(MemoryTokenStorage::new()), anonymous_state());
        let spec = Fetch::post("checkout/").json(&json!({})).unwrap();
        let err = session.execute::<Payload>(spec).await.unwrap_err();

        match err {
            Error::Api { status, detail } => {
                assert_eq!(status, 400);
                assert_eq!(detail, "Cart empty");
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }
}
