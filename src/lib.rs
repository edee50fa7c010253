//! Hopyfy Cart Rust Client Library
//!
//! A Rust client for the Hopyfy Cart e-commerce API: authentication and
//! session lifecycle, client-side mirrors of the user's cart, wishlist and
//! order history, the product catalog, checkout (cash-on-delivery and
//! Razorpay), and the admin console operations.
//!
//! All business logic (inventory, pricing, payment verification, order
//! state transitions) lives server-side; this crate is a presentational
//! and state-synchronization client over the REST API.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fetch;
pub mod guard;
pub mod http;
pub mod orders;

use reqwest::Client;
use std::sync::{Arc, RwLock};
use tracing::warn;

use crate::admin::Admin;
use crate::auth::storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage};
use crate::auth::{Auth, SessionState, SignupRequest, User};
use crate::cart::CartStore;
use crate::catalog::Catalog;
use crate::config::ClientOptions;
use crate::error::Error;
use crate::http::HttpSession;
use crate::orders::{
    Order, PaymentMethod, PaymentVerification, VerifyPaymentRequest,
};

/// The main entry point for the Hopyfy Cart client
///
/// Owns the HTTP session (including the token-refresh coordination) and the
/// per-concern stores, and composes the flows that span them: login
/// populates the cart and wishlist mirrors, logout clears everything,
/// checkout empties the cart mirror.
pub struct Hopyfy {
    http: Arc<HttpSession>,
    auth: Auth,
    catalog: Catalog,
    cart: CartStore,
    orders: orders::OrderStore,
    admin: Admin,
}

impl Hopyfy {
    /// Create a new client against the given API base URL
    ///
    /// # Example
    ///
    /// ```
    /// use hopyfy_cart_client::Hopyfy;
    ///
    /// let client = Hopyfy::new("https://shop.example.com/api");
    /// ```
    pub fn new(base_url: &str) -> Self {
        Self::new_with_options(base_url, ClientOptions::default())
    }

    /// Create a new client with custom options
    ///
    /// # Example
    ///
    /// ```
    /// use hopyfy_cart_client::{config::ClientOptions, Hopyfy};
    ///
    /// let options = ClientOptions::default().with_token_file("/tmp/hopyfy-session.json");
    /// let client = Hopyfy::new_with_options("https://shop.example.com/api", options);
    /// ```
    pub fn new_with_options(base_url: &str, options: ClientOptions) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        // same failure mode as reqwest::Client::new()
        let client = builder.build().expect("failed to build HTTP client");

        let storage: Box<dyn TokenStorage> = match &options.token_file {
            Some(path) if options.persist_session => Box::new(FileTokenStorage::new(path)),
            _ => Box::new(MemoryTokenStorage::new()),
        };

        let session = Arc::new(RwLock::new(SessionState::Resolving));
        let http = Arc::new(HttpSession::new(base_url, client, storage, session.clone()));

        Self {
            auth: Auth::new(http.clone(), session.clone()),
            catalog: Catalog::new(http.clone()),
            cart: CartStore::new(http.clone(), session.clone()),
            orders: orders::OrderStore::new(http.clone(), session),
            admin: Admin::new(http.clone()),
            http,
        }
    }

    /// The session store
    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// The product catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The cart and wishlist mirror
    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// The order history mirror
    pub fn orders(&self) -> &orders::OrderStore {
        &self.orders
    }

    /// The admin console operations
    pub fn admin(&self) -> &Admin {
        &self.admin
    }

    /// The underlying HTTP session
    pub fn http(&self) -> &HttpSession {
        &self.http
    }

    /// Log in and populate the cart and wishlist mirrors from two parallel
    /// fetches, then the order history. Mirror failures do not fail the
    /// login; the stores simply stay empty until their next refresh.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, Error> {
        let user = self.auth.login(email, password).await?;

        let (cart, wishlist) = tokio::join!(self.cart.refresh_cart(), self.cart.refresh_wishlist());
        if let Err(err) = cart {
            warn!("cart refresh after login failed: {}", err);
        }
        if let Err(err) = wishlist {
            warn!("wishlist refresh after login failed: {}", err);
        }
        if let Err(err) = self.orders.refresh_orders().await {
            warn!("order refresh after login failed: {}", err);
        }

        Ok(user)
    }

    /// Register a new account and immediately log in with the same
    /// credentials (registration does not by itself establish a session)
    pub async fn signup(&self, request: &SignupRequest) -> Result<User, Error> {
        self.auth.signup(request).await?;
        self.login(&request.email, &request.password).await
    }

    /// Log out locally: clears the session, cart, wishlist and order
    /// history. Never fails and performs no network call.
    pub fn logout(&self) {
        self.auth.logout();
        self.cart.clear_local();
        self.orders.clear_local();
    }

    /// Resolve the session at startup from any persisted tokens, then
    /// populate the mirrors if a user is authenticated
    pub async fn restore_session(&self) -> Option<User> {
        let user = self.auth.restore_session().await?;

        let (cart, wishlist) = tokio::join!(self.cart.refresh_cart(), self.cart.refresh_wishlist());
        if let Err(err) = cart {
            warn!("cart refresh after restore failed: {}", err);
        }
        if let Err(err) = wishlist {
            warn!("wishlist refresh after restore failed: {}", err);
        }
        if let Err(err) = self.orders.refresh_orders().await {
            warn!("order refresh after restore failed: {}", err);
        }

        Some(user)
    }

    /// Place an order from the server-side cart and clear the local cart
    /// mirror on success (the server already emptied the cart)
    pub async fn checkout(
        &self,
        payment_method: PaymentMethod,
        shipping_address: Option<&str>,
    ) -> Result<Order, Error> {
        let order = self.orders.checkout(payment_method, shipping_address).await?;
        self.cart.clear_local();
        Ok(order)
    }

    /// Verify a completed Razorpay payment; on success the cart mirror is
    /// cleared (the server emptied the cart when marking the order paid)
    pub async fn verify_payment(
        &self,
        request: &VerifyPaymentRequest,
    ) -> Result<PaymentVerification, Error> {
        let verification = self.orders.verify_payment(request).await?;
        if verification.success {
            self.cart.clear_local();
        }
        Ok(verification)
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::auth::{SessionSnapshot, SignupRequest, User};
    pub use crate::cart::{CartItem, WishlistItem};
    pub use crate::config::ClientOptions;
    pub use crate::error::Error;
    pub use crate::guard::{decide, GuardDecision, RouteKind};
    pub use crate::orders::{Order, OrderStatus, PaymentMethod};
    pub use crate::Hopyfy;
}
