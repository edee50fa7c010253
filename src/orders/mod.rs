//! Client-side mirror of the user's order history, plus checkout
//!
//! Orders are created by checkout and mutated only server-side; this store
//! re-fetches the list or patches the single affected order's status in
//! place from the server's response.

mod types;

use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use tracing::debug;

use crate::auth::SharedSessionState;
use crate::error::Error;
use crate::fetch::Fetch;
use crate::http::HttpSession;

pub use types::{
    Order, OrderItem, OrderStatus, PaymentMethod, PaymentVerification, RazorpayCheckout,
    VerifyPaymentItem, VerifyPaymentRequest,
};

#[derive(Serialize)]
struct CheckoutRequest<'a> {
    payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    shipping_address: Option<&'a str>,
}

#[derive(Deserialize)]
struct CancelResponse {
    status: OrderStatus,
}

/// The order history state container
pub struct OrderStore {
    http: Arc<HttpSession>,
    session: SharedSessionState,
    orders: RwLock<Vec<Order>>,
}

impl OrderStore {
    pub(crate) fn new(http: Arc<HttpSession>, session: SharedSessionState) -> Self {
        Self {
            http,
            session,
            orders: RwLock::new(Vec::new()),
        }
    }

    fn require_login(&self) -> Result<(), Error> {
        if self.session.read().unwrap().user().is_some() {
            Ok(())
        } else {
            Err(Error::auth("login required"))
        }
    }

    /// The mirrored orders, newest first
    pub fn orders(&self) -> Vec<Order> {
        self.orders.read().unwrap().clone()
    }

    /// Drop all local order state (logout)
    pub(crate) fn clear_local(&self) {
        self.orders.write().unwrap().clear();
    }

    /// Fetch all orders for the current user, stored newest-first. The most
    /// recently completed call always wins.
    pub async fn refresh_orders(&self) -> Result<Vec<Order>, Error> {
        self.require_login()?;
        let mut orders: Vec<Order> = self.http.execute(Fetch::get("orders/")).await?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        *self.orders.write().unwrap() = orders.clone();
        Ok(orders)
    }

    /// Place an order from the server-side cart. On success the created
    /// order is prepended to the local history; the caller is responsible
    /// for clearing the cart mirror (the server already emptied the cart).
    pub async fn checkout(
        &self,
        payment_method: PaymentMethod,
        shipping_address: Option<&str>,
    ) -> Result<Order, Error> {
        self.require_login()?;
        let spec = Fetch::post("checkout/").json(&CheckoutRequest {
            payment_method,
            shipping_address,
        })?;
        let order: Order = self.http.execute(spec).await?;
        debug!(order = order.id, "order placed");
        self.orders.write().unwrap().insert(0, order.clone());
        Ok(order)
    }

    /// Cancel an order. Only the server decides whether cancellation is
    /// allowed; on success the one affected order's status is patched in
    /// place from the response.
    pub async fn cancel_order(&self, order_id: i64) -> Result<OrderStatus, Error> {
        self.require_login()?;
        let response: CancelResponse = self
            .http
            .execute(Fetch::post(&format!("orders/{}/cancel/", order_id)).json(
                &serde_json::json!({}),
            )?)
            .await?;

        let mut orders = self.orders.write().unwrap();
        if let Some(order) = orders.iter_mut().find(|o| o.id == order_id) {
            order.status = response.status;
        }
        Ok(response.status)
    }

    /// Create a gateway-side order for a Razorpay payment of the given
    /// amount (whole rupees)
    pub async fn create_razorpay_order(&self, amount: u64) -> Result<RazorpayCheckout, Error> {
        self.require_login()?;
        let spec = Fetch::post("razorpay/order/").json(&serde_json::json!({ "amount": amount }))?;
        self.http.execute(spec).await
    }

    /// Verify a completed gateway payment. On success the server marks the
    /// order paid and empties the cart; the caller clears the cart mirror.
    pub async fn verify_payment(
        &self,
        request: &VerifyPaymentRequest,
    ) -> Result<PaymentVerification, Error> {
        self.require_login()?;
        let spec = Fetch::post("razorpay/verify-payment/").json(request)?;
        self.http.execute(spec).await
    }
}
