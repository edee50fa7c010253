//! Types for orders and checkout

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Product;

/// An order's lifecycle status. Transitions are server-driven and only
/// mirrored client-side, never computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed, payment/handling not started
    #[serde(alias = "Pending")]
    Pending,

    /// Being prepared
    #[serde(alias = "Processing")]
    Processing,

    /// Handed to the carrier
    #[serde(alias = "Shipped")]
    Shipped,

    /// Delivered to the customer
    #[serde(alias = "Delivered")]
    Delivered,

    /// Cancelled before shipping
    #[serde(alias = "Cancelled")]
    Cancelled,

    /// Refunded after payment
    #[serde(alias = "Refunded")]
    Refunded,

    /// Payment captured by the gateway
    #[serde(alias = "Paid")]
    Paid,

    /// Payment verification failed
    #[serde(alias = "Failed")]
    Failed,
}

impl OrderStatus {
    /// The wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
            OrderStatus::Paid => "paid",
            OrderStatus::Failed => "failed",
        }
    }
}

/// How an order is paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Cash on delivery
    #[serde(rename = "COD")]
    Cod,

    /// The Razorpay payment gateway
    #[serde(rename = "RAZORPAY")]
    Razorpay,
}

/// One line item of an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    /// The line item ID
    pub id: i64,

    /// The ordered product, as it was at fetch time
    pub product: Product,

    /// The ordered quantity
    pub quantity: u32,

    /// The unit price at order time
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,

    /// The chosen size, if any
    #[serde(default)]
    pub size: Option<String>,
}

/// A past order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// The order ID
    pub id: i64,

    /// The line items
    #[serde(default)]
    pub items: Vec<OrderItem>,

    /// The order total
    #[serde(rename = "total_amount", with = "rust_decimal::serde::str")]
    pub total_amount: Decimal,

    /// The current status
    pub status: OrderStatus,

    /// How the order is paid
    #[serde(rename = "payment_method")]
    pub payment_method: PaymentMethod,

    /// When the order was created
    #[serde(rename = "created_at")]
    pub created_at: DateTime<Utc>,

    /// The shipping address, when collected
    #[serde(rename = "shipping_address", default)]
    pub shipping_address: Option<String>,

    /// The gateway order id for Razorpay orders
    #[serde(rename = "razorpay_order_id", default)]
    pub razorpay_order_id: Option<String>,

    /// The ordering user's username (admin listings)
    #[serde(rename = "user_username", default)]
    pub user_username: Option<String>,

    /// The ordering user's email (admin listings)
    #[serde(rename = "user_email", default)]
    pub user_email: Option<String>,
}

/// Response of `POST razorpay/order/`: everything the gateway's checkout
/// widget needs, plus the backend's own order id
#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayCheckout {
    /// The gateway API key
    pub key: String,

    /// The gateway-side order id
    #[serde(rename = "razorpay_order_id")]
    pub razorpay_order_id: String,

    /// The amount in paise
    pub amount: u64,

    /// The currency code
    pub currency: String,

    /// The backend order id
    #[serde(rename = "order_id")]
    pub order_id: i64,
}

/// Request body of `POST razorpay/verify-payment/`
#[derive(Debug, Clone, Serialize)]
pub struct VerifyPaymentRequest {
    /// The backend order id
    #[serde(rename = "order_id")]
    pub order_id: i64,

    /// The gateway payment id
    #[serde(rename = "razorpay_payment_id")]
    pub razorpay_payment_id: String,

    /// The gateway signature over order id + payment id
    #[serde(rename = "razorpay_signature")]
    pub razorpay_signature: String,

    /// The items being paid for
    pub items: Vec<VerifyPaymentItem>,
}

/// One purchased item reported during payment verification
#[derive(Debug, Clone, Serialize)]
pub struct VerifyPaymentItem {
    /// The product id
    pub product: String,

    /// The quantity
    pub quantity: u32,

    /// The unit price
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
}

/// Response of `POST razorpay/verify-payment/`
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentVerification {
    /// Whether the signature checked out and the order is paid
    pub success: bool,

    /// A human-readable detail message
    #[serde(default)]
    pub detail: String,
}
