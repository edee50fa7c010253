//! Types for the cart and wishlist mirrors

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Product;

/// One cart entry. The server keeps at most one entry per product per user
/// and merges quantities on insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    /// The cart entry ID (not the product ID)
    pub id: i64,

    /// The product in the cart
    pub product: Product,

    /// The quantity
    pub quantity: u32,

    /// When the entry was added
    #[serde(rename = "added_at", default)]
    pub added_at: Option<DateTime<Utc>>,

    /// Server-computed `quantity * price`
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub subtotal: Option<Decimal>,
}

/// One wishlist entry; at most one per product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistItem {
    /// The wishlist entry ID
    pub id: i64,

    /// The wished-for product
    pub product: Product,

    /// When the entry was added
    #[serde(rename = "added_at", default)]
    pub added_at: Option<DateTime<Utc>>,
}
