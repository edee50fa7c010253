//! Types for the product catalog

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    /// The category ID
    pub id: i64,

    /// The category name
    pub name: String,
}

/// One image attached to a product; either an uploaded file path or an
/// external URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductImage {
    /// The image ID
    pub id: i64,

    /// The uploaded image path, if any
    #[serde(default)]
    pub images: Option<String>,

    /// The external image URL, if any
    #[serde(rename = "image_url", default)]
    pub image_url: Option<String>,
}

/// Read-only projection of a product. Never mutated client-side; always the
/// latest value from the most recent fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// The product ID
    pub id: String,

    /// The product name
    pub name: String,

    /// The brand
    #[serde(default)]
    pub brand: String,

    /// The description
    #[serde(default)]
    pub description: String,

    /// The current price
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,

    /// The pre-discount price, if discounted
    #[serde(
        rename = "original_price",
        default,
        with = "rust_decimal::serde::str_option"
    )]
    pub original_price: Option<Decimal>,

    /// Units in stock
    pub stock: u32,

    /// The product's category
    #[serde(default)]
    pub category: Option<Category>,

    /// Attached images
    #[serde(default)]
    pub images: Vec<ProductImage>,

    /// Whether the product is listed
    #[serde(rename = "is_active", default)]
    pub is_active: bool,

    /// The creation time
    #[serde(rename = "created_at", default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A product review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// The review ID
    pub id: i64,

    /// The reviewed product's ID
    pub product: String,

    /// The reviewing user's ID
    pub user: String,

    /// The rating, 1 to 5
    pub rating: u8,

    /// The review text
    #[serde(default)]
    pub comment: String,

    /// The creation time
    #[serde(rename = "created_at", default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A review to submit
#[derive(Debug, Clone, Serialize)]
pub struct NewReview {
    /// The product being reviewed
    pub product: String,

    /// The rating, 1 to 5
    pub rating: u8,

    /// The review text
    pub comment: String,
}
