//! Types for the admin console operations

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product to create
#[derive(Debug, Clone, Serialize)]
pub struct NewProduct {
    /// The product name
    pub name: String,

    /// The brand
    pub brand: String,

    /// The description
    pub description: String,

    /// The price
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,

    /// Units in stock
    pub stock: u32,

    /// The category id
    pub category: i64,

    /// External image URLs to attach
    #[serde(rename = "image_url", skip_serializing_if = "Vec::is_empty")]
    pub image_urls: Vec<String>,
}

/// A partial product update; unset fields are left unchanged
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductPatch {
    /// New name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// New description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// New price
    #[serde(with = "rust_decimal::serde::str_option", skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,

    /// New stock level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,

    /// New category id
    #[serde(rename = "category_id", skip_serializing_if = "Option::is_none")]
    pub category: Option<i64>,

    /// Whether the product is listed
    #[serde(rename = "is_active", skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// A user account to create from the admin console
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    /// The username
    pub username: String,

    /// The email address
    pub email: String,

    /// The initial password
    pub password: String,

    /// Whether the account has staff privileges
    #[serde(rename = "is_staff")]
    pub is_staff: bool,

    /// Whether the account has superuser privileges
    #[serde(rename = "is_superuser")]
    pub is_superuser: bool,
}

/// Response of the block/unblock user actions
#[derive(Debug, Clone, Deserialize)]
pub struct BlockStatus {
    /// Whether the account is now blocked
    #[serde(rename = "isBlock")]
    pub is_blocked: bool,
}
