//! Product catalog: products, categories and reviews
//!
//! Purely read-through (plus review submission); there is no local catalog
//! state to keep consistent, so every call returns the server's latest view.

mod types;

use std::sync::Arc;

use crate::error::Error;
use crate::fetch::Fetch;
use crate::http::HttpSession;

pub use types::{Category, NewReview, Product, ProductImage, Review};

/// Client for the product catalog
pub struct Catalog {
    http: Arc<HttpSession>,
}

impl Catalog {
    pub(crate) fn new(http: Arc<HttpSession>) -> Self {
        Self { http }
    }

    /// List products, optionally filtered by category id or name
    pub async fn products(&self, category: Option<&str>) -> Result<Vec<Product>, Error> {
        let mut spec = Fetch::get("products/");
        if let Some(category) = category {
            spec = spec.query("category", category);
        }
        self.http.execute(spec).await
    }

    /// Fetch a single product
    pub async fn product(&self, id: &str) -> Result<Product, Error> {
        self.http.execute(Fetch::get(&format!("products/{}/", id))).await
    }

    /// List all categories
    pub async fn categories(&self) -> Result<Vec<Category>, Error> {
        self.http.execute(Fetch::get("categories/")).await
    }

    /// List the reviews for a product, newest first
    pub async fn reviews(&self, product_id: &str) -> Result<Vec<Review>, Error> {
        let spec = Fetch::get("reviews/").query("product", product_id);
        self.http.execute(spec).await
    }

    /// Submit a review for a product
    pub async fn submit_review(&self, review: &NewReview) -> Result<Review, Error> {
        let spec = Fetch::post("reviews/").json(review)?;
        self.http.execute(spec).await
    }
}
