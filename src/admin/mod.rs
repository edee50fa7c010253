//! Admin console operations: product, order and user management
//!
//! Authorization is enforced server-side (staff-only endpoints); this client
//! only exposes the operations. Use route guards to keep non-admin users out
//! of admin views.

mod types;

use std::sync::Arc;

use crate::auth::User;
use crate::catalog::Product;
use crate::error::Error;
use crate::fetch::Fetch;
use crate::http::HttpSession;
use crate::orders::{Order, OrderStatus};

pub use types::{BlockStatus, NewProduct, NewUser, ProductPatch};

/// Client for the admin endpoints
pub struct Admin {
    http: Arc<HttpSession>,
}

impl Admin {
    pub(crate) fn new(http: Arc<HttpSession>) -> Self {
        Self { http }
    }

    /// Create a product
    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, Error> {
        let spec = Fetch::post("products/").json(product)?;
        self.http.execute(spec).await
    }

    /// Replace a product
    pub async fn update_product(&self, id: &str, product: &NewProduct) -> Result<Product, Error> {
        let spec = Fetch::put(&format!("products/{}/", id)).json(product)?;
        self.http.execute(spec).await
    }

    /// Partially update a product
    pub async fn patch_product(&self, id: &str, patch: &ProductPatch) -> Result<Product, Error> {
        let spec = Fetch::patch(&format!("products/{}/", id)).json(patch)?;
        self.http.execute(spec).await
    }

    /// Delete a product
    pub async fn delete_product(&self, id: &str) -> Result<(), Error> {
        self.http
            .execute_empty(Fetch::delete(&format!("products/{}/", id)))
            .await
    }

    /// List every order across all users
    pub async fn orders(&self) -> Result<Vec<Order>, Error> {
        self.http.execute(Fetch::get("admin/orders/")).await
    }

    /// The statuses an order may be moved to
    pub async fn order_statuses(&self) -> Result<Vec<String>, Error> {
        self.http.execute(Fetch::get("admin/orders/statuses/")).await
    }

    /// Move an order to a new status
    pub async fn set_order_status(
        &self,
        order_id: i64,
        status: OrderStatus,
    ) -> Result<Order, Error> {
        let spec = Fetch::patch(&format!("admin/orders/{}/", order_id))
            .json(&serde_json::json!({ "status": status.as_str() }))?;
        self.http.execute(spec).await
    }

    /// List all user accounts
    pub async fn users(&self) -> Result<Vec<User>, Error> {
        self.http.execute(Fetch::get("users/")).await
    }

    /// Create a user account
    pub async fn create_user(&self, user: &NewUser) -> Result<User, Error> {
        let spec = Fetch::post("users/").json(user)?;
        self.http.execute(spec).await
    }

    /// Partially update a user account
    pub async fn update_user(
        &self,
        user_id: &str,
        patch: &serde_json::Value,
    ) -> Result<User, Error> {
        let spec = Fetch::patch(&format!("users/{}/", user_id)).json(patch)?;
        self.http.execute(spec).await
    }

    /// Block a user account
    pub async fn block_user(&self, user_id: &str) -> Result<BlockStatus, Error> {
        let spec =
            Fetch::patch(&format!("users/{}/block_user/", user_id)).json(&serde_json::json!({}))?;
        self.http.execute(spec).await
    }

    /// Unblock a user account
    pub async fn unblock_user(&self, user_id: &str) -> Result<BlockStatus, Error> {
        let spec = Fetch::patch(&format!("users/{}/unblock_user/", user_id))
            .json(&serde_json::json!({}))?;
        self.http.execute(spec).await
    }
}
