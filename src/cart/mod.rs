//! Client-side mirror of the server cart and wishlist
//!
//! Local state changes only from confirmed server responses: every mutating
//! operation either replaces the affected entry with the record the server
//! returned or leaves the mirror untouched on failure. There is no
//! speculative local mutation that could desync from the server.

mod types;

use serde::Serialize;
use std::sync::{Arc, RwLock};
use tracing::debug;

use crate::auth::SharedSessionState;
use crate::error::{Error, FieldErrors};
use crate::fetch::Fetch;
use crate::http::HttpSession;

pub use types::{CartItem, WishlistItem};

#[derive(Serialize)]
struct AddToCartRequest<'a> {
    product_id: &'a str,
    quantity: u32,
}

#[derive(Serialize)]
struct UpdateQuantityRequest {
    quantity: u32,
}

#[derive(Serialize)]
struct AddToWishlistRequest<'a> {
    product_id: &'a str,
}

/// The cart and wishlist state container
pub struct CartStore {
    http: Arc<HttpSession>,
    session: SharedSessionState,
    items: RwLock<Vec<CartItem>>,
    wishlist: RwLock<Vec<WishlistItem>>,
}

impl CartStore {
    pub(crate) fn new(http: Arc<HttpSession>, session: SharedSessionState) -> Self {
        Self {
            http,
            session,
            items: RwLock::new(Vec::new()),
            wishlist: RwLock::new(Vec::new()),
        }
    }

    /// Mutating operations require an authenticated session and fail without
    /// touching the network otherwise.
    fn require_login(&self) -> Result<(), Error> {
        if self.session.read().unwrap().user().is_some() {
            Ok(())
        } else {
            Err(Error::auth("login required"))
        }
    }

    fn quantity_error(message: &str) -> Error {
        let mut fields = FieldErrors::new();
        fields.insert("quantity".to_string(), vec![message.to_string()]);
        Error::Validation(fields)
    }

    /// Replace-or-append a server-confirmed cart entry, keyed by product.
    /// Keeps the merge invariant: at most one entry per product.
    fn merge_cart_entry(&self, entry: CartItem) {
        let mut items = self.items.write().unwrap();
        match items.iter_mut().find(|i| i.product.id == entry.product.id) {
            Some(existing) => *existing = entry,
            None => items.push(entry),
        }
    }

    /// The current cart entries
    pub fn items(&self) -> Vec<CartItem> {
        self.items.read().unwrap().clone()
    }

    /// The current wishlist entries
    pub fn wishlist(&self) -> Vec<WishlistItem> {
        self.wishlist.read().unwrap().clone()
    }

    /// Drop all local cart and wishlist state (logout, successful checkout)
    pub(crate) fn clear_local(&self) {
        self.items.write().unwrap().clear();
        self.wishlist.write().unwrap().clear();
    }

    /// Re-fetch the cart from the server
    pub async fn refresh_cart(&self) -> Result<Vec<CartItem>, Error> {
        self.require_login()?;
        let items: Vec<CartItem> = self.http.execute(Fetch::get("cart/")).await?;
        *self.items.write().unwrap() = items.clone();
        Ok(items)
    }

    /// Re-fetch the wishlist from the server
    pub async fn refresh_wishlist(&self) -> Result<Vec<WishlistItem>, Error> {
        self.require_login()?;
        let items: Vec<WishlistItem> = self.http.execute(Fetch::get("wishlist/")).await?;
        *self.wishlist.write().unwrap() = items.clone();
        Ok(items)
    }

    /// Add a product to the cart. The server merges quantities into any
    /// existing entry for the product and returns the merged record, which
    /// replaces the local entry.
    pub async fn add_to_cart(&self, product_id: &str, quantity: u32) -> Result<CartItem, Error> {
        self.require_login()?;
        let spec = Fetch::post("cart/").json(&AddToCartRequest {
            product_id,
            quantity,
        })?;
        let entry: CartItem = self.http.execute(spec).await?;
        self.merge_cart_entry(entry.clone());
        debug!(product = %product_id, "added to cart");
        Ok(entry)
    }

    /// Change the quantity of one cart entry, addressed by entry id.
    /// Quantities below 1 or above the product's stock are rejected
    /// client-side without a network call.
    pub async fn update_quantity(
        &self,
        cart_item_id: i64,
        quantity: u32,
    ) -> Result<CartItem, Error> {
        self.require_login()?;

        if quantity < 1 {
            return Err(Self::quantity_error("Quantity must be at least 1"));
        }
        let stock = {
            let items = self.items.read().unwrap();
            let item = items
                .iter()
                .find(|i| i.id == cart_item_id)
                .ok_or_else(|| Error::general("no such cart entry"))?;
            item.product.stock
        };
        if quantity > stock {
            return Err(Self::quantity_error(&format!(
                "Only {} items available",
                stock
            )));
        }

        let spec = Fetch::patch(&format!("cart/{}/", cart_item_id))
            .json(&UpdateQuantityRequest { quantity })?;
        let entry: CartItem = self.http.execute(spec).await?;

        let mut items = self.items.write().unwrap();
        if let Some(existing) = items.iter_mut().find(|i| i.id == cart_item_id) {
            *existing = entry.clone();
        }
        Ok(entry)
    }

    /// Remove one cart entry, addressed by entry id
    pub async fn remove_from_cart(&self, cart_item_id: i64) -> Result<(), Error> {
        self.require_login()?;
        self.http
            .execute_empty(Fetch::delete(&format!("cart/{}/", cart_item_id)))
            .await?;
        self.items.write().unwrap().retain(|i| i.id != cart_item_id);
        Ok(())
    }

    /// Add a product to the wishlist; at most one entry per product
    pub async fn add_to_wishlist(&self, product_id: &str) -> Result<WishlistItem, Error> {
        self.require_login()?;
        let spec = Fetch::post("wishlist/").json(&AddToWishlistRequest { product_id })?;
        let entry: WishlistItem = self.http.execute(spec).await?;

        let mut wishlist = self.wishlist.write().unwrap();
        match wishlist
            .iter_mut()
            .find(|i| i.product.id == entry.product.id)
        {
            Some(existing) => *existing = entry.clone(),
            None => wishlist.push(entry.clone()),
        }
        Ok(entry)
    }

    /// Remove one wishlist entry, addressed by entry id
    pub async fn remove_from_wishlist(&self, wishlist_item_id: i64) -> Result<(), Error> {
        self.require_login()?;
        self.http
            .execute_empty(Fetch::delete(&format!("wishlist/{}/", wishlist_item_id)))
            .await?;
        self.wishlist
            .write()
            .unwrap()
            .retain(|i| i.id != wishlist_item_id);
        Ok(())
    }

    /// Move a product from the wishlist into the cart. The server performs
    /// the removal and the cart merge as one call; the single response
    /// drives both local updates.
    pub async fn move_to_cart(&self, product_id: &str, quantity: u32) -> Result<CartItem, Error> {
        self.require_login()?;
        let spec = Fetch::post("wishlist/move_to_cart/").json(&AddToCartRequest {
            product_id,
            quantity,
        })?;
        let entry: CartItem = self.http.execute(spec).await?;

        self.wishlist
            .write()
            .unwrap()
            .retain(|i| i.product.id != product_id);
        self.merge_cart_entry(entry.clone());
        debug!(product = %product_id, "moved to cart");
        Ok(entry)
    }
}
