//! Cart operations against `/cart`.
//!
//! Mutations need a logged-in user: without one they send nothing and
//! return [`Guarded::LoginRequired`]. Reads never fail; any problem yields
//! an empty cart or a zero count.

use std::sync::Arc;

use askama::Template;
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};

use bazaar_core::{CartItemId, ProductId};

use crate::api::ApiClient;
use crate::error::{Result, add_breadcrumb};
use crate::models::cart::CartCount;
use crate::models::{CartContents, CartItem, CartMutation};
use crate::navigation::Guarded;
use crate::session::SessionStore;
use crate::views::{CartCountTemplate, CartItemsTemplate};

const CART_PATH: &str = "cart";

/// Cart service.
///
/// Cheap to clone; clones share the badge count.
#[derive(Clone)]
pub struct CartService {
    inner: Arc<CartInner>,
}

struct CartInner {
    api: ApiClient,
    session: SessionStore,
    count: watch::Sender<u32>,
}

impl std::fmt::Debug for CartService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartService")
            .field("count", &*self.inner.count.borrow())
            .finish_non_exhaustive()
    }
}

impl CartService {
    #[must_use]
    pub fn new(api: ApiClient, session: SessionStore) -> Self {
        let (count, _) = watch::channel(0);
        Self {
            inner: Arc::new(CartInner {
                api,
                session,
                count,
            }),
        }
    }

    /// Add a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns the backend's error when the item cannot be added.
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Guarded<CartMutation>> {
        let outcome = self
            .mutate(
                vec![
                    ("action", "add".to_string()),
                    ("productId", product_id.to_string()),
                    ("quantity", quantity.to_string()),
                ],
                "Failed to add to cart",
            )
            .await?;

        if outcome.is_allowed() {
            let id = product_id.to_string();
            add_breadcrumb("cart", "Added product", Some(&[("product_id", id.as_str())]));
        }
        Ok(outcome)
    }

    /// Change the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns the backend's error when the line cannot be updated.
    #[instrument(skip(self))]
    pub async fn update_item(
        &self,
        cart_item_id: CartItemId,
        quantity: u32,
    ) -> Result<Guarded<CartMutation>> {
        self.mutate(
            vec![
                ("action", "update".to_string()),
                ("cartItemId", cart_item_id.to_string()),
                ("quantity", quantity.to_string()),
            ],
            "Failed to update cart item",
        )
        .await
    }

    /// Remove a cart line.
    ///
    /// # Errors
    ///
    /// Returns the backend's error when the line cannot be removed.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, cart_item_id: CartItemId) -> Result<Guarded<CartMutation>> {
        self.mutate(
            vec![
                ("action", "remove".to_string()),
                ("cartItemId", cart_item_id.to_string()),
            ],
            "Failed to remove item",
        )
        .await
    }

    /// Empty the cart. Clearing an empty cart succeeds.
    ///
    /// # Errors
    ///
    /// Returns the backend's error when the cart cannot be cleared.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<Guarded<CartMutation>> {
        self.mutate(vec![("action", "clear".to_string())], "Failed to clear cart")
            .await
    }

    async fn mutate(
        &self,
        form: Vec<(&'static str, String)>,
        fallback: &str,
    ) -> Result<Guarded<CartMutation>> {
        if let Some(nav) = self.inner.session.login_required() {
            info!(target = %nav.target, "Cart change needs a logged-in user");
            return Ok(Guarded::LoginRequired(nav));
        }

        let result = self
            .inner
            .api
            .post_form::<CartMutation>(CART_PATH, &form, fallback)
            .await
            .inspect_err(|e| error!(error = %e, "Cart change failed"))?;

        self.refresh_count().await;
        Ok(Guarded::Allowed(result))
    }

    /// Lines currently in the cart; empty on any failure.
    #[instrument(skip(self))]
    pub async fn list_items(&self) -> Vec<CartItem> {
        if !self.inner.session.is_authenticated() {
            return Vec::new();
        }

        match self
            .inner
            .api
            .get_json::<CartContents>(CART_PATH, &[("format", "json")])
            .await
        {
            Ok(contents) => contents.items,
            Err(e) => {
                warn!(error = %e, "Failed to list cart items");
                Vec::new()
            }
        }
    }

    /// Number of items in the cart; zero on any failure.
    #[instrument(skip(self))]
    pub async fn count(&self) -> u32 {
        if !self.inner.session.is_authenticated() {
            return 0;
        }

        match self
            .inner
            .api
            .get_json::<CartCount>(CART_PATH, &[("action", "count"), ("format", "json")])
            .await
        {
            Ok(body) => body.count,
            Err(e) => {
                warn!(error = %e, "Failed to fetch cart count");
                0
            }
        }
    }

    /// Fetch the count and publish it to the badge.
    pub async fn refresh_count(&self) -> u32 {
        let count = self.count().await;
        self.inner.count.send_replace(count);
        count
    }

    /// Last published badge count.
    #[must_use]
    pub fn badge_count(&self) -> u32 {
        *self.inner.count.borrow()
    }

    /// Watch badge count changes.
    #[must_use]
    pub fn subscribe_count(&self) -> watch::Receiver<u32> {
        self.inner.count.subscribe()
    }

    /// Render the badge for the last published count.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn cart_count_badge(&self) -> askama::Result<String> {
        CartCountTemplate {
            count: self.badge_count(),
        }
        .render()
    }

    /// Fetch the cart and render the cart page listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub async fn render_cart_page(&self) -> askama::Result<String> {
        let items = self.list_items().await;
        CartItemsTemplate::new(&items).render()
    }
}
