//! Storefront context shared by every page.
//!
//! Services are constructed here in a fixed order: the session first, since
//! the cart depends on it, then the cart and notifications. Page-scoped
//! state ([`ProductCatalog`], [`CheckoutFlow`]) is created on demand.

use std::sync::Arc;

use askama::Template;
use tracing::{info, instrument};

use bazaar_core::ProductId;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::models::{CartMutation, LoginCredentials, User};
use crate::navigation::{Guarded, Navigation};
use crate::services::{CartService, CheckoutFlow, Notifier, ProductCatalog};
use crate::session::{FileStorage, SessionStorage, SessionStore};
use crate::views::UserMenuTemplate;

/// Storefront context.
///
/// This struct is cheaply cloneable via `Arc` and gives access to the
/// shared services.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: ClientConfig,
    api: ApiClient,
    session: SessionStore,
    cart: CartService,
    notifier: Notifier,
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("base_url", &self.inner.config.base_url.as_str())
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}

impl Storefront {
    /// Create a storefront persisting the session to the configured file.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let storage = FileStorage::new(&config.session_file);
        Self::with_storage(config, storage)
    }

    /// Create a storefront over the given session storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_storage(config: ClientConfig, storage: impl SessionStorage + 'static) -> Result<Self> {
        let api = ApiClient::new(&config.base_url)?;
        let session = SessionStore::new(api.clone(), storage);
        let cart = CartService::new(api.clone(), session.clone());
        let notifier = Notifier::new(config.toasts_enabled);

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                api,
                session,
                cart,
                notifier,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    #[must_use]
    pub fn cart(&self) -> &CartService {
        &self.inner.cart
    }

    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    /// State for a product listing page.
    #[must_use]
    pub fn catalog(&self) -> ProductCatalog {
        ProductCatalog::new(self.inner.api.clone(), self.inner.notifier.clone())
    }

    /// State for a checkout page.
    #[must_use]
    pub fn checkout(&self) -> CheckoutFlow {
        CheckoutFlow::new(self.inner.api.clone(), self.inner.notifier.clone())
    }

    /// Prepare a page: restore the session, record the location and run the
    /// route guard. Returns a navigation when the visitor must log in first;
    /// otherwise refreshes the cart badge.
    #[instrument(skip(self))]
    pub async fn open_page(&self, location: &str) -> Option<Navigation> {
        let session = &self.inner.session;
        session.load_from_storage();
        session.set_location(location);

        if let Some(nav) = session.guard() {
            info!(target = %nav.target, "Login required for page");
            return Some(nav);
        }

        self.inner.cart.refresh_count().await;
        None
    }

    /// Log in and refresh the cart badge for the new user.
    ///
    /// # Errors
    ///
    /// See [`SessionStore::login`].
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<User> {
        let user = self.inner.session.login(credentials).await?;
        self.inner.cart.refresh_count().await;
        Ok(user)
    }

    /// Log out and reset the cart badge.
    pub async fn logout(&self) -> Navigation {
        let nav = self.inner.session.logout().await;
        self.inner.cart.refresh_count().await;
        nav
    }

    /// Add a product to the cart and tell the user how it went.
    ///
    /// # Errors
    ///
    /// Returns the cart error after showing it as a notification.
    pub async fn add_to_cart(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Guarded<CartMutation>> {
        match self.inner.cart.add_item(product_id, quantity).await {
            Ok(Guarded::Allowed(result)) => {
                self.inner.notifier.success("Product added to cart!");
                Ok(Guarded::Allowed(result))
            }
            Ok(blocked) => Ok(blocked),
            Err(e) => {
                let message = e.user_message();
                self.inner.notifier.error(if message.is_empty() {
                    "Failed to add product to cart".to_string()
                } else {
                    message
                });
                Err(e)
            }
        }
    }

    /// Render the navigation user menu for the current session.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render_user_menu(&self) -> askama::Result<String> {
        UserMenuTemplate::new(self.inner.session.current_user().as_ref()).render()
    }
}
