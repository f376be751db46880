//! Page changes the host performs on behalf of the client.
//!
//! The storefront never touches a browser location itself. Operations that
//! would have redirected return a [`Navigation`] and the host decides how to
//! follow it.

use std::time::Duration;

/// Storefront pages the client knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Index,
    Login,
    Register,
    Products,
    ProductDetail,
    Cart,
    Checkout,
    OrderSuccess,
    Profile,
    Orders,
    Wishlist,
}

impl Page {
    /// Pages that redirect anonymous visitors to the login page.
    pub const PROTECTED: [Self; 4] = [Self::Profile, Self::Orders, Self::Checkout, Self::Cart];

    /// File name of the page, relative to the site root.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Index => "index.html",
            Self::Login => "login.html",
            Self::Register => "register.html",
            Self::Products => "products.html",
            Self::ProductDetail => "product-detail.html",
            Self::Cart => "cart.html",
            Self::Checkout => "checkout.html",
            Self::OrderSuccess => "order-success.html",
            Self::Profile => "profile.html",
            Self::Orders => "orders.html",
            Self::Wishlist => "wishlist.html",
        }
    }

    /// Identify the page a location points at.
    ///
    /// Accepts absolute URLs as well as bare file names; the query string
    /// and fragment are ignored.
    #[must_use]
    pub fn from_location(location: &str) -> Option<Self> {
        let name = page_name(location);
        [
            Self::Index,
            Self::Login,
            Self::Register,
            Self::Products,
            Self::ProductDetail,
            Self::Cart,
            Self::Checkout,
            Self::OrderSuccess,
            Self::Profile,
            Self::Orders,
            Self::Wishlist,
        ]
        .into_iter()
        .find(|page| page.path() == name)
    }

    /// Whether visiting the page requires a logged-in user.
    #[must_use]
    pub fn is_protected(self) -> bool {
        Self::PROTECTED.contains(&self)
    }
}

impl std::fmt::Display for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Last path segment of a location, without query or fragment.
fn page_name(location: &str) -> &str {
    let end = location.find(['?', '#']).unwrap_or(location.len());
    let path = location.get(..end).unwrap_or(location);
    path.rsplit('/').next().unwrap_or(path)
}

/// A page change to perform, optionally after a delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// Relative target, e.g. `order-success.html?orderId=42`.
    pub target: String,
    /// How long the host should wait before navigating.
    pub delay: Option<Duration>,
}

impl Navigation {
    /// Navigate immediately.
    pub fn to(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            delay: None,
        }
    }

    /// Navigate immediately to a known page.
    #[must_use]
    pub fn page(page: Page) -> Self {
        Self::to(page.path())
    }

    /// Login page that sends the user back to `current` afterwards.
    #[must_use]
    pub fn login_redirect(current: &str) -> Self {
        Self::to(format!(
            "{}?redirect={}",
            Page::Login.path(),
            urlencoding::encode(current)
        ))
    }

    /// Delay the navigation.
    #[must_use]
    pub const fn after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl std::fmt::Display for Navigation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.delay {
            Some(delay) => write!(f, "{} (after {}ms)", self.target, delay.as_millis()),
            None => f.write_str(&self.target),
        }
    }
}

/// Outcome of an operation that needs a logged-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Guarded<T> {
    /// The operation ran.
    Allowed(T),
    /// No user; nothing was sent and the host should go to the login page.
    LoginRequired(Navigation),
}

impl<T> Guarded<T> {
    /// Whether the operation ran.
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed(_))
    }

    /// The operation's value, if it ran.
    pub fn allowed(self) -> Option<T> {
        match self {
            Self::Allowed(value) => Some(value),
            Self::LoginRequired(_) => None,
        }
    }

    /// Transform the value of an operation that ran.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Guarded<U> {
        match self {
            Self::Allowed(value) => Guarded::Allowed(f(value)),
            Self::LoginRequired(nav) => Guarded::LoginRequired(nav),
        }
    }
}
