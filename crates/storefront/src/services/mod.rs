//! Storefront services.
//!
//! # Services
//!
//! - [`notify`] - Toast and banner notifications
//! - [`cart`] - Cart mutations, listing and the count badge
//! - [`catalog`] - Product listing, filtering and pagination
//! - [`checkout`] - Shipping, order creation and payment

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod notify;

pub use cart::CartService;
pub use catalog::{ProductCatalog, ProductQuery, SortOrder};
pub use checkout::{CheckoutFlow, CheckoutStep, PaymentOutcome, PaymentRedirect};
pub use notify::{Notification, Notifier, Presentation, Severity};
