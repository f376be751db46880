//! Bazaar Storefront library.
//!
//! Client-side logic of the Bazaar shop: session, cart, product catalog and
//! checkout, talking to the shop backend over HTTP. Everything a browser
//! page would do directly (rewrite the DOM, change location, submit a
//! hidden form) is returned to the host as a value: rendered fragments,
//! [`navigation::Navigation`]s, a [`services::PaymentRedirect`] and
//! [`services::Notification`]s.
//!
//! # Modules
//!
//! - [`api`] - HTTP client and response classification
//! - [`session`] - Logged-in user, route guard and durable storage
//! - [`services`] - Cart, catalog, checkout and notifications
//! - [`views`] - askama fragments over view models
//! - [`state`] - The [`state::Storefront`] context wiring it together

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod navigation;
pub mod services;
pub mod session;
pub mod state;
pub mod views;

pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use state::Storefront;
