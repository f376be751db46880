//! Shared HTTP plumbing for every backend call.
//!
//! # Architecture
//!
//! - One `reqwest` client with a cookie store, so the backend session cookie
//!   rides along on every request
//! - Every endpoint path is joined onto the configured base URL
//! - Responses go through a single classifier ([`response::classify`]) that
//!   turns HTML error pages, unparseable bodies, non-2xx statuses and
//!   `{"success": false}` payloads into a tagged [`ApiError`]
//!
//! # Example
//!
//! ```rust,ignore
//! use bazaar_storefront::api::ApiClient;
//!
//! let api = ApiClient::new(&config.base_url)?;
//! let count: CartCount = api.get_json("cart", &[("action", "count"), ("format", "json")]).await?;
//! ```

mod client;
pub mod response;

pub use client::ApiClient;

use thiserror::Error;

/// Errors that can occur when talking to the shop backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, DNS, ...).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status, an explicit
    /// `{"success": false}` payload, or an HTML error page.
    #[error("{message}")]
    Server {
        /// HTTP status, when the failure came from one.
        status: Option<u16>,
        /// Human-readable message, taken from the body where possible.
        message: String,
    },

    /// The body could not be interpreted as the expected JSON document.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// An endpoint URL could not be built from the base URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Build a server error.
    pub fn server(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    /// HTTP status attached to a server error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => *status,
            _ => None,
        }
    }
}
