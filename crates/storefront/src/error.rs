//! Unified error handling with Sentry integration.
//!
//! Provides a unified `ClientError` type for every storefront operation.
//! Mutating operations return `Result<T, ClientError>`; read operations
//! swallow failures into safe defaults and only log them.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::session::StorageError;

/// Fallback message for failures with no better explanation.
const NETWORK_HINT: &str = "Network error. Check server connection.";

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Backend request failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Client-side form validation failed.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Durable client storage could not be written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// Text suitable for a user-facing notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(ApiError::Network(_)) => NETWORK_HINT.to_string(),
            Self::Api(ApiError::Server { message, .. }) => message.clone(),
            Self::Api(ApiError::InvalidResponse(message)) => message.clone(),
            Self::Api(ApiError::Url(_)) | Self::Config(_) => {
                "The shop address is misconfigured".to_string()
            }
            Self::Validation(err) => err.message.clone(),
            Self::Storage(_) => "Could not save your session on this device".to_string(),
        }
    }
}

/// A client-side form check failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} ({})", .fields.join(", "))]
pub struct ValidationError {
    /// Message shown to the user.
    pub message: String,
    /// Names of the offending fields, in form order.
    pub fields: Vec<&'static str>,
}

impl ValidationError {
    /// Create a validation error.
    pub fn new(message: impl Into<String>, fields: Vec<&'static str>) -> Self {
        Self {
            message: message.into(),
            fields,
        }
    }
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Set the Sentry user context after a successful login.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added product", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
