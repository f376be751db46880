//! Data shapes exchanged with the shop backend.
//!
//! The backend is loose about types: ids and quantities sometimes arrive as
//! strings, prices as numbers, strings or nested objects. Wire records are
//! decoded leniently and converted into the strict types below.

pub mod cart;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{CartContents, CartItem, CartMutation};
pub use order::{
    CheckoutSummary, OrderConfirmation, OrderTotals, PayHereInitiation, ShippingDetails,
};
pub use product::{Category, CategoryFilter, CategoryOption, Product};
pub use user::{LoginCredentials, RegistrationForm, User};

use serde_json::Value;

/// Read an integer from a JSON number or numeric string.
pub(crate) fn lenient_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read a non-negative count from a JSON number or numeric string.
pub(crate) fn lenient_u32(value: &Value) -> Option<u32> {
    lenient_i64(value).and_then(|n| u32::try_from(n).ok())
}

/// Read a non-empty string.
pub(crate) fn lenient_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
