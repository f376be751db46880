//! Checkout summary, order and payment payloads.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use bazaar_core::{OrderId, Price};

use super::CartItem;

/// Shipping charged when the backend does not report one.
pub const FALLBACK_SHIPPING: Price = Price::from_cents(599);

/// Tax rate applied when the backend does not report tax.
pub const FALLBACK_TAX_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Order totals as displayed on the checkout page.
///
/// Every field is always defined: missing or unparseable values fall back
/// to subtotal `0`, shipping [`FALLBACK_SHIPPING`], tax
/// [`FALLBACK_TAX_RATE`] of the subtotal and total as the sum of the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    pub subtotal: Price,
    pub shipping: Price,
    pub tax: Price,
    pub total: Price,
}

impl OrderTotals {
    /// Totals shown for an empty cart.
    pub const EMPTY: Self = Self {
        subtotal: Price::ZERO,
        shipping: Price::ZERO,
        tax: Price::ZERO,
        total: Price::ZERO,
    };

    /// Read totals from the `totals` object of the checkout summary.
    #[must_use]
    pub fn from_json(totals: Option<&Value>) -> Self {
        let field = |key: &str| totals.and_then(|t| t.get(key)).and_then(Price::from_json);

        let subtotal = field("subtotal").unwrap_or(Price::ZERO);
        let shipping = field("shipping").unwrap_or(FALLBACK_SHIPPING);
        let tax = field("tax").unwrap_or_else(|| subtotal * FALLBACK_TAX_RATE);
        let total = field("total").unwrap_or_else(|| subtotal + shipping + tax);

        Self {
            subtotal,
            shipping,
            tax,
            total,
        }
    }
}

/// Body of `GET /checkout/summary`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSummary {
    pub items: Vec<CartItem>,
    pub totals: OrderTotals,
}

impl CheckoutSummary {
    /// Interpret a summary document.
    ///
    /// Returns `None` when `items` is missing or not an array.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        let items = value
            .get("items")?
            .as_array()?
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect();

        Some(Self {
            items,
            totals: OrderTotals::from_json(value.get("totals")),
        })
    }
}

/// Shipping form data, sent as the JSON `shippingAddress` of a new order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// Body of a successful `POST /checkout/createOrder`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of a successful `POST /checkout/payhere/initiate`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayHereInitiation {
    pub payment_url: String,
    #[serde(deserialize_with = "stringify_values")]
    pub payhere_data: BTreeMap<String, String>,
}

/// Gateway fields are submitted as form text, whatever their JSON type.
fn stringify_values<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (key, text)
        })
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_totals_fallbacks() {
        let totals = OrderTotals::from_json(Some(&json!({"subtotal": 100})));
        assert_eq!(totals.shipping.display(), "$5.99");
        assert_eq!(totals.tax.display(), "$10.00");
        assert_eq!(totals.total.display(), "$115.99");
    }

    #[test]
    fn test_totals_without_object() {
        let totals = OrderTotals::from_json(None);
        assert_eq!(totals.subtotal, Price::ZERO);
        assert_eq!(totals.shipping, FALLBACK_SHIPPING);
        assert_eq!(totals.tax, Price::ZERO);
        assert_eq!(totals.total.display(), "$5.99");
    }

    #[test]
    fn test_totals_reported_values_win() {
        let totals = OrderTotals::from_json(Some(&json!({
            "subtotal": "40.00",
            "shipping": 0,
            "tax": "4.00",
            "total": 44
        })));
        assert_eq!(totals.shipping, Price::ZERO);
        assert_eq!(totals.total.display(), "$44.00");
    }

    #[test]
    fn test_totals_with_enormous_subtotal_do_not_panic() {
        let totals =
            OrderTotals::from_json(Some(&json!({"subtotal": "79228162514264337593543950335"})));
        assert_eq!(totals.subtotal.amount(), Decimal::MAX);
        assert_eq!(totals.total.amount(), Decimal::MAX);
    }

    #[test]
    fn test_totals_unparseable_field_falls_back() {
        let totals = OrderTotals::from_json(Some(&json!({"subtotal": 20, "tax": "?"})));
        assert_eq!(totals.tax.display(), "$2.00");
    }

    #[test]
    fn test_summary_requires_item_array() {
        assert!(CheckoutSummary::from_json(&json!({"items": "not-an-array"})).is_none());
        assert!(CheckoutSummary::from_json(&json!({"totals": {}})).is_none());

        let summary = CheckoutSummary::from_json(&json!({
            "items": [{"cartItemId": 1, "productName": "Cable", "price": 5, "quantity": 2}],
            "totals": {"subtotal": 10}
        }))
        .unwrap();
        assert_eq!(summary.items.len(), 1);
        assert_eq!(summary.totals.total.display(), "$16.99");
    }

    #[test]
    fn test_shipping_details_wire_names() {
        let value = serde_json::to_value(ShippingDetails {
            postal_code: "10100".into(),
            ..ShippingDetails::default()
        })
        .unwrap();
        assert_eq!(value["postalCode"], "10100");
        assert!(value.get("firstName").is_some());
    }

    #[test]
    fn test_payhere_values_are_stringified() {
        let init: PayHereInitiation = serde_json::from_value(json!({
            "success": true,
            "paymentUrl": "https://sandbox.payhere.lk/pay/checkout",
            "payhereData": {"merchant_id": 1232299, "amount": "115.99", "sandbox": true}
        }))
        .unwrap();
        assert_eq!(init.payhere_data["merchant_id"], "1232299");
        assert_eq!(init.payhere_data["sandbox"], "true");
    }
}
