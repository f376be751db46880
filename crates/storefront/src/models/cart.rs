//! Cart lines as reported by `GET /cart?format=json`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use bazaar_core::{CartItemId, Price, ProductId};

use super::{lenient_i64, lenient_string, lenient_u32};

/// Shown when a line has no product name.
pub const UNNAMED_PRODUCT: &str = "Unnamed Product";

/// Shown when a line has no image.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/80?text=No+Image";

/// One cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub cart_item_id: Option<CartItemId>,
    pub product_id: Option<ProductId>,
    pub product_name: Option<String>,
    pub price: Price,
    pub quantity: u32,
    pub subtotal: Price,
    pub image_url: Option<String>,
}

impl CartItem {
    /// Name to display, with a placeholder for unnamed products.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.product_name.as_deref().unwrap_or(UNNAMED_PRODUCT)
    }

    /// Image to display, with a placeholder when none was sent.
    #[must_use]
    pub fn display_image(&self) -> &str {
        self.image_url.as_deref().unwrap_or(PLACEHOLDER_IMAGE)
    }
}

impl From<Map<String, Value>> for CartItem {
    fn from(raw: Map<String, Value>) -> Self {
        let field = |keys: &[&str]| keys.iter().find_map(|key| raw.get(*key));

        let price = field(&["price"])
            .and_then(Price::from_json)
            .unwrap_or(Price::ZERO);
        let quantity = field(&["quantity"]).and_then(lenient_u32).unwrap_or(1);
        let subtotal = field(&["subtotal"])
            .and_then(Price::from_json)
            .unwrap_or_else(|| price * rust_decimal::Decimal::from(quantity));

        Self {
            cart_item_id: field(&["cartItemId", "id"])
                .and_then(lenient_i64)
                .map(CartItemId::new),
            product_id: field(&["productId"]).and_then(lenient_i64).map(ProductId::new),
            product_name: field(&["productName"]).and_then(lenient_string),
            price,
            quantity,
            subtotal,
            image_url: field(&["imageUrl", "productImage"]).and_then(lenient_string),
        }
    }
}

/// Body of `GET /cart?format=json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CartContents {
    #[serde(default)]
    pub items: Vec<CartItem>,
}

/// Body of `GET /cart?action=count&format=json`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub(crate) struct CartCount {
    #[serde(default, deserialize_with = "count_or_zero")]
    pub count: u32,
}

fn count_or_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(lenient_u32(&value).unwrap_or(0))
}

/// Body of a successful `POST /cart`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartMutation {
    #[serde(default)]
    pub message: Option<String>,
    /// Item count after the change, when the backend reports it.
    #[serde(default)]
    pub cart_count: Option<u32>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cart_line_from_cart_endpoint() {
        let item: CartItem = serde_json::from_value(json!({
            "id": 5,
            "cartItemId": 5,
            "productId": 12,
            "productName": "USB-C Hub",
            "price": 24.5,
            "quantity": 2,
            "subtotal": 49.0,
            "productImage": "https://img.example/hub.png"
        }))
        .unwrap();

        assert_eq!(item.cart_item_id, Some(CartItemId::new(5)));
        assert_eq!(item.product_id, Some(ProductId::new(12)));
        assert_eq!(item.subtotal.display(), "$49.00");
        assert_eq!(item.display_image(), "https://img.example/hub.png");
    }

    #[test]
    fn test_cart_line_fallbacks() {
        let item: CartItem = serde_json::from_value(json!({
            "id": "8",
            "price": "10.25",
            "quantity": 3
        }))
        .unwrap();

        assert_eq!(item.cart_item_id, Some(CartItemId::new(8)));
        assert_eq!(item.display_name(), UNNAMED_PRODUCT);
        assert_eq!(item.display_image(), PLACEHOLDER_IMAGE);
        assert_eq!(item.subtotal.display(), "$30.75");
    }

    #[test]
    fn test_quantity_defaults_to_one() {
        let item: CartItem = serde_json::from_value(json!({"price": 4})).unwrap();
        assert_eq!(item.quantity, 1);
        assert_eq!(item.subtotal.display(), "$4.00");
    }

    #[test]
    fn test_zero_subtotal_is_kept() {
        let item: CartItem =
            serde_json::from_value(json!({"price": 4, "quantity": 2, "subtotal": 0})).unwrap();
        assert_eq!(item.subtotal, Price::ZERO);
    }

    #[test]
    fn test_enormous_line_total_saturates() {
        let item: CartItem = serde_json::from_value(
            json!({"price": "79228162514264337593543950335", "quantity": 4}),
        )
        .unwrap();
        assert_eq!(item.subtotal.amount(), rust_decimal::Decimal::MAX);
    }

    #[test]
    fn test_cart_contents_without_items() {
        let contents: CartContents = serde_json::from_value(json!({"success": true})).unwrap();
        assert!(contents.items.is_empty());
    }

    #[test]
    fn test_count_is_lenient() {
        let count: CartCount = serde_json::from_value(json!({"count": "3"})).unwrap();
        assert_eq!(count.count, 3);
        let count: CartCount = serde_json::from_value(json!({"count": null})).unwrap();
        assert_eq!(count.count, 0);
        let count: CartCount = serde_json::from_value(json!({})).unwrap();
        assert_eq!(count.count, 0);
    }

    #[test]
    fn test_mutation_body() {
        let body: CartMutation = serde_json::from_value(json!({
            "success": true,
            "message": "Product added to cart successfully",
            "cartCount": 4
        }))
        .unwrap();
        assert_eq!(body.cart_count, Some(4));
    }
}
