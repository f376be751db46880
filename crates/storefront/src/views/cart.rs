//! Cart lines, checkout summary and the cart-count badge.

use askama::Template;

use bazaar_core::Price;

use crate::models::{CartItem, OrderTotals};

/// One cart line, formatted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    /// Empty when the backend sent no line id.
    pub cart_item_id: String,
    pub name: String,
    pub image_url: String,
    pub unit_price: String,
    pub quantity: u32,
    pub subtotal: String,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            cart_item_id: item
                .cart_item_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            name: item.display_name().to_string(),
            image_url: item.display_image().to_string(),
            unit_price: item.price.display(),
            quantity: item.quantity,
            subtotal: item.subtotal.display(),
        }
    }
}

/// Order totals, formatted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTotalsView {
    pub subtotal: String,
    pub shipping: String,
    pub tax: String,
    pub total: String,
}

impl From<&OrderTotals> for OrderTotalsView {
    fn from(totals: &OrderTotals) -> Self {
        Self {
            subtotal: totals.subtotal.display(),
            shipping: totals.shipping.display(),
            tax: totals.tax.display(),
            total: totals.total.display(),
        }
    }
}

/// Checkout order summary: item rows or the empty-cart block, then totals.
#[derive(Template)]
#[template(path = "partials/order_summary.html")]
pub struct OrderSummaryTemplate {
    pub items: Vec<CartItemView>,
    pub totals: OrderTotalsView,
}

impl OrderSummaryTemplate {
    #[must_use]
    pub fn new(items: &[CartItem], totals: &OrderTotals) -> Self {
        Self {
            items: items.iter().map(CartItemView::from).collect(),
            totals: OrderTotalsView::from(totals),
        }
    }
}

/// Cart page listing.
#[derive(Template)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl CartItemsTemplate {
    #[must_use]
    pub fn new(items: &[CartItem]) -> Self {
        let subtotal = items
            .iter()
            .fold(Price::ZERO, |sum, item| sum + item.subtotal);

        Self {
            items: items.iter().map(CartItemView::from).collect(),
            subtotal: subtotal.display(),
            item_count: items
                .iter()
                .fold(0, |count: u32, item| count.saturating_add(item.quantity)),
        }
    }
}

/// Cart-count badge, hidden when the cart is empty.
#[derive(Template)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn items() -> Vec<CartItem> {
        serde_json::from_value(json!([
            {"cartItemId": 1, "productName": "Cable", "price": 5, "quantity": 2},
            {"cartItemId": 2, "price": "3.5", "quantity": 1, "subtotal": 3.5}
        ]))
        .unwrap()
    }

    #[test]
    fn test_order_summary_renders_rows_and_totals() {
        let totals = OrderTotals::from_json(Some(&json!({"subtotal": 13.5})));
        let html = OrderSummaryTemplate::new(&items(), &totals).render().unwrap();

        assert!(html.contains("Cable"));
        assert!(html.contains("Unnamed Product"));
        assert!(html.contains("$5.00 &times; 2"));
        assert!(html.contains("$10.00"));
        assert!(html.contains(r#"<span id="total">$20.84</span>"#));
        assert!(!html.contains("Your cart is empty"));
    }

    #[test]
    fn test_empty_summary() {
        let html = OrderSummaryTemplate::new(&[], &OrderTotals::EMPTY)
            .render()
            .unwrap();
        assert!(html.contains("Your cart is empty"));
        assert!(html.contains(r#"<span id="shipping">$0.00</span>"#));
    }

    #[test]
    fn test_cart_page_subtotal() {
        let template = CartItemsTemplate::new(&items());
        assert_eq!(template.subtotal, "$13.50");
        assert_eq!(template.item_count, 3);
        assert!(template.render().unwrap().contains("data-cart-item-id=\"2\""));
    }

    #[test]
    fn test_badge_hidden_at_zero() {
        let hidden = CartCountTemplate { count: 0 }.render().unwrap();
        assert!(hidden.contains("display: none"));

        let shown = CartCountTemplate { count: 3 }.render().unwrap();
        assert!(!shown.contains("display: none"));
        assert!(shown.contains(">3<"));
    }
}
