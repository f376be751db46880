//! Catalog records from `GET /products` and `GET /categories`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use bazaar_core::{CategoryId, Price, ProductId};

use super::{lenient_i64, lenient_string, lenient_u32};

/// Reserved filter value that matches every category.
pub const ALL_CATEGORIES: &str = "all";

/// Label of the synthetic catch-all category.
pub const ALL_CATEGORIES_LABEL: &str = "All Categories";

/// A product as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    /// Units in stock (`Quantity` on the wire); `None` when not reported.
    pub stock: Option<u32>,
    pub image_url: Option<String>,
    pub category_id: Option<CategoryId>,
    pub category_name: Option<String>,
}

impl Product {
    /// Whether the product can be added to the cart.
    ///
    /// Only a reported stock of zero counts as sold out.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        !matches!(self.stock, Some(0))
    }
}

impl From<Map<String, Value>> for Product {
    fn from(raw: Map<String, Value>) -> Self {
        let field = |keys: &[&str]| keys.iter().find_map(|key| raw.get(*key));

        Self {
            id: ProductId::new(field(&["id"]).and_then(lenient_i64).unwrap_or_default()),
            name: field(&["name"]).and_then(lenient_string).unwrap_or_default(),
            description: field(&["description"]).and_then(lenient_string),
            price: field(&["price"])
                .and_then(Price::from_json)
                .unwrap_or(Price::ZERO),
            stock: field(&["Quantity", "quantity"]).and_then(lenient_u32),
            image_url: field(&["imageUrl"]).and_then(lenient_string),
            category_id: field(&["categoryId"])
                .and_then(lenient_i64)
                .map(CategoryId::new),
            category_name: field(&["categoryName"]).and_then(lenient_string),
        }
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Category restriction applied to a product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    /// Every category (the reserved `all` value).
    #[default]
    All,
    /// A single category.
    Only(CategoryId),
}

impl CategoryFilter {
    /// Value carried in the `category` query parameter, if any.
    #[must_use]
    pub fn query_value(&self) -> Option<String> {
        match self {
            Self::All => None,
            Self::Only(id) => Some(id.to_string()),
        }
    }
}

impl std::fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str(ALL_CATEGORIES),
            Self::Only(id) => write!(f, "{id}"),
        }
    }
}

impl std::str::FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_CATEGORIES) {
            return Ok(Self::All);
        }
        trimmed
            .parse::<CategoryId>()
            .map(Self::Only)
            .map_err(|_| format!("invalid category: {s}"))
    }
}

/// One entry of the category sidebar, including the synthetic catch-all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOption {
    pub filter: CategoryFilter,
    pub name: String,
}

impl CategoryOption {
    /// The `All Categories` entry.
    #[must_use]
    pub fn all() -> Self {
        Self {
            filter: CategoryFilter::All,
            name: ALL_CATEGORIES_LABEL.to_string(),
        }
    }
}

impl From<Category> for CategoryOption {
    fn from(category: Category) -> Self {
        Self {
            filter: CategoryFilter::Only(category.id),
            name: category.name,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_from_listing() {
        let product: Product = serde_json::from_value(json!({
            "id": 3,
            "name": "Phone Case",
            "description": "Shock-absorbing case",
            "price": 12.5,
            "Quantity": 0,
            "imageUrl": "https://img.example/case.png",
            "categoryId": 2,
            "categoryName": "Accessories",
            "createdAt": "Jan 5, 2024, 10:00:00 AM"
        }))
        .unwrap();

        assert_eq!(product.id, ProductId::new(3));
        assert_eq!(product.price.display(), "$12.50");
        assert!(!product.in_stock());
        assert_eq!(product.category_id, Some(CategoryId::new(2)));
    }

    #[test]
    fn test_unreported_stock_is_available() {
        let product: Product =
            serde_json::from_value(json!({"id": 8, "name": "Tote", "price": 4})).unwrap();
        assert_eq!(product.stock, None);
        assert!(product.in_stock());

        let unreadable: Product =
            serde_json::from_value(json!({"id": 8, "Quantity": "lots"})).unwrap();
        assert!(unreadable.in_stock());
    }

    #[test]
    fn test_product_price_shapes() {
        let nested: Product =
            serde_json::from_value(json!({"id": 1, "price": {"amount": "7.1"}, "quantity": 4}))
                .unwrap();
        assert_eq!(nested.price.display(), "$7.10");
        assert_eq!(nested.stock, Some(4));

        let text: Product = serde_json::from_value(json!({"id": 1, "price": "19.999"})).unwrap();
        assert_eq!(text.price.display(), "$20.00");

        let garbage: Product = serde_json::from_value(json!({"id": 1, "price": "n/a"})).unwrap();
        assert_eq!(garbage.price, Price::ZERO);
    }

    #[test]
    fn test_category_filter_parsing() {
        assert_eq!("all".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!("".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(
            "4".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Only(CategoryId::new(4))
        );
        assert!("phones".parse::<CategoryFilter>().is_err());
    }

    #[test]
    fn test_category_filter_query_value() {
        assert_eq!(CategoryFilter::All.query_value(), None);
        assert_eq!(
            CategoryFilter::Only(CategoryId::new(9)).query_value(),
            Some("9".to_string())
        );
        assert_eq!(CategoryFilter::All.to_string(), "all");
    }
}
