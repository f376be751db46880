//! Product grid, category sidebar and pagination.

use askama::Template;

use crate::models::{CategoryFilter, CategoryOption, Product};

/// Characters of a description shown on a product card.
const CARD_DESCRIPTION_CHARS: usize = 60;

/// Image shown for products without one.
pub const PRODUCT_PLACEHOLDER_IMAGE: &str =
    "https://images.unsplash.com/photo-1505740420928-5e560c06d30e?ixlib=rb-4.0.3&w=500";

/// Short description for a product card.
///
/// Takes the first 60 characters and always appends `...`; products
/// without a description get a fixed notice.
#[must_use]
pub fn card_description(description: Option<&str>) -> String {
    match description.filter(|d| !d.trim().is_empty()) {
        Some(text) => {
            let head: String = text.chars().take(CARD_DESCRIPTION_CHARS).collect();
            format!("{head}...")
        }
        None => "No description available".to_string(),
    }
}

/// A product card, formatted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCardView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub stock: Option<u32>,
    pub in_stock: bool,
    pub image_url: String,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: card_description(product.description.as_deref()),
            price: product.price.display(),
            stock: product.stock,
            in_stock: product.in_stock(),
            image_url: product
                .image_url
                .clone()
                .unwrap_or_else(|| PRODUCT_PLACEHOLDER_IMAGE.to_string()),
        }
    }
}

/// The visible page of the product grid.
#[derive(Template)]
#[template(path = "partials/product_grid.html")]
pub struct ProductGridTemplate {
    pub products: Vec<ProductCardView>,
}

impl ProductGridTemplate {
    #[must_use]
    pub fn new(products: &[Product]) -> Self {
        Self {
            products: products.iter().map(ProductCardView::from).collect(),
        }
    }
}

/// One sidebar entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryItemView {
    /// `all` or the category id.
    pub value: String,
    pub name: String,
    pub icon: &'static str,
    pub active: bool,
}

/// Category sidebar.
#[derive(Template)]
#[template(path = "partials/categories.html")]
pub struct CategoryListTemplate {
    pub categories: Vec<CategoryItemView>,
}

impl CategoryListTemplate {
    #[must_use]
    pub fn new(options: &[CategoryOption], selected: CategoryFilter) -> Self {
        let categories = options
            .iter()
            .map(|option| CategoryItemView {
                value: option.filter.to_string(),
                name: option.name.clone(),
                icon: match option.filter {
                    CategoryFilter::All => "fa-th-large",
                    CategoryFilter::Only(_) => "fa-mobile-alt",
                },
                active: option.filter == selected,
            })
            .collect();

        Self { categories }
    }
}

/// A numbered pagination link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLink {
    pub number: usize,
    pub active: bool,
}

/// Pagination controls, hidden when everything fits on one page.
#[derive(Template)]
#[template(path = "partials/pagination.html")]
pub struct PaginationTemplate {
    pub visible: bool,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous: usize,
    pub next: usize,
    pub pages: Vec<PageLink>,
}

impl PaginationTemplate {
    #[must_use]
    pub fn new(current: usize, page_count: usize) -> Self {
        Self {
            visible: page_count > 1,
            has_previous: current > 1,
            has_next: current < page_count,
            previous: current.saturating_sub(1),
            next: current + 1,
            pages: (1..=page_count)
                .map(|number| PageLink {
                    number,
                    active: number == current,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bazaar_core::CategoryId;
    use serde_json::json;

    #[test]
    fn test_card_description() {
        assert_eq!(card_description(None), "No description available");
        assert_eq!(card_description(Some("  ")), "No description available");
        assert_eq!(card_description(Some("Short")), "Short...");

        let long = "a".repeat(80);
        let shown = card_description(Some(&long));
        assert_eq!(shown.len(), 63);
        assert!(shown.ends_with("..."));
    }

    #[test]
    fn test_out_of_stock_card_disables_add_to_cart() {
        let product: Product =
            serde_json::from_value(json!({"id": 4, "name": "Case", "price": 9, "Quantity": 0}))
                .unwrap();
        let html = ProductGridTemplate::new(&[product]).render().unwrap();

        assert!(html.contains("Out of Stock"));
        assert!(html.contains(" disabled>"));
        assert!(html.contains(PRODUCT_PLACEHOLDER_IMAGE.split('?').next().unwrap()));
        assert!(html.contains("$9.00"));
    }

    #[test]
    fn test_unreported_stock_card_stays_buyable() {
        let product: Product =
            serde_json::from_value(json!({"id": 5, "name": "Tote", "price": 4})).unwrap();
        let html = ProductGridTemplate::new(&[product]).render().unwrap();

        assert!(!html.contains("Out of Stock"));
        assert!(!html.contains(" disabled>"));
        assert!(!html.contains("In stock:"));
    }

    #[test]
    fn test_empty_grid() {
        let html = ProductGridTemplate::new(&[]).render().unwrap();
        assert!(html.contains("No products found"));
    }

    #[test]
    fn test_category_list_marks_selection() {
        let options = vec![
            CategoryOption::all(),
            CategoryOption {
                filter: CategoryFilter::Only(CategoryId::new(2)),
                name: "Phones".into(),
            },
        ];
        let template =
            CategoryListTemplate::new(&options, CategoryFilter::Only(CategoryId::new(2)));
        assert!(!template.categories[0].active);
        assert!(template.categories[1].active);

        let html = template.render().unwrap();
        assert!(html.contains(r#"data-category="all""#));
        assert!(html.contains("All Categories"));
    }

    #[test]
    fn test_pagination_edges() {
        let first = PaginationTemplate::new(1, 3);
        assert!(first.visible);
        assert!(!first.has_previous);
        assert!(first.has_next);

        let last = PaginationTemplate::new(3, 3);
        assert!(last.has_previous);
        assert!(!last.has_next);

        let html = last.render().unwrap();
        assert_eq!(html.matches("disabled").count(), 1);
        assert_eq!(html.matches("page-item active").count(), 1);
    }

    #[test]
    fn test_pagination_hidden_for_single_page() {
        assert!(PaginationTemplate::new(1, 1).render().unwrap().trim().is_empty());
        assert!(PaginationTemplate::new(1, 0).render().unwrap().trim().is_empty());
    }
}
