//! Product listing page: categories, filtering, sorting and pagination.
//!
//! Filtering and sorting happen on the server; pagination is client-side
//! over the last loaded listing.

use std::sync::Arc;
use std::time::Duration;

use askama::Template;
use moka::future::Cache;
use tracing::{debug, info, instrument, warn};

use bazaar_core::ProductId;

use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{Category, CategoryFilter, CategoryOption, Product};
use crate::navigation::{Navigation, Page};
use crate::services::notify::{Notification, Notifier};
use crate::views::{CategoryListTemplate, PaginationTemplate, ProductGridTemplate};

/// Products shown per page.
pub const PAGE_SIZE: usize = 8;

/// How long the category list is reused before being fetched again.
const CATEGORY_TTL: Duration = Duration::from_secs(300);

const CATEGORY_CACHE_KEY: &str = "categories";

/// Server-side sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    #[default]
    Newest,
    PriceLow,
    PriceHigh,
    Name,
}

impl SortOrder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceLow => "price_low",
            Self::PriceHigh => "price_high",
            Self::Name => "name",
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "newest" | "" => Ok(Self::Newest),
            "price_low" => Ok(Self::PriceLow),
            "price_high" => Ok(Self::PriceHigh),
            "name" => Ok(Self::Name),
            other => Err(format!("invalid sort order: {other}")),
        }
    }
}

/// Filters for a product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub category: CategoryFilter,
    pub search: String,
    pub sort: SortOrder,
}

impl ProductQuery {
    /// Query parameters for `GET /products`.
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("format", "json".to_string()),
            ("sort", self.sort.as_str().to_string()),
        ];
        if let Some(category) = self.category.query_value() {
            params.push(("category", category));
        }
        // Sent exactly as typed; only an empty box is omitted.
        if !self.search.is_empty() {
            params.push(("search", self.search.clone()));
        }
        params
    }
}

/// Number of pages needed for `total` products.
#[must_use]
pub const fn page_count(total: usize) -> usize {
    total.div_ceil(PAGE_SIZE)
}

/// Products on `page` (1-based). Out-of-range pages are empty.
#[must_use]
pub fn page_slice(products: &[Product], page: usize) -> &[Product] {
    let start = page.saturating_sub(1).saturating_mul(PAGE_SIZE);
    let end = start.saturating_add(PAGE_SIZE).min(products.len());
    products.get(start..end).unwrap_or_default()
}

/// State of the product listing page.
pub struct ProductCatalog {
    api: ApiClient,
    notifier: Notifier,
    categories: Cache<&'static str, Arc<Vec<Category>>>,
    query: ProductQuery,
    products: Vec<Product>,
    page: usize,
}

impl std::fmt::Debug for ProductCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductCatalog")
            .field("query", &self.query)
            .field("products", &self.products.len())
            .field("page", &self.page)
            .finish_non_exhaustive()
    }
}

impl ProductCatalog {
    #[must_use]
    pub fn new(api: ApiClient, notifier: Notifier) -> Self {
        let categories = Cache::builder()
            .max_capacity(1)
            .time_to_live(CATEGORY_TTL)
            .build();

        Self {
            api,
            notifier,
            categories,
            query: ProductQuery::default(),
            products: Vec::new(),
            page: 1,
        }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Category sidebar entries, `All Categories` first.
    ///
    /// Served from cache for five minutes. A failed fetch yields only the
    /// `All Categories` entry and is not cached.
    #[instrument(skip(self))]
    pub async fn load_categories(&self) -> Vec<CategoryOption> {
        let categories = if let Some(cached) = self.categories.get(CATEGORY_CACHE_KEY).await {
            debug!("Category cache hit");
            cached
        } else {
            match self
                .api
                .get_json::<Vec<Category>>("categories", &[("format", "json")])
                .await
            {
                Ok(fetched) => {
                    let fetched = Arc::new(fetched);
                    self.categories
                        .insert(CATEGORY_CACHE_KEY, Arc::clone(&fetched))
                        .await;
                    fetched
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load categories");
                    Arc::new(Vec::new())
                }
            }
        };

        std::iter::once(CategoryOption::all())
            .chain(categories.iter().cloned().map(CategoryOption::from))
            .collect()
    }

    /// Drop the cached categories and fetch them again.
    pub async fn refresh_categories(&self) -> Vec<CategoryOption> {
        self.categories.invalidate(CATEGORY_CACHE_KEY).await;
        self.load_categories().await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Fetch products matching `query` and show the first page.
    ///
    /// On failure the previous listing and filters are kept.
    ///
    /// # Errors
    ///
    /// Returns the API error so the host can notify the user.
    #[instrument(skip(self))]
    pub async fn load_products(&mut self, query: ProductQuery) -> Result<usize> {
        let params = query.params();
        let params: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();

        let products = self
            .api
            .get_json::<Vec<Product>>("products", &params)
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to load products"))?;

        info!(count = products.len(), "Products loaded");
        self.products = products;
        self.query = query;
        self.page = 1;
        Ok(self.products.len())
    }

    /// Fetch again with the current filters.
    ///
    /// # Errors
    ///
    /// Returns the API error so the host can notify the user.
    pub async fn reload(&mut self) -> Result<usize> {
        self.load_products(self.query.clone()).await
    }

    /// Reset search, sort and category, then reload.
    ///
    /// # Errors
    ///
    /// Returns the API error so the host can notify the user.
    pub async fn clear_filters(&mut self) -> Result<usize> {
        self.load_products(ProductQuery::default()).await
    }

    /// Fetch a single product for its detail page.
    ///
    /// # Errors
    ///
    /// Returns the API error when the product cannot be loaded.
    #[instrument(skip(self))]
    pub async fn load_product(&self, id: ProductId) -> Result<Product> {
        let id = id.to_string();
        let product = self
            .api
            .get_json::<Product>("product-details", &[("id", id.as_str()), ("format", "json")])
            .await?;
        Ok(product)
    }

    /// Filters of the current listing.
    #[must_use]
    pub const fn query(&self) -> &ProductQuery {
        &self.query
    }

    /// Every product of the current listing.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    /// Current page (1-based).
    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        page_count(self.products.len())
    }

    /// Products on the current page.
    #[must_use]
    pub fn visible_products(&self) -> &[Product] {
        page_slice(&self.products, self.page)
    }

    /// Switch page. Returns false and stays put for page 0 or pages past
    /// the end.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page == 0 || page > self.page_count() {
            return false;
        }
        self.page = page;
        true
    }

    // =========================================================================
    // Card actions
    // =========================================================================

    /// Acknowledge a wishlist click.
    pub fn add_to_wishlist(&self, id: ProductId) -> Notification {
        debug!(product_id = %id, "Wishlist click");
        self.notifier.info("Added to wishlist!")
    }

    /// Open the product's detail page.
    #[must_use]
    pub fn quick_view(id: ProductId) -> Navigation {
        Navigation::to(format!("{}?id={id}", Page::ProductDetail.path()))
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Render the visible page of the product grid.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render_products(&self) -> askama::Result<String> {
        ProductGridTemplate::new(self.visible_products()).render()
    }

    /// Render the pagination controls.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render_pagination(&self) -> askama::Result<String> {
        PaginationTemplate::new(self.page, self.page_count()).render()
    }

    /// Render the category sidebar with the current filter highlighted.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render_categories(&self, options: &[CategoryOption]) -> askama::Result<String> {
        CategoryListTemplate::new(options, self.query.category).render()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bazaar_core::CategoryId;
    use serde_json::json;

    fn products(n: usize) -> Vec<Product> {
        (0..n)
            .map(|i| {
                serde_json::from_value(json!({"id": i, "name": format!("P{i}"), "price": 1}))
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0), 0);
        assert_eq!(page_count(1), 1);
        assert_eq!(page_count(8), 1);
        assert_eq!(page_count(9), 2);
        assert_eq!(page_count(17), 3);
    }

    #[test]
    fn test_page_slice_covers_every_product_once() {
        let all = products(17);
        let mut seen = Vec::new();
        for page in 1..=page_count(all.len()) {
            let slice = page_slice(&all, page);
            assert!(slice.len() <= PAGE_SIZE);
            seen.extend(slice.iter().map(|p| p.id));
        }
        assert_eq!(seen, all.iter().map(|p| p.id).collect::<Vec<_>>());
        assert_eq!(page_slice(&all, 3).len(), 1);
        assert!(page_slice(&all, 4).is_empty());
        assert!(page_slice(&all, 0).len() <= PAGE_SIZE);
    }

    #[test]
    fn test_query_params() {
        let query = ProductQuery {
            category: CategoryFilter::Only(CategoryId::new(3)),
            search: "  usb hub ".into(),
            sort: SortOrder::PriceHigh,
        };
        assert_eq!(
            query.params(),
            vec![
                ("format", "json".to_string()),
                ("sort", "price_high".to_string()),
                ("category", "3".to_string()),
                ("search", "  usb hub ".to_string()),
            ]
        );

        let blank = ProductQuery {
            search: " ".into(),
            ..ProductQuery::default()
        };
        assert_eq!(blank.params().last(), Some(&("search", " ".to_string())));

        let defaults = ProductQuery::default().params();
        assert_eq!(
            defaults,
            vec![("format", "json".to_string()), ("sort", "newest".to_string())]
        );
    }

    #[test]
    fn test_sort_order_parsing() {
        assert_eq!("price_low".parse::<SortOrder>().unwrap(), SortOrder::PriceLow);
        assert_eq!("".parse::<SortOrder>().unwrap(), SortOrder::Newest);
        assert!("cheapest".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_quick_view() {
        assert_eq!(
            ProductCatalog::quick_view(ProductId::new(12)).target,
            "product-detail.html?id=12"
        );
    }
}
