//! Catalog browsing commands.

use bazaar_core::ProductId;
use bazaar_storefront::Storefront;
use bazaar_storefront::navigation::Page;
use bazaar_storefront::services::{ProductQuery, SortOrder};

use super::{CliError, open, say};

/// List one page of products matching the filters.
pub async fn products(
    shop: &Storefront,
    category: &str,
    search: String,
    sort: &str,
    page: usize,
) -> Result<(), CliError> {
    open(shop, Page::Products).await?;

    let query = ProductQuery {
        category: category.parse().map_err(CliError::InvalidArgument)?,
        search,
        sort: sort.parse::<SortOrder>().map_err(CliError::InvalidArgument)?,
    };

    let mut catalog = shop.catalog();
    let total = catalog.load_products(query).await?;
    if total == 0 {
        return say("No products found");
    }
    if !catalog.go_to_page(page) {
        return Err(CliError::InvalidArgument(format!(
            "page {page} is out of range (1-{})",
            catalog.page_count()
        )));
    }

    for product in catalog.visible_products() {
        let stock = match product.stock {
            Some(0) => "out of stock".to_string(),
            Some(units) => format!("{units} in stock"),
            None => String::new(),
        };
        say(format_args!(
            "{:>6}  {:<40} {:>10}  {}",
            product.id,
            product.name,
            product.price.display(),
            stock
        ))?;
    }
    say(format_args!(
        "Page {} of {} ({total} products)",
        catalog.page(),
        catalog.page_count()
    ))
}

/// Show a single product.
pub async fn product(shop: &Storefront, id: ProductId) -> Result<(), CliError> {
    open(shop, Page::ProductDetail).await?;

    let product = shop.catalog().load_product(id).await?;
    say(format_args!("{} (#{})", product.name, product.id))?;
    say(format_args!("Price: {}", product.price.display()))?;
    if let Some(stock) = product.stock {
        say(format_args!("Stock: {stock}"))?;
    }
    if let Some(category) = &product.category_name {
        say(format_args!("Category: {category}"))?;
    }
    if let Some(description) = &product.description {
        say(description)?;
    }
    Ok(())
}

/// List categories, including the catch-all entry.
pub async fn categories(shop: &Storefront) -> Result<(), CliError> {
    open(shop, Page::Products).await?;

    for option in shop.catalog().load_categories().await {
        say(format_args!("{:>6}  {}", option.filter, option.name))?;
    }
    Ok(())
}
