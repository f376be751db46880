//! Cart commands.

use bazaar_core::{CartItemId, ProductId};
use bazaar_storefront::Storefront;
use bazaar_storefront::models::CartMutation;
use bazaar_storefront::navigation::Page;

use super::{CliError, allowed, open, say};

fn report(result: &CartMutation, fallback: &str) -> Result<(), CliError> {
    say(result.message.as_deref().unwrap_or(fallback))
}

pub async fn list(shop: &Storefront) -> Result<(), CliError> {
    open(shop, Page::Cart).await?;

    let items = shop.cart().list_items().await;
    if items.is_empty() {
        return say("Your cart is empty");
    }
    for item in &items {
        let id = item
            .cart_item_id
            .map_or_else(|| "-".to_string(), |id| id.to_string());
        say(format_args!(
            "{id:>6}  {:<40} {:>3} x {:>10} = {:>10}",
            item.display_name(),
            item.quantity,
            item.price.display(),
            item.subtotal.display()
        ))?;
    }
    Ok(())
}

pub async fn count(shop: &Storefront) -> Result<(), CliError> {
    open(shop, Page::Index).await?;
    say(shop.cart().badge_count())
}

pub async fn add(shop: &Storefront, product_id: ProductId, quantity: u32) -> Result<(), CliError> {
    open(shop, Page::Products).await?;

    let result = allowed(shop.add_to_cart(product_id, quantity).await?)?;
    report(&result, "Product added to cart!")
}

pub async fn update(
    shop: &Storefront,
    cart_item_id: CartItemId,
    quantity: u32,
) -> Result<(), CliError> {
    open(shop, Page::Cart).await?;

    let result = allowed(shop.cart().update_item(cart_item_id, quantity).await?)?;
    report(&result, "Cart updated")
}

pub async fn remove(shop: &Storefront, cart_item_id: CartItemId) -> Result<(), CliError> {
    open(shop, Page::Cart).await?;

    let result = allowed(shop.cart().remove_item(cart_item_id).await?)?;
    report(&result, "Item removed")
}

pub async fn clear(shop: &Storefront) -> Result<(), CliError> {
    open(shop, Page::Cart).await?;

    let result = allowed(shop.cart().clear().await?)?;
    report(&result, "Cart cleared")
}
