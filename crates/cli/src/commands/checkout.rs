//! Checkout commands.

use clap::Args;

use bazaar_core::PaymentMethod;
use bazaar_storefront::Storefront;
use bazaar_storefront::models::ShippingDetails;
use bazaar_storefront::navigation::Page;
use bazaar_storefront::services::PaymentOutcome;

use super::{CliError, open, say};

/// Shipping form fields.
#[derive(Debug, Args)]
pub struct ShippingArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    address: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    postal_code: String,
    #[arg(long, default_value = "Sri Lanka")]
    country: String,
}

impl From<ShippingArgs> for ShippingDetails {
    fn from(args: ShippingArgs) -> Self {
        Self {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            phone: args.phone,
            address: args.address,
            city: args.city,
            postal_code: args.postal_code,
            country: args.country,
        }
    }
}

pub async fn summary(shop: &Storefront) -> Result<(), CliError> {
    open(shop, Page::Checkout).await?;

    let mut checkout = shop.checkout();
    checkout.load_checkout_summary().await?;

    for item in checkout.items() {
        say(format_args!(
            "{:<40} {:>3} x {:>10}",
            item.display_name(),
            item.quantity,
            item.price.display()
        ))?;
    }
    let totals = checkout.totals();
    say(format_args!("Subtotal: {}", totals.subtotal.display()))?;
    say(format_args!("Shipping: {}", totals.shipping.display()))?;
    say(format_args!("Tax:      {}", totals.tax.display()))?;
    say(format_args!("Total:    {}", totals.total.display()))
}

pub async fn pay(
    shop: &Storefront,
    method: PaymentMethod,
    shipping: ShippingArgs,
) -> Result<(), CliError> {
    open(shop, Page::Checkout).await?;

    let mut checkout = shop.checkout();
    checkout.load_checkout_summary().await?;
    checkout.set_shipping(shipping.into());
    checkout.proceed_to_payment()?;
    checkout.select_payment_method(method);

    match checkout.process_payment().await? {
        PaymentOutcome::Redirect(redirect) => {
            say(format_args!("Continue payment at {}", redirect.url))?;
            say(redirect.render_form()?)
        }
        PaymentOutcome::Navigate(nav) => say(format_args!("Order placed (next: {nav})")),
    }
}
