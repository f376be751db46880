//! Session commands.

use std::io::BufRead;

use clap::Args;
use secrecy::SecretString;

use bazaar_storefront::Storefront;
use bazaar_storefront::models::{LoginCredentials, RegistrationForm};
use bazaar_storefront::navigation::Page;

use super::{CliError, open, say};

/// Fields of the registration form.
#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(short, long)]
    username: String,

    #[arg(short, long)]
    email: String,

    /// Full name
    #[arg(short = 'n', long)]
    full_name: String,

    #[arg(long, default_value = "")]
    phone: String,

    #[arg(long, default_value = "")]
    address: String,

    /// Password (read from stdin when omitted)
    #[arg(short, long)]
    password: Option<String>,
}

/// Read a password from the first line of stdin.
fn read_password(given: Option<String>) -> Result<String, CliError> {
    if let Some(password) = given {
        return Ok(password);
    }
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub async fn login(
    shop: &Storefront,
    username: String,
    password: Option<String>,
) -> Result<(), CliError> {
    open(shop, Page::Login).await?;

    let credentials = LoginCredentials::new(username, read_password(password)?);
    let user = shop.login(&credentials).await?;
    say(format_args!("Logged in as {}", user.menu_label()))?;
    say(format_args!("Cart: {} item(s)", shop.cart().badge_count()))
}

pub async fn register(shop: &Storefront, args: RegisterArgs) -> Result<(), CliError> {
    open(shop, Page::Register).await?;

    let password = read_password(args.password)?;
    let form = RegistrationForm {
        username: args.username,
        email: args.email,
        password: SecretString::from(password.clone()),
        confirm_password: SecretString::from(password),
        full_name: args.full_name,
        phone: args.phone,
        address: args.address,
    };
    let message = shop.session().register_user(&form).await?;
    say(message)
}

pub async fn logout(shop: &Storefront) -> Result<(), CliError> {
    open(shop, Page::Index).await?;

    let nav = shop.logout().await;
    say(format_args!("Logged out (next: {nav})"))
}

pub fn whoami(shop: &Storefront) -> Result<(), CliError> {
    match shop.session().load_from_storage() {
        Some(user) => say(format_args!(
            "{} <{}> ({})",
            user.menu_label(),
            user.email,
            user.role
        )),
        None => say("Not logged in"),
    }
}
