//! Bazaar CLI - Drive the storefront client from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! bazaar products --category 3 --search "usb hub" --sort price_low --page 2
//! bazaar categories
//!
//! # Log in (password read from stdin when not given)
//! bazaar login -u nimal
//!
//! # Work with the cart
//! bazaar cart add 12 --quantity 2
//! bazaar cart list
//!
//! # Check out
//! bazaar checkout summary
//! bazaar checkout pay --method cod --first-name Nimal ...
//! ```
//!
//! # Commands
//!
//! - `products`, `product`, `categories` - Catalog browsing
//! - `login`, `register`, `logout`, `whoami` - Session management
//! - `cart` - Cart mutations and listing
//! - `checkout` - Order summary and payment

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bazaar_core::{CartItemId, PaymentMethod, ProductId};
use bazaar_storefront::{ClientConfig, Storefront};

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "bazaar")]
#[command(author, version, about = "Bazaar storefront client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products, one page at a time
    Products {
        /// Category id, or `all`
        #[arg(short, long, default_value = "all")]
        category: String,

        /// Free-text search
        #[arg(short, long, default_value = "")]
        search: String,

        /// Sort order (`newest`, `price_low`, `price_high`, `name`)
        #[arg(long, default_value = "newest")]
        sort: String,

        /// Page to show, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Show one product
    Product {
        /// Product id
        id: ProductId,
    },
    /// List product categories
    Categories,
    /// Log in
    Login {
        /// Username
        #[arg(short, long)]
        username: String,

        /// Password (read from stdin when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Create an account
    Register(commands::session::RegisterArgs),
    /// Log out
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Check out the cart
    Checkout {
        #[command(subcommand)]
        action: CheckoutAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// List cart items
    List,
    /// Show the number of items in the cart
    Count,
    /// Add a product
    Add {
        /// Product id
        product_id: ProductId,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Change the quantity of a cart line
    Update {
        /// Cart item id
        cart_item_id: CartItemId,

        /// New quantity
        quantity: u32,
    },
    /// Remove a cart line
    Remove {
        /// Cart item id
        cart_item_id: CartItemId,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum CheckoutAction {
    /// Show the order summary
    Summary,
    /// Place the order and start payment
    Pay {
        /// Payment method (`cod` or `payhere`)
        #[arg(short, long)]
        method: PaymentMethod,

        #[command(flatten)]
        shipping: commands::checkout::ShippingArgs,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bazaar_storefront=info,bazaar_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: ClientConfig) -> Result<(), CliError> {
    let shop = Storefront::new(config)?;
    let mut feed = shop.notifier().subscribe();

    let outcome = dispatch(&shop, cli.command).await;
    commands::print_notifications(&mut feed)?;
    outcome
}

async fn dispatch(shop: &Storefront, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Products {
            category,
            search,
            sort,
            page,
        } => commands::catalog::products(shop, &category, search, &sort, page).await?,
        Commands::Product { id } => commands::catalog::product(shop, id).await?,
        Commands::Categories => commands::catalog::categories(shop).await?,
        Commands::Login { username, password } => {
            commands::session::login(shop, username, password).await?;
        }
        Commands::Register(args) => commands::session::register(shop, args).await?,
        Commands::Logout => commands::session::logout(shop).await?,
        Commands::Whoami => commands::session::whoami(shop)?,
        Commands::Cart { action } => match action {
            CartAction::List => commands::cart::list(shop).await?,
            CartAction::Count => commands::cart::count(shop).await?,
            CartAction::Add {
                product_id,
                quantity,
            } => commands::cart::add(shop, product_id, quantity).await?,
            CartAction::Update {
                cart_item_id,
                quantity,
            } => commands::cart::update(shop, cart_item_id, quantity).await?,
            CartAction::Remove { cart_item_id } => {
                commands::cart::remove(shop, cart_item_id).await?;
            }
            CartAction::Clear => commands::cart::clear(shop).await?,
        },
        Commands::Checkout { action } => match action {
            CheckoutAction::Summary => commands::checkout::summary(shop).await?,
            CheckoutAction::Pay { method, shipping } => {
                commands::checkout::pay(shop, method, shipping).await?;
            }
        },
    }
    Ok(())
}
