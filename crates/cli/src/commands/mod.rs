//! Subcommand implementations.
//!
//! Each command opens the page the browser would be on, runs the matching
//! storefront operation and writes the outcome to stdout. Diagnostics go
//! through `tracing` on stderr.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod session;

use std::io::Write;

use thiserror::Error;
use tokio::sync::broadcast::{self, error::TryRecvError};

use bazaar_storefront::navigation::{Guarded, Navigation, Page};
use bazaar_storefront::services::Notification;
use bazaar_storefront::{ClientError, Storefront};

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// A storefront operation failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A fragment failed to render.
    #[error("Render error: {0}")]
    Render(#[from] askama::Error),

    /// Writing to the terminal failed.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),

    /// The command needs a logged-in user.
    #[error("Login required (next: {0})")]
    LoginRequired(Navigation),

    /// An argument could not be used.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Open a page and fail when the route guard redirects to login.
pub(crate) async fn open(shop: &Storefront, page: Page) -> Result<(), CliError> {
    match shop.open_page(page.path()).await {
        Some(nav) => Err(CliError::LoginRequired(nav)),
        None => Ok(()),
    }
}

/// Unwrap a guarded outcome.
pub(crate) fn allowed<T>(outcome: Guarded<T>) -> Result<T, CliError> {
    match outcome {
        Guarded::Allowed(value) => Ok(value),
        Guarded::LoginRequired(nav) => Err(CliError::LoginRequired(nav)),
    }
}

/// Print the notifications a command raised, as `[severity] message`.
pub(crate) fn print_notifications(
    feed: &mut broadcast::Receiver<Notification>,
) -> Result<(), CliError> {
    loop {
        match feed.try_recv() {
            Ok(n) => say(notification_line(&n))?,
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Notifications dropped");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => return Ok(()),
        }
    }
}

fn notification_line(n: &Notification) -> String {
    format!("[{}] {}", n.severity, n.message)
}

/// Write a line to stdout.
pub(crate) fn say(line: impl std::fmt::Display) -> Result<(), CliError> {
    let mut out = std::io::stdout().lock();
    writeln!(out, "{line}")?;
    Ok(())
}
