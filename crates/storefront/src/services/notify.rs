//! User notifications.
//!
//! Every notification is rendered once, when shown, and stays active for
//! [`DISMISS_AFTER`]. Toasts are preferred; the inline banner is used when
//! toasts are disabled or the toast fragment cannot be rendered.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use askama::Template;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use crate::views::{BannerTemplate, ToastTemplate};

/// How long a notification stays visible.
pub const DISMISS_AFTER: Duration = Duration::from_secs(3);

/// Notifications buffered per subscriber before the oldest are dropped.
const FEED_CAPACITY: usize = 64;

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }

    /// Toast background colour.
    #[must_use]
    pub const fn toast_color(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "danger",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }

    /// Banner alert class.
    #[must_use]
    pub const fn alert_class(self) -> &'static str {
        match self {
            Self::Success => "alert-success",
            Self::Error => "alert-danger",
            Self::Warning => "alert-warning",
            Self::Info => "alert-info",
        }
    }

    /// Font Awesome icon class.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Success => "fa-check-circle",
            Self::Error => "fa-exclamation-circle",
            Self::Warning => "fa-exclamation-triangle",
            Self::Info => "fa-info-circle",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a notification is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    Toast,
    Banner,
    /// Neither fragment rendered; `html` holds the bare message.
    Text,
}

/// A shown notification.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub severity: Severity,
    pub presentation: Presentation,
    /// Rendered fragment.
    pub html: String,
    shown_at: Instant,
}

impl Notification {
    /// Whether the notification has been dismissed by its timer.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.shown_at.elapsed() >= DISMISS_AFTER
    }
}

/// Shows notifications and tracks which are still visible.
///
/// Cheap to clone; clones share the active list.
#[derive(Debug, Clone)]
pub struct Notifier {
    inner: Arc<NotifierInner>,
}

#[derive(Debug)]
struct NotifierInner {
    toasts_enabled: bool,
    active: Mutex<Vec<Notification>>,
    feed: broadcast::Sender<Notification>,
}

impl Notifier {
    /// Create a notifier. With `toasts_enabled` false every notification
    /// is shown as an inline banner.
    #[must_use]
    pub fn new(toasts_enabled: bool) -> Self {
        Self {
            inner: Arc::new(NotifierInner {
                toasts_enabled,
                active: Mutex::new(Vec::new()),
                feed: broadcast::channel(FEED_CAPACITY).0,
            }),
        }
    }

    /// Show a notification.
    pub fn show(&self, message: impl Into<String>, severity: Severity) -> Notification {
        let message = message.into();
        match severity {
            Severity::Success | Severity::Info => info!(%severity, "{message}"),
            Severity::Warning | Severity::Error => warn!(%severity, "{message}"),
        }

        let id = Uuid::new_v4();
        let (presentation, html) = self.render(id, &message, severity);
        let notification = Notification {
            id,
            message,
            severity,
            presentation,
            html,
            shown_at: Instant::now(),
        };

        {
            let mut active = self.lock();
            active.retain(|n| !n.is_expired());
            active.push(notification.clone());
        }
        // No subscribers is the normal case.
        let _ = self.inner.feed.send(notification.clone());
        notification
    }

    pub fn success(&self, message: impl Into<String>) -> Notification {
        self.show(message, Severity::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> Notification {
        self.show(message, Severity::Error)
    }

    pub fn warning(&self, message: impl Into<String>) -> Notification {
        self.show(message, Severity::Warning)
    }

    pub fn info(&self, message: impl Into<String>) -> Notification {
        self.show(message, Severity::Info)
    }

    /// Notifications that are still visible, oldest first.
    #[must_use]
    pub fn active(&self) -> Vec<Notification> {
        let mut active = self.lock();
        active.retain(|n| !n.is_expired());
        active.clone()
    }

    /// Receive every notification shown from now on, expired or not.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.inner.feed.subscribe()
    }

    /// Close a notification before its timer runs out.
    pub fn dismiss(&self, id: Uuid) {
        self.lock().retain(|n| n.id != id);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notification>> {
        self.inner
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn render(&self, id: Uuid, message: &str, severity: Severity) -> (Presentation, String) {
        let delay_ms = DISMISS_AFTER.as_millis();

        if self.inner.toasts_enabled {
            let toast = ToastTemplate {
                id: format!("toast-{}", id.simple()),
                message: message.to_string(),
                color: severity.toast_color(),
                icon: severity.icon(),
                delay_ms,
            };
            match toast.render() {
                Ok(html) => return (Presentation::Toast, html),
                Err(e) => warn!(error = %e, "Toast render failed, falling back to banner"),
            }
        }

        let banner = BannerTemplate {
            id: format!("alert-{}", id.simple()),
            message: message.to_string(),
            alert_class: severity.alert_class(),
            icon: severity.icon(),
            delay_ms,
        };
        match banner.render() {
            Ok(html) => (Presentation::Banner, html),
            Err(e) => {
                warn!(error = %e, "Banner render failed");
                (Presentation::Text, message.to_string())
            }
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_mappings() {
        assert_eq!(Severity::Error.toast_color(), "danger");
        assert_eq!(Severity::Error.alert_class(), "alert-danger");
        assert_eq!(Severity::Warning.icon(), "fa-exclamation-triangle");
        assert_eq!(Severity::Success.icon(), "fa-check-circle");
        assert_eq!(Severity::Info.toast_color(), "info");
    }

    #[tokio::test]
    async fn test_toast_rendering() {
        let notifier = Notifier::new(true);
        let n = notifier.success("Product added to cart!");
        assert_eq!(n.presentation, Presentation::Toast);
        assert!(n.html.contains("bg-success"));
        assert!(n.html.contains("fa-check-circle"));
        assert!(n.html.contains("Product added to cart!"));
    }

    #[tokio::test]
    async fn test_banner_when_toasts_disabled() {
        let notifier = Notifier::new(false);
        let n = notifier.error("Payment failed: card declined");
        assert_eq!(n.presentation, Presentation::Banner);
        assert!(n.html.contains("alert-danger"));
    }

    #[tokio::test]
    async fn test_message_is_escaped() {
        let notifier = Notifier::default();
        let n = notifier.info("<script>alert(1)</script>");
        assert!(!n.html.contains("<script>"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_notifications_expire_after_three_seconds() {
        let notifier = Notifier::default();
        notifier.info("first");
        tokio::time::advance(Duration::from_secs(2)).await;
        notifier.warning("second");
        assert_eq!(notifier.active().len(), 2);

        tokio::time::advance(Duration::from_millis(1500)).await;
        let active = notifier.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].message, "second");

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(notifier.active().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_expired_notifications() {
        let notifier = Notifier::default();
        let mut feed = notifier.subscribe();
        notifier.error("Login failed");
        tokio::time::advance(Duration::from_secs(10)).await;
        notifier.success("Order placed");

        assert_eq!(notifier.active().len(), 1);
        assert_eq!(feed.try_recv().unwrap().message, "Login failed");
        assert_eq!(feed.try_recv().unwrap().severity, Severity::Success);
        assert!(feed.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_dismiss() {
        let notifier = Notifier::default();
        let n = notifier.info("bye");
        notifier.dismiss(n.id);
        assert!(notifier.active().is_empty());
    }
}
