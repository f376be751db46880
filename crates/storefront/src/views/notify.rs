//! Notification fragments.

use askama::Template;

/// Auto-dismissing toast.
#[derive(Template)]
#[template(path = "partials/toast.html")]
pub struct ToastTemplate {
    pub id: String,
    pub message: String,
    /// Bootstrap background colour (`success`, `danger`, ...).
    pub color: &'static str,
    pub icon: &'static str,
    pub delay_ms: u128,
}

/// Inline alert banner, used when toasts are unavailable.
#[derive(Template)]
#[template(path = "partials/banner.html")]
pub struct BannerTemplate {
    pub id: String,
    pub message: String,
    /// Bootstrap alert class (`alert-success`, ...).
    pub alert_class: &'static str,
    pub icon: &'static str,
    pub delay_ms: u128,
}
