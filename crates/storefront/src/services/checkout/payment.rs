//! What the host does once an order is placed.

use std::collections::BTreeMap;

use askama::Template;

use crate::navigation::Navigation;
use crate::views::{FormField, PaymentFormTemplate};

/// Hand-off to the payment gateway's hosted page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRedirect {
    /// Gateway page to submit to.
    pub url: String,
    /// HTTP method of the submission. Always `POST`.
    pub method: &'static str,
    /// Form fields, submitted verbatim.
    pub fields: BTreeMap<String, String>,
}

impl PaymentRedirect {
    /// Redirect posting `fields` to `url`.
    #[must_use]
    pub fn post(url: impl Into<String>, fields: BTreeMap<String, String>) -> Self {
        Self {
            url: url.into(),
            method: "POST",
            fields,
        }
    }

    /// Render as an auto-submitting hidden form.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render_form(&self) -> askama::Result<String> {
        PaymentFormTemplate {
            action: self.url.clone(),
            method: self.method,
            fields: self
                .fields
                .iter()
                .map(|(name, value)| FormField {
                    name: name.clone(),
                    value: value.clone(),
                })
                .collect(),
        }
        .render()
    }
}

/// Result of a successful payment step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// Submit a form to the gateway.
    Redirect(PaymentRedirect),
    /// Go to a page of the shop.
    Navigate(Navigation),
}
