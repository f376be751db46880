//! Payment gateway hand-off.

use askama::Template;

/// A hidden form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: String,
}

/// Self-submitting form that posts the gateway fields to the hosted
/// payment page.
#[derive(Template)]
#[template(path = "partials/payment_form.html")]
pub struct PaymentFormTemplate {
    pub action: String,
    pub method: &'static str,
    pub fields: Vec<FormField>,
}
