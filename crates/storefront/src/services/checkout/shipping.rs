//! Shipping form validation.

use bazaar_core::Email;

use crate::error::ValidationError;
use crate::models::ShippingDetails;

/// Message shown when the shipping form is incomplete or malformed.
pub const SHIPPING_REQUIRED: &str = "Please fill all required shipping information";

/// Fewest digits a phone number may have.
const MIN_PHONE_DIGITS: usize = 7;

/// Check every shipping field.
///
/// # Errors
///
/// Returns a [`ValidationError`] naming each offending field in form order.
pub fn validate(details: &ShippingDetails) -> Result<(), ValidationError> {
    let required = [
        ("firstName", &details.first_name),
        ("lastName", &details.last_name),
        ("email", &details.email),
        ("phone", &details.phone),
        ("address", &details.address),
        ("city", &details.city),
        ("postalCode", &details.postal_code),
        ("country", &details.country),
    ];

    let fields: Vec<&'static str> = required
        .into_iter()
        .filter(|(name, value)| match *name {
            "email" => Email::parse(value).is_err(),
            "phone" => !is_valid_phone(value),
            _ => value.trim().is_empty(),
        })
        .map(|(name, _)| name)
        .collect();

    if fields.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(SHIPPING_REQUIRED, fields))
    }
}

/// Digits, spaces, `+`, `-` and parentheses, with enough digits to dial.
fn is_valid_phone(phone: &str) -> bool {
    let phone = phone.trim();
    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'));
    let digits = phone.chars().filter(char::is_ascii_digit).count();

    allowed && digits >= MIN_PHONE_DIGITS
}

#[cfg(test)]
pub(crate) fn sample() -> ShippingDetails {
    ShippingDetails {
        first_name: "Nimal".into(),
        last_name: "Perera".into(),
        email: "nimal@example.lk".into(),
        phone: "+94 (77) 123-4567".into(),
        address: "12 Galle Road".into(),
        city: "Colombo".into(),
        postal_code: "00300".into(),
        country: "Sri Lanka".into(),
    }
}
