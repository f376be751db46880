//! Response classification.
//!
//! The backend is a servlet container: when something goes wrong deep
//! inside it, it may answer with its own HTML error page instead of JSON.
//! Those pages are recognised up front and never fed to the JSON parser.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::ApiError;

/// Message used when an HTML page arrives where JSON was expected.
pub const HTML_INSTEAD_OF_JSON: &str = "Server error: received HTML instead of JSON";

/// How many characters of an unparseable body are kept in the error.
const BODY_EXCERPT_CHARS: usize = 100;

/// Returns true if the body is an HTML document rather than JSON.
#[must_use]
pub fn looks_like_html(body: &str) -> bool {
    let trimmed = body.trim_start();
    let doctype = trimmed
        .get(..9)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("<!DOCTYPE"));

    doctype || body.contains("<html") || body.contains("Error Page")
}

/// First characters of a body, for error messages and logs.
#[must_use]
pub fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

/// Classify a raw response into a JSON document or a tagged error.
///
/// Order matters: HTML detection, then JSON parsing, then the status code
/// (so the body's `error` field can explain it), then an explicit
/// `{"success": false}`.
///
/// # Errors
///
/// See [`ApiError`] for the taxonomy.
pub fn classify(status: StatusCode, body: &str, fallback: &str) -> Result<Value, ApiError> {
    if looks_like_html(body) {
        return Err(ApiError::server(Some(status.as_u16()), HTML_INSTEAD_OF_JSON));
    }

    let value: Value = serde_json::from_str(body).map_err(|_| {
        ApiError::InvalidResponse(format!("Server returned invalid JSON: {}", excerpt(body)))
    })?;

    if !status.is_success() {
        let message = error_field(&value).unwrap_or_else(|| format!("HTTP {status}"));
        return Err(ApiError::server(Some(status.as_u16()), message));
    }

    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let message = error_field(&value).unwrap_or_else(|| fallback.to_string());
        return Err(ApiError::server(Some(status.as_u16()), message));
    }

    Ok(value)
}

/// Accept a classified document only when it says `"success": true`.
///
/// # Errors
///
/// Returns [`ApiError::Server`] with the `error` field, or `fallback`, when
/// `success` is missing, `false` or not a boolean.
pub fn require_success(
    status: StatusCode,
    value: Value,
    fallback: &str,
) -> Result<Value, ApiError> {
    if value.get("success").and_then(Value::as_bool) == Some(true) {
        return Ok(value);
    }
    let message = error_field(&value).unwrap_or_else(|| fallback.to_string());
    Err(ApiError::server(Some(status.as_u16()), message))
}

/// Decode a classified document into the expected shape.
///
/// # Errors
///
/// Returns [`ApiError::InvalidResponse`] when the document does not match.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

/// Classify a plain-text response (login, register, logout).
///
/// Success bodies are returned verbatim; failures carry the raw body as the
/// message, or `fallback` when the body is empty.
///
/// # Errors
///
/// Returns [`ApiError::Server`] for non-2xx statuses.
pub fn classify_text(status: StatusCode, body: String, fallback: &str) -> Result<String, ApiError> {
    if status.is_success() {
        return Ok(body);
    }

    let message = if body.trim().is_empty() {
        fallback.to_string()
    } else {
        body
    };
    Err(ApiError::server(Some(status.as_u16()), message))
}

fn error_field(value: &Value) -> Option<String> {
    value
        .get("error")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}
