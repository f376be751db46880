//! `ApiClient` implementation.

use std::sync::Arc;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::ApiError;
use super::response::{classify, classify_text, decode, excerpt, require_success};

/// Fallback used when a GET answers `{"success": false}` without a message.
const REQUEST_FAILED: &str = "Request failed";

/// Client for the shop backend.
///
/// Cheap to clone; all clones share one connection pool and cookie jar.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new client rooted at `base_url`.
    ///
    /// A trailing `/` is added to the base path if missing, so relative
    /// endpoint paths resolve underneath it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] if the HTTP client cannot be built.
    pub fn new(base_url: &Url) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().cookie_store(true).build()?;

        let mut base_url = base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            inner: Arc::new(ApiClientInner { client, base_url }),
        })
    }

    /// The normalized base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Resolve an endpoint path, with an optional percent-encoded query.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Url`] if the path cannot be joined.
    pub fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.join(path.trim_start_matches('/'))?;
        if !query.is_empty() {
            url.set_query(Some(&encode_query(query)));
        }
        Ok(url)
    }

    /// GET a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] for transport failures and for any response
    /// the classifier rejects.
    #[instrument(skip(self, query))]
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path, query)?;
        let response = self.inner.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, body = %excerpt(&body), "GET response");

        decode(classify(status, &body, REQUEST_FAILED)?)
    }

    /// POST a form and decode the JSON answer.
    ///
    /// `fallback` is the message used when the backend reports
    /// `{"success": false}` without an `error` field.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] for transport failures and for any response
    /// the classifier rejects.
    #[instrument(skip(self, form))]
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, String)],
        fallback: &str,
    ) -> Result<T, ApiError> {
        let (status, body) = self.post(path, form).await?;
        decode(classify(status, &body, fallback)?)
    }

    /// POST a form to an endpoint whose answer only counts as done when it
    /// carries `"success": true`.
    ///
    /// # Errors
    ///
    /// As [`Self::post_form`], plus [`ApiError::Server`] with the body's
    /// `error` field (or `fallback`) when `success` is missing or not `true`.
    #[instrument(skip(self, form))]
    pub async fn post_form_confirmed<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, String)],
        fallback: &str,
    ) -> Result<T, ApiError> {
        let (status, body) = self.post(path, form).await?;
        let value = classify(status, &body, fallback)?;
        decode(require_success(status, value, fallback)?)
    }

    async fn post(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> Result<(StatusCode, String), ApiError> {
        let url = self.endpoint(path, &[])?;
        let response = self.inner.client.post(url).form(form).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, body = %excerpt(&body), "POST response");
        Ok((status, body))
    }

    /// POST a form to an endpoint that answers with plain text.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Server`] carrying the raw body for non-2xx
    /// statuses, or [`ApiError::Network`] for transport failures.
    #[instrument(skip(self, form))]
    pub async fn post_form_text(
        &self,
        path: &str,
        form: &[(&str, String)],
        fallback: &str,
    ) -> Result<String, ApiError> {
        let url = self.endpoint(path, &[])?;
        let response = self.inner.client.post(url).form(form).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, body = %excerpt(&body), "POST text response");

        classify_text(status, body, fallback)
    }
}

/// Build a query string the way the storefront pages did: every key and
/// value percent-encoded (spaces become `%20`, not `+`).
fn encode_query(query: &[(&str, &str)]) -> String {
    query
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&Url::parse(base).unwrap()).unwrap()
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let api = client("http://localhost:8080/Web_Project_1");
        assert_eq!(api.base_url().as_str(), "http://localhost:8080/Web_Project_1/");
    }

    #[test]
    fn test_endpoint_joins_under_base_path() {
        let api = client("http://localhost:8080/shop/");
        let url = api.endpoint("/checkout/summary", &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/shop/checkout/summary");
    }

    #[test]
    fn test_endpoint_percent_encodes_query() {
        let api = client("http://localhost:8080/");
        let url = api
            .endpoint("products", &[("format", "json"), ("search", "usb c & hub")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/products?format=json&search=usb%20c%20%26%20hub"
        );
    }
}
