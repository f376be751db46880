//! Integration tests for the Bazaar storefront client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bazaar-integration-tests
//! ```
//!
//! The tests drive a real [`Storefront`] against [`FakeBackend`], an axum
//! server on an ephemeral local port that answers with canned responses and
//! records every request it receives.
//!
//! # Test Categories
//!
//! - `session` - Login, logout, persistence and the route guard
//! - `cart` - Guarded mutations and the cart badge
//! - `catalog` - Listing, filtering and pagination
//! - `checkout` - Summary, validation and both payment methods

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use bazaar_storefront::models::LoginCredentials;
use bazaar_storefront::session::SessionStorage;
use bazaar_storefront::{ClientConfig, Storefront};

/// Application path the fake backend is mounted under.
pub const APP_PATH: &str = "/shop/";

/// A request received by the fake backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path relative to [`APP_PATH`], e.g. `cart` or `checkout/summary`.
    pub path: String,
    pub query: HashMap<String, String>,
    pub form: HashMap<String, String>,
}

impl RecordedRequest {
    /// The `action` parameter from the query or the form.
    #[must_use]
    pub fn action(&self) -> Option<&str> {
        self.form
            .get("action")
            .or_else(|| self.query.get("action"))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone)]
struct Reply {
    status: StatusCode,
    content_type: &'static str,
    body: String,
}

type RouteKey = (String, String, Option<String>);

/// Computes a JSON answer from the request, for routes whose reply depends
/// on earlier calls.
type Handler = Arc<dyn Fn(&RecordedRequest) -> Value + Send + Sync>;

#[derive(Default)]
struct BackendState {
    replies: HashMap<RouteKey, Reply>,
    handlers: HashMap<RouteKey, Handler>,
    requests: Vec<RecordedRequest>,
}

/// Scriptable stand-in for the shop backend.
pub struct FakeBackend {
    addr: SocketAddr,
    state: Arc<Mutex<BackendState>>,
    server: JoinHandle<()>,
}

impl FakeBackend {
    /// Start the backend on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(BackendState::default()));
        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|e| panic!("failed to bind fake backend: {e}"));
        let addr = listener
            .local_addr()
            .unwrap_or_else(|e| panic!("fake backend has no address: {e}"));
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Port the backend listens on.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Base URL a storefront should be configured with.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}{APP_PATH}", self.addr)
    }

    /// Storefront wired to this backend.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn storefront(&self, storage: impl SessionStorage + 'static) -> Storefront {
        let config = ClientConfig::with_base_url(&self.base_url())
            .unwrap_or_else(|e| panic!("invalid fake backend url: {e}"));
        Storefront::with_storage(config, storage)
            .unwrap_or_else(|e| panic!("failed to build storefront: {e}"))
    }

    /// Storefront with `username` already logged in.
    ///
    /// # Panics
    ///
    /// Panics if the login fails.
    pub async fn logged_in(&self, username: &str, storage: impl SessionStorage + 'static) -> Storefront {
        self.reply_text("POST", "login", 200, "Login successful");
        let shop = self.storefront(storage);
        shop.login(&LoginCredentials::new(username, "secret"))
            .await
            .unwrap_or_else(|e| panic!("login against fake backend failed: {e}"));
        shop
    }

    /// Answer `method path` with a JSON document.
    pub fn reply_json(&self, method: &str, path: &str, body: &Value) {
        self.insert(method, path, None, StatusCode::OK, "application/json", body.to_string());
    }

    /// Answer `method path` carrying `action=<action>` with a JSON document.
    pub fn reply_action(&self, method: &str, path: &str, action: &str, body: &Value) {
        self.insert(
            method,
            path,
            Some(action),
            StatusCode::OK,
            "application/json",
            body.to_string(),
        );
    }

    /// Answer `method path` carrying `action=<action>` by calling `handler`.
    ///
    /// Handlers take precedence over canned replies for the same route.
    pub fn reply_with<F>(&self, method: &str, path: &str, action: &str, handler: F)
    where
        F: Fn(&RecordedRequest) -> Value + Send + Sync + 'static,
    {
        lock(&self.state).handlers.insert(
            (method.to_string(), path.to_string(), Some(action.to_string())),
            Arc::new(handler),
        );
    }

    /// Answer `method path` with a raw body and status.
    pub fn reply_raw(&self, method: &str, path: &str, status: u16, content_type: &'static str, body: &str) {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.insert(method, path, None, status, content_type, body.to_string());
    }

    /// Answer `method path` with plain text.
    pub fn reply_text(&self, method: &str, path: &str, status: u16, body: &str) {
        self.reply_raw(method, path, status, "text/plain", body);
    }

    fn insert(
        &self,
        method: &str,
        path: &str,
        action: Option<&str>,
        status: StatusCode,
        content_type: &'static str,
        body: String,
    ) {
        lock(&self.state).replies.insert(
            (method.to_string(), path.to_string(), action.map(str::to_string)),
            Reply {
                status,
                content_type,
                body,
            },
        );
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state).requests.clone()
    }

    /// Requests received for one path.
    #[must_use]
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn lock(state: &Mutex<BackendState>) -> MutexGuard<'_, BackendState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn parse_pairs(raw: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(raw.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

async fn handle(
    State(state): State<Arc<Mutex<BackendState>>>,
    method: Method,
    uri: Uri,
    body: String,
) -> Response {
    let request = RecordedRequest {
        method: method.as_str().to_string(),
        path: uri
            .path()
            .strip_prefix(APP_PATH)
            .unwrap_or_else(|| uri.path())
            .to_string(),
        query: uri.query().map(parse_pairs).unwrap_or_default(),
        form: parse_pairs(&body),
    };

    let mut state = lock(&state);
    let with_action = (
        request.method.clone(),
        request.path.clone(),
        request.action().map(str::to_string),
    );
    let without_action = (request.method.clone(), request.path.clone(), None);
    let handler = state.handlers.get(&with_action).cloned();
    let reply = state
        .replies
        .get(&with_action)
        .or_else(|| state.replies.get(&without_action))
        .cloned();
    state.requests.push(request.clone());
    drop(state);

    if let Some(handler) = handler {
        return (
            StatusCode::OK,
            [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
            handler(&request).to_string(),
        )
            .into_response();
    }

    match reply {
        Some(reply) => (
            reply.status,
            [(header::CONTENT_TYPE, HeaderValue::from_static(reply.content_type))],
            reply.body,
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
            r#"{"success":false,"error":"Not found"}"#,
        )
            .into_response(),
    }
}
