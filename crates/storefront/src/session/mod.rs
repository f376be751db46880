//! Client-side session: who is logged in and which page is open.
//!
//! The logged-in user is mirrored from the backend and persisted under the
//! [`CURRENT_USER_KEY`] storage key so it survives restarts. Watchers are
//! notified on every change through a `tokio::sync::watch` channel.

mod storage;

pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError};

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::api::{ApiClient, ApiError};
use crate::error::{Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::models::{LoginCredentials, RegistrationForm, User};
use crate::navigation::{Navigation, Page};

/// Storage key of the persisted user record.
pub const CURRENT_USER_KEY: &str = "currentUser";

/// Body the login endpoint sends instead of a user document.
const LOGIN_SUCCESS: &str = "Login successful";

/// Session state shared by every service.
///
/// Cheap to clone; all clones observe the same user and location.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    api: ApiClient,
    storage: Box<dyn SessionStorage>,
    user: watch::Sender<Option<User>>,
    location: watch::Sender<String>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .field("location", &self.location())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create an empty session. Call [`Self::load_from_storage`] to restore
    /// a previous login.
    pub fn new(api: ApiClient, storage: impl SessionStorage + 'static) -> Self {
        let (user, _) = watch::channel(None);
        let (location, _) = watch::channel(Page::Index.path().to_string());

        Self {
            inner: Arc::new(SessionInner {
                api,
                storage: Box::new(storage),
                user,
                location,
            }),
        }
    }

    /// Restore the user from storage.
    ///
    /// A missing record means nobody is logged in. An unreadable or
    /// malformed record is logged and treated the same way.
    pub fn load_from_storage(&self) -> Option<User> {
        let stored = match self.inner.storage.load(CURRENT_USER_KEY) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "Failed to read stored user");
                None
            }
        };

        let user = stored.and_then(|text| match serde_json::from_str::<User>(&text) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Ignoring malformed stored user");
                None
            }
        });

        self.inner.user.send_replace(user.clone());
        user
    }

    /// Persist `user` and make it the current user.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if the record cannot be written; the
    /// in-memory state is left unchanged in that case.
    pub fn save(&self, user: User) -> Result<()> {
        let text = serde_json::to_string(&user).map_err(StorageError::from)?;
        self.inner.storage.save(CURRENT_USER_KEY, &text)?;
        self.inner.user.send_replace(Some(user));
        Ok(())
    }

    /// Forget the current user.
    ///
    /// Returns a navigation to the login page when the open page requires
    /// a logged-in user.
    pub fn clear(&self) -> Option<Navigation> {
        if let Err(e) = self.inner.storage.remove(CURRENT_USER_KEY) {
            warn!(error = %e, "Failed to remove stored user");
        }
        self.inner.user.send_replace(None);

        self.current_page()
            .filter(|page| page.is_protected())
            .map(|_| Navigation::page(Page::Login))
    }

    /// Whether a user is logged in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.user.borrow().is_some()
    }

    /// The logged-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.inner.user.borrow().clone()
    }

    /// Watch login state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.inner.user.subscribe()
    }

    /// Record the page the host has open.
    pub fn set_location(&self, location: impl Into<String>) {
        self.inner.location.send_replace(location.into());
    }

    /// The page the host has open.
    #[must_use]
    pub fn location(&self) -> String {
        self.inner.location.borrow().clone()
    }

    /// The known page behind [`Self::location`].
    #[must_use]
    pub fn current_page(&self) -> Option<Page> {
        Page::from_location(&self.inner.location.borrow())
    }

    /// Route guard: anonymous visitors of protected pages are sent to the
    /// login page, which will bring them back afterwards.
    #[must_use]
    pub fn guard(&self) -> Option<Navigation> {
        let protected = self.current_page().is_some_and(Page::is_protected);
        (protected && !self.is_authenticated()).then(|| self.login_redirect())
    }

    /// Navigation to the login page that returns to the current location.
    #[must_use]
    pub fn login_redirect(&self) -> Navigation {
        Navigation::login_redirect(&self.location())
    }

    /// Navigation to the login page when nobody is logged in.
    #[must_use]
    pub fn login_required(&self) -> Option<Navigation> {
        (!self.is_authenticated()).then(|| self.login_redirect())
    }

    /// Log in with a username and password.
    ///
    /// # Errors
    ///
    /// Returns the server's message for rejected credentials,
    /// `InvalidResponse` for an unrecognised success body, or a storage
    /// error if the user cannot be persisted.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<User> {
        add_breadcrumb("auth", "Login attempt", None);

        let body = self
            .inner
            .api
            .post_form_text(
                "login",
                &credentials.form(),
                "Login failed. Check server connection.",
            )
            .await?;

        let user = if body == LOGIN_SUCCESS {
            User::synthetic(&credentials.username, Utc::now())
        } else {
            serde_json::from_str::<User>(&body)
                .map_err(|_| ApiError::InvalidResponse("Invalid login response".to_string()))?
        };

        self.save(user.clone())?;
        set_sentry_user(&user.id, &user.username);
        info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    /// Create an account. Resolves with the server's message.
    ///
    /// # Errors
    ///
    /// Returns the server's message when registration is rejected.
    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn register_user(&self, form: &RegistrationForm) -> Result<String> {
        let message = self
            .inner
            .api
            .post_form_text(
                "register",
                &form.form(),
                "Registration failed. Check server connection.",
            )
            .await?;

        info!("User registered");
        Ok(message)
    }

    /// End the session on the server (best effort) and locally.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Navigation {
        if let Err(e) = self
            .inner
            .api
            .post_form_text("logout", &[], "Logout failed")
            .await
        {
            warn!(error = %e, "Server logout failed, clearing local session anyway");
        }

        let _ = self.clear();
        clear_sentry_user();
        add_breadcrumb("auth", "Logged out", None);
        Navigation::page(Page::Index)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use url::Url;

    fn store() -> SessionStore {
        let api = ApiClient::new(&Url::parse("http://127.0.0.1:9/shop/").unwrap()).unwrap();
        SessionStore::new(api, MemoryStorage::new())
    }

    fn user() -> User {
        User::synthetic("alice", Utc::now())
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let storage = MemoryStorage::new();
        let api = ApiClient::new(&Url::parse("http://127.0.0.1:9/").unwrap()).unwrap();
        let session = SessionStore::new(api, storage);

        assert!(session.load_from_storage().is_none());
        session.save(user()).unwrap();
        assert!(session.is_authenticated());

        let restored = session.load_from_storage().unwrap();
        assert_eq!(restored.display_name, "Alice");
    }

    #[test]
    fn test_malformed_record_is_ignored() {
        let storage = MemoryStorage::new();
        storage.save(CURRENT_USER_KEY, "{not json").unwrap();
        let api = ApiClient::new(&Url::parse("http://127.0.0.1:9/").unwrap()).unwrap();
        let session = SessionStore::new(api, storage);

        assert!(session.load_from_storage().is_none());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_clear_on_protected_page_navigates_to_login() {
        let session = store();
        session.save(user()).unwrap();
        session.set_location("http://127.0.0.1:9/shop/cart.html");

        let nav = session.clear().unwrap();
        assert_eq!(nav.target, "login.html");
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_clear_on_public_page_stays() {
        let session = store();
        session.save(user()).unwrap();
        session.set_location("products.html");
        assert!(session.clear().is_none());
    }

    #[test]
    fn test_guard() {
        let session = store();
        session.set_location("http://127.0.0.1:9/shop/checkout.html");
        let nav = session.guard().unwrap();
        assert_eq!(
            nav.target,
            "login.html?redirect=http%3A%2F%2F127.0.0.1%3A9%2Fshop%2Fcheckout.html"
        );

        session.save(user()).unwrap();
        assert!(session.guard().is_none());

        session.set_location("index.html");
        let _ = session.clear();
        assert!(session.guard().is_none());
    }

    #[test]
    fn test_watchers_see_changes() {
        let session = store();
        let mut rx = session.subscribe();
        assert!(rx.borrow_and_update().is_none());

        session.save(user()).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_ref().unwrap().username, "alice");

        let _ = session.clear();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let session = store();
        let other = session.clone();
        session.save(user()).unwrap();
        assert!(other.is_authenticated());
        other.set_location("orders.html");
        assert_eq!(session.current_page(), Some(Page::Orders));
    }
}
