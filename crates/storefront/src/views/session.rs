//! Navigation user menu.

use askama::Template;

use crate::models::User;

/// User menu: account links when logged in, login and register otherwise.
#[derive(Template)]
#[template(path = "partials/user_menu.html")]
pub struct UserMenuTemplate {
    pub authenticated: bool,
    pub label: String,
}

impl UserMenuTemplate {
    #[must_use]
    pub fn new(user: Option<&User>) -> Self {
        Self {
            authenticated: user.is_some(),
            label: user.map(|u| u.menu_label().to_string()).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_menu_for_user() {
        let user = User::synthetic("alice", Utc::now());
        let html = UserMenuTemplate::new(Some(&user)).render().unwrap();
        assert!(html.contains("Alice"));
        assert!(html.contains("orders.html"));
        assert!(html.contains("logoutBtn"));
        assert!(!html.contains("register.html"));
    }

    #[test]
    fn test_menu_for_visitor() {
        let html = UserMenuTemplate::new(None).render().unwrap();
        assert!(html.contains("login.html"));
        assert!(html.contains("register.html"));
        assert!(!html.contains("logoutBtn"));
    }
}
