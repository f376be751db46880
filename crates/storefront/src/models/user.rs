//! User identity held by the session.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use bazaar_core::{UserId, UserRole};

/// The logged-in user, as persisted under the `currentUser` storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "UserRecord")]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Name shown in the navigation menu.
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "loginTime")]
    pub login_time: Option<DateTime<Utc>>,
    pub role: UserRole,
}

impl User {
    /// User created locally when the backend only answers `Login successful`.
    ///
    /// The id is the login instant in epoch milliseconds and the display
    /// name is the username with its first character upper-cased.
    #[must_use]
    pub fn synthetic(username: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(now.timestamp_millis()),
            username: username.to_string(),
            display_name: capitalize(username),
            email: format!("{username}@example.com"),
            login_time: Some(now),
            role: UserRole::Customer,
        }
    }

    /// Label for the navigation menu.
    #[must_use]
    pub fn menu_label(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.username
        } else {
            &self.display_name
        }
    }
}

/// Wire shape accepted from storage and from the login endpoint.
///
/// Both `name` and `displayName` are understood; `name` wins when both
/// are present.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRecord {
    id: UserId,
    #[serde(default)]
    username: String,
    name: Option<String>,
    display_name: Option<String>,
    email: Option<String>,
    login_time: Option<DateTime<Utc>>,
    #[serde(default)]
    role: UserRole,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        let display_name = record
            .name
            .or(record.display_name)
            .unwrap_or_else(|| capitalize(&record.username));

        Self {
            id: record.id,
            username: record.username,
            display_name,
            email: record.email.unwrap_or_default(),
            login_time: record.login_time,
            role: record.role,
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Login form input.
#[derive(Debug)]
pub struct LoginCredentials {
    pub username: String,
    pub password: SecretString,
}

impl LoginCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Form body for `POST /login`. The password is exposed only here.
    pub(crate) fn form(&self) -> Vec<(&'static str, String)> {
        vec![
            ("username", self.username.clone()),
            ("password", self.password.expose_secret().to_string()),
        ]
    }
}

/// Registration form input.
#[derive(Debug)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
    pub full_name: String,
    pub phone: String,
    pub address: String,
}

impl RegistrationForm {
    /// Form body for `POST /register`.
    pub(crate) fn form(&self) -> Vec<(&'static str, String)> {
        vec![
            ("username", self.username.clone()),
            ("email", self.email.clone()),
            ("password", self.password.expose_secret().to_string()),
            (
                "confirmPassword",
                self.confirm_password.expose_secret().to_string(),
            ),
            ("fullName", self.full_name.clone()),
            ("phone", self.phone.clone()),
            ("address", self.address.clone()),
        ]
    }
}
