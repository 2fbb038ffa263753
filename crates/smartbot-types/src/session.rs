use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Result, SmartBotError};

/// The client-held proof of authentication.
///
/// Holds the opaque bearer token plus whatever user fields the backend sent
/// at login, overlaid with profile fields after each profile fetch. Fields
/// the client does not know about are kept in `extra` and written back
/// verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_joined: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            id: None,
            user_id: None,
            username: None,
            email: None,
            first_name: None,
            last_name: None,
            date_joined: None,
            last_login: None,
            extra: Map::new(),
        }
    }

    /// Build a session from a raw login response.
    /// Returns `None` when the body carries no usable token.
    pub fn from_login_response(body: &Value) -> Option<Self> {
        serde_json::from_value::<Session>(body.clone())
            .ok()
            .filter(Session::is_valid)
    }

    /// A session without a token proves nothing.
    pub fn is_valid(&self) -> bool {
        !self.token.trim().is_empty()
    }

    /// Backend user id; login answers with `user_id`, the profile with `id`.
    pub fn account_id(&self) -> Option<i64> {
        self.id.or(self.user_id)
    }

    pub fn display_name(&self) -> String {
        let full = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        );
        let full = full.trim();
        if !full.is_empty() {
            full.to_string()
        } else {
            self.username.clone().unwrap_or_default()
        }
    }

    /// Overlay profile fields onto this session, field by field.
    /// The token is never taken from the profile payload.
    pub fn merged_with(&self, profile: &Map<String, Value>) -> Result<Session> {
        let mut record = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => return Err(SmartBotError::Serialization("session is not an object".into())),
        };
        for (key, value) in profile {
            if key == "token" {
                continue;
            }
            record.insert(key.clone(), value.clone());
        }
        Ok(serde_json::from_value(Value::Object(record))?)
    }

    /// `date_joined` formatted for display, falling back to the raw value.
    pub fn date_joined_display(&self) -> Option<String> {
        self.date_joined.as_deref().map(format_timestamp)
    }

    pub fn last_login_display(&self) -> Option<String> {
        self.last_login.as_deref().map(format_timestamp)
    }
}

fn format_timestamp(raw: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Profile fields the backend must return; missing ones are only warned about.
pub const REQUIRED_PROFILE_FIELDS: &[&str] = &["username", "email", "first_name", "last_name"];

/// Credentials posted to `accounts/login/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Fields posted to `accounts/register/`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl RegisterRequest {
    /// Wire body, with the confirmation field the backend insists on.
    pub fn to_body(&self) -> Value {
        serde_json::json!({
            "username": self.username,
            "email": self.email,
            "password": self.password,
            "password2": self.password,
            "first_name": self.first_name,
            "last_name": self.last_name,
        })
    }
}

/// Partial profile update sent to `PUT accounts/profile/`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

/// Body posted to `accounts/change-password/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
    pub new_password2: String,
}

impl PasswordChange {
    pub fn new(old_password: &str, new_password: &str) -> Self {
        Self {
            old_password: old_password.to_string(),
            new_password: new_password.to_string(),
            new_password2: new_password.to_string(),
        }
    }
}

/// Result of a login call.
///
/// A response without a token is not an error: the raw body is handed back
/// and nothing is persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    Authenticated(Session),
    Tokenless(Value),
}

impl LoginOutcome {
    pub fn session(&self) -> Option<&Session> {
        match self {
            LoginOutcome::Authenticated(s) => Some(s),
            LoginOutcome::Tokenless(_) => None,
        }
    }
}

/// Logout always succeeds client-side; this records what the server said.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutOutcome {
    pub success: bool,
    pub server_acknowledged: bool,
}

/// Result of registering and then logging in with the same credentials.
#[derive(Debug, Clone)]
pub enum RegistrationOutcome {
    LoggedIn(Session),
    /// Account created but the follow-up login did not yield a session.
    LoginFailed { account: Value, reason: String },
}
