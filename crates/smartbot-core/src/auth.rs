//! Account operations: login, logout, registration, profile, password.
//!
//! All calls go through [`ApiClient`]; the resulting session changes are
//! written through [`SessionManager`], never straight to storage.

use std::rc::Rc;
use serde_json::{json, Value};
use smartbot_types::{
    Result, SmartBotError,
    session::{
        LoginOutcome, LoginRequest, LogoutOutcome, PasswordChange, ProfileUpdate,
        RegisterRequest, RegistrationOutcome, Session, REQUIRED_PROFILE_FIELDS,
    },
};
use crate::client::ApiClient;
use crate::manager::SessionManager;
use crate::ports::HttpMethod;

pub const LOGIN_PATH: &str = "accounts/login/";
pub const LOGOUT_PATH: &str = "accounts/logout/";
pub const REGISTER_PATH: &str = "accounts/register/";
pub const PROFILE_PATH: &str = "accounts/profile/";
pub const CHANGE_PASSWORD_PATH: &str = "accounts/change-password/";

#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
    session: Rc<SessionManager>,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        let session = client.session().clone();
        Self { client, session }
    }

    pub fn session(&self) -> &Rc<SessionManager> {
        &self.session
    }

    pub fn current_user(&self) -> Option<Session> {
        self.session.current()
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
        log::info!("Logging in as {}", username);
        let credentials = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let body = self
            .client
            .post(LOGIN_PATH, serde_json::to_value(&credentials)?)
            .await?;

        match Session::from_login_response(&body) {
            Some(session) => {
                self.session.establish(session.clone())?;
                Ok(LoginOutcome::Authenticated(session))
            }
            None => {
                log::warn!("Login response carried no token; nothing persisted");
                Ok(LoginOutcome::Tokenless(body))
            }
        }
    }

    /// Log out on the server when possible, then always locally.
    ///
    /// A 401 from the server has already ended the session through the
    /// pipeline; the local clear is then skipped so the session ends once.
    pub async fn logout(&self) -> LogoutOutcome {
        let epoch = self.session.epoch();
        let server_acknowledged = match self.session.current() {
            Some(session) => match self
                .client
                .request_with_token(HttpMethod::Post, LOGOUT_PATH, Some(json!({})), &session.token)
                .await
            {
                Ok(_) => {
                    log::info!("Server-side logout succeeded");
                    true
                }
                Err(e) => {
                    log::warn!("Server-side logout failed ({}), logging out locally", e);
                    false
                }
            },
            None => {
                log::warn!("No token found, logging out client-side only");
                false
            }
        };

        if self.session.epoch() != epoch && self.session.current().is_none() {
            log::info!("Session already ended by the server, nothing left to clear");
        } else {
            self.session.clear();
        }
        LogoutOutcome {
            success: true,
            server_acknowledged,
        }
    }

    /// Create an account. Does not sign in.
    pub async fn register(&self, req: &RegisterRequest) -> Result<Value> {
        log::info!("Registering account {}", req.username);
        self.client.post(REGISTER_PATH, req.to_body()).await
    }

    /// Create an account, then sign in with the same credentials.
    pub async fn register_and_login(&self, req: &RegisterRequest) -> Result<RegistrationOutcome> {
        let account = self.register(req).await?;
        let outcome = match self.login(&req.username, &req.password).await {
            Ok(LoginOutcome::Authenticated(session)) => RegistrationOutcome::LoggedIn(session),
            Ok(LoginOutcome::Tokenless(_)) => RegistrationOutcome::LoginFailed {
                account,
                reason: "login response carried no token".to_string(),
            },
            Err(e) => {
                log::error!("Automatic login after registration failed: {}", e);
                RegistrationOutcome::LoginFailed {
                    account,
                    reason: e.to_string(),
                }
            }
        };
        Ok(outcome)
    }

    /// Fetch the profile and merge it into the session.
    pub async fn fetch_user_profile(&self) -> Result<Session> {
        if !self.session.is_authenticated() {
            log::error!("No authentication token available for profile fetch");
            return Err(SmartBotError::Unauthenticated);
        }
        let epoch = self.session.epoch();

        let profile = match self.client.get(PROFILE_PATH).await? {
            Value::Object(map) => map,
            other => {
                return Err(SmartBotError::Serialization(format!(
                    "profile payload is not an object: {}",
                    other
                )))
            }
        };

        let missing: Vec<&str> = REQUIRED_PROFILE_FIELDS
            .iter()
            .copied()
            .filter(|f| profile.get(*f).map_or(true, is_blank))
            .collect();
        if !missing.is_empty() {
            log::warn!("Profile is missing fields: {:?}", missing);
        }
        for field in ["date_joined", "last_login"] {
            if profile.get(field).map_or(true, is_blank) {
                log::warn!("Profile has no {}", field);
            }
        }

        self.session.merge_profile(epoch, &profile)
    }

    /// Submit profile changes, then re-read the canonical profile.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Session> {
        self.client
            .put(PROFILE_PATH, serde_json::to_value(update)?)
            .await?;
        self.fetch_user_profile().await
    }

    /// The token stays valid after a password change.
    pub async fn change_password(&self, old_password: &str, new_password: &str) -> Result<Value> {
        let change = PasswordChange::new(old_password, new_password);
        self.client
            .post(CHANGE_PASSWORD_PATH, serde_json::to_value(&change)?)
            .await
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
