//! Authenticated request pipeline.
//!
//! Every backend call goes through [`ApiClient`]: the current token is
//! attached on the way out, and a 401 on the way back ends the session
//! before the error reaches the caller.

use std::rc::Rc;
use serde::de::DeserializeOwned;
use serde_json::Value;
use smartbot_types::{Result, SmartBotError, config::ApiConfig};
use crate::manager::SessionManager;
use crate::ports::{HttpMethod, HttpPort, HttpRequest, HttpResponse};

const TOKEN_PREVIEW_CHARS: usize = 10;

#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    http: Rc<dyn HttpPort>,
    session: Rc<SessionManager>,
}

impl ApiClient {
    pub fn new(config: ApiConfig, http: Rc<dyn HttpPort>, session: Rc<SessionManager>) -> Self {
        Self {
            config,
            http,
            session,
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn session(&self) -> &Rc<SessionManager> {
        &self.session
    }

    /// Send a request authenticated with the current session, if any.
    pub async fn request(&self, method: HttpMethod, path: &str, body: Option<Value>) -> Result<Value> {
        let epoch = self.session.epoch();
        let token = self.session.token();
        self.dispatch(method, path, body, token.as_deref(), epoch).await
    }

    /// Send a request with an explicit credential instead of the stored one.
    pub async fn request_with_token(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
        token: &str,
    ) -> Result<Value> {
        let epoch = self.session.epoch();
        self.dispatch(method, path, body, Some(token), epoch).await
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        self.request(HttpMethod::Get, path, None).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self.get(path).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Value> {
        self.request(HttpMethod::Post, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<Value> {
        self.request(HttpMethod::Put, path, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: Value) -> Result<Value> {
        self.request(HttpMethod::Patch, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.request(HttpMethod::Delete, path, None).await
    }

    async fn dispatch(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
        epoch: u64,
    ) -> Result<Value> {
        let mut req = HttpRequest::new(method, self.config.url(path))
            .with_header("Content-Type", "application/json");

        match token {
            Some(token) => {
                log::debug!("Attaching token {}...", token_preview(token));
                req = req.with_header("Authorization", &self.config.authorization(token));
            }
            None => log::debug!("No token available, {} {} goes out unauthenticated", method, path),
        }
        if let Some(body) = body {
            req = req.with_body(body);
        }

        log::debug!("Request: {} {}", method, req.url);
        let response = self.http.send(req).await.map_err(|e| {
            log::error!("No response for {} {}: {}", method, path, e);
            e
        })?;
        self.intercept(response, path, epoch)
    }

    fn intercept(&self, response: HttpResponse, path: &str, epoch: u64) -> Result<Value> {
        if response.is_success() {
            log::debug!("Response {} from {}", response.status, path);
            return Ok(response.body);
        }

        match response.status {
            401 => {
                log::error!("Authentication failed (401) on {}: session expired or token invalid", path);
                self.session.invalidate(epoch, path);
            }
            403 => log::warn!("Access forbidden (403) on {}", path),
            status => log::error!("HTTP {} on {}: {}", status, path, response.body),
        }

        Err(SmartBotError::Http {
            status: response.status,
            body: response.body,
            path: path.to_string(),
        })
    }
}

fn token_preview(token: &str) -> String {
    token.chars().take(TOKEN_PREVIEW_CHARS).collect()
}
