//! Port traits — the hexagonal architecture boundary.
//!
//! These traits are defined here in `smartbot-core` (pure Rust).
//! Implementations live in `smartbot-platform` (browser adapters).
//! The core never imports platform code; it only depends on these traits.

use std::fmt;
use async_trait::async_trait;
use serde_json::Value;
use smartbot_types::{Result, route::Route};

// ─── HTTP Port ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully resolved outgoing request
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Header lookup; names compare case-insensitively, values do not.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Whatever the backend answered, success or not
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    /// Decoded JSON body; `Value::Null` when empty, a string when not JSON
    pub body: Value,
}

impl HttpResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait(?Send)]
pub trait HttpPort {
    /// Dispatch a request.
    ///
    /// Only transport failures (no response at all, timeout) are errors;
    /// every HTTP status comes back as an `HttpResponse`.
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse>;
}

// ─── Key-Value Port ──────────────────────────────────────────

/// Synchronous durable string slots (browser localStorage).
pub trait KeyValuePort {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;

    /// Name of this backend (for logging/debug)
    fn backend_name(&self) -> &str;
}

// ─── Navigation Port ─────────────────────────────────────────

pub trait Navigator {
    /// Full navigation to an entry point, e.g. back to the login page.
    fn redirect(&self, route: Route);

    /// Route the client was opened on.
    fn current_route(&self) -> Route;
}
