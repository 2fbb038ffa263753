//! Fetch-based HTTP transport.
//!
//! Uses browser `fetch()` via gloo-net for WASM compatibility. Requests
//! that outlive the configured timeout are aborted through an
//! `AbortController` and reported as `SmartBotError::Timeout`.

use async_trait::async_trait;
use futures::future::{self, Either};
use gloo_net::http::{Request, RequestBuilder};
use gloo_timers::future::TimeoutFuture;
use serde_json::Value;
use web_sys::AbortController;

use smartbot_core::ports::{HttpMethod, HttpPort, HttpRequest, HttpResponse};
use smartbot_types::{Result, SmartBotError};

pub struct GlooHttpClient {
    timeout_ms: u64,
}

impl GlooHttpClient {
    pub fn new(timeout_ms: u64) -> Self {
        Self { timeout_ms }
    }

    fn builder(req: &HttpRequest) -> RequestBuilder {
        match req.method {
            HttpMethod::Get => Request::get(&req.url),
            HttpMethod::Post => Request::post(&req.url),
            HttpMethod::Put => Request::put(&req.url),
            HttpMethod::Patch => Request::patch(&req.url),
            HttpMethod::Delete => Request::delete(&req.url),
        }
    }
}

#[async_trait(?Send)]
impl HttpPort for GlooHttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse> {
        let controller = AbortController::new()
            .map_err(|e| SmartBotError::JsInterop(format!("{:?}", e)))?;
        let signal = controller.signal();

        let mut builder = Self::builder(&req).abort_signal(Some(&signal));
        for (name, value) in &req.headers {
            builder = builder.header(name, value);
        }
        let request = match &req.body {
            Some(body) => builder.json(body),
            None => builder.build(),
        }
        .map_err(|e| SmartBotError::Network(e.to_string()))?;

        let timeout = TimeoutFuture::new(self.timeout_ms.min(u32::MAX as u64) as u32);
        let response = match future::select(Box::pin(request.send()), Box::pin(timeout)).await {
            Either::Left((result, _)) => result.map_err(|e| SmartBotError::Network(e.to_string()))?,
            Either::Right(((), _)) => {
                controller.abort();
                return Err(SmartBotError::Timeout(self.timeout_ms));
            }
        };

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SmartBotError::Network(e.to_string()))?;

        Ok(HttpResponse::new(status, decode_body(&text)))
    }
}

/// Empty bodies become `Null`; non-JSON bodies are kept as a string.
pub fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
