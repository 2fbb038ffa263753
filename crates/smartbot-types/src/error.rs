use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum SmartBotError {
    /// No response was received from the backend.
    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    /// The backend answered with a non-success status.
    #[error("HTTP {status} on {path}: {body}")]
    Http {
        status: u16,
        body: Value,
        path: String,
    },

    #[error("You must be logged in to perform this action")]
    Unauthenticated,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JS interop error: {0}")]
    JsInterop(String),

    #[error("{0}")]
    Other(String),
}

impl SmartBotError {
    /// HTTP status carried by the error, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            SmartBotError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(403)
    }

    /// Response body of an HTTP error, e.g. field-level validation messages.
    pub fn body(&self) -> Option<&Value> {
        match self {
            SmartBotError::Http { body, .. } => Some(body),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SmartBotError {
    fn from(e: serde_json::Error) -> Self {
        SmartBotError::Serialization(e.to_string())
    }
}
