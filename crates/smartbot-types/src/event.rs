use serde::{Deserialize, Serialize};
use crate::session::Session;

/// Events emitted by the session manager.
/// The application shell subscribes to these to keep routing in sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A new session was persisted after login
    Established { session: Session },

    /// Profile fields were merged into the current session
    Updated { session: Session },

    /// The user logged out
    SignedOut,

    /// The backend rejected the credential (HTTP 401); the session is gone
    Invalidated { path: String },
}
