//! Persisted session store.
//!
//! A passive durable mirror of the session: one JSON record in one
//! key-value slot. Anything unreadable in that slot counts as "no session".

use std::rc::Rc;
use smartbot_types::{Result, session::Session};
use crate::ports::KeyValuePort;

pub struct SessionStore {
    slot: Rc<dyn KeyValuePort>,
    key: String,
}

impl SessionStore {
    pub fn new(slot: Rc<dyn KeyValuePort>, key: impl Into<String>) -> Self {
        Self {
            slot,
            key: key.into(),
        }
    }

    /// Read the persisted session; missing, malformed, or tokenless
    /// records all read as `None`.
    pub fn read(&self) -> Option<Session> {
        let raw = match self.slot.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Session slot '{}' unreadable: {}", self.key, e);
                return None;
            }
        };

        match serde_json::from_str::<Session>(&raw) {
            Ok(session) if session.is_valid() => Some(session),
            Ok(_) => {
                log::warn!("Stored session has an empty token, ignoring it");
                None
            }
            Err(e) => {
                log::warn!("Stored session is not a valid record ({}), ignoring it", e);
                None
            }
        }
    }

    /// Whether the slot holds anything at all, valid or not.
    pub fn is_occupied(&self) -> bool {
        matches!(self.slot.get(&self.key), Ok(Some(_)))
    }

    /// Replace the whole record.
    pub fn write(&self, session: &Session) -> Result<()> {
        let json = serde_json::to_string(session)?;
        self.slot.set(&self.key, &json)
    }

    pub fn clear(&self) {
        if let Err(e) = self.slot.remove(&self.key) {
            log::error!("Failed to clear session slot '{}': {}", self.key, e);
        }
    }
}
