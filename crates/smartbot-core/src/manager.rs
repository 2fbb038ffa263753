//! Session manager — the single owner and writer of the session.
//!
//! Everyone else reads the session through [`SessionManager::current`].
//! Each session lifetime gets an epoch number; work that started under an
//! older epoch can neither write the session back nor invalidate it twice.

use std::cell::Cell;
use serde_json::{Map, Value};
use smartbot_types::{
    Result, SmartBotError,
    event::SessionEvent,
    session::Session,
};
use crate::event_bus::EventBus;
use crate::store::SessionStore;

pub struct SessionManager {
    store: SessionStore,
    epoch: Cell<u64>,
    events: EventBus<SessionEvent>,
}

impl SessionManager {
    pub fn new(store: SessionStore, events: EventBus<SessionEvent>) -> Self {
        Self {
            store,
            epoch: Cell::new(0),
            events,
        }
    }

    /// Current session, read through to storage. Never touches the network.
    pub fn current(&self) -> Option<Session> {
        self.store.read()
    }

    pub fn check_auth(&self) -> Option<Session> {
        self.current()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    pub fn token(&self) -> Option<String> {
        self.current().map(|s| s.token)
    }

    pub fn epoch(&self) -> u64 {
        self.epoch.get()
    }

    pub fn events(&self) -> &EventBus<SessionEvent> {
        &self.events
    }

    /// Boot-time check: an occupied but unreadable slot is wiped so the
    /// client starts cleanly unauthenticated.
    pub fn validate_on_boot(&self) -> Option<Session> {
        let session = self.current();
        if session.is_none() && self.store.is_occupied() {
            log::warn!("Discarding invalid session record at boot");
            self.store.clear();
            self.bump();
        }
        session
    }

    pub(crate) fn establish(&self, session: Session) -> Result<()> {
        self.store.write(&session)?;
        self.bump();
        log::info!(
            "Session established for {}",
            session.username.as_deref().unwrap_or("<unknown>")
        );
        self.events.emit(SessionEvent::Established { session });
        Ok(())
    }

    /// Overlay profile fields on the current session, provided it is still
    /// the one that was current at `epoch`.
    pub(crate) fn merge_profile(&self, epoch: u64, profile: &Map<String, Value>) -> Result<Session> {
        if epoch != self.epoch.get() {
            log::warn!("Session changed while the profile was loading, dropping stale profile");
            return Err(SmartBotError::Unauthenticated);
        }
        let current = self.current().ok_or(SmartBotError::Unauthenticated)?;
        let merged = current.merged_with(profile)?;
        self.store.write(&merged)?;
        self.events.emit(SessionEvent::Updated {
            session: merged.clone(),
        });
        Ok(merged)
    }

    /// Explicit sign-out. Always clears.
    pub(crate) fn clear(&self) {
        self.store.clear();
        self.bump();
        log::info!("Session cleared");
        self.events.emit(SessionEvent::SignedOut);
    }

    /// Drop the session after the backend rejected a credential issued at
    /// `epoch`. Returns false when that epoch was already invalidated.
    pub(crate) fn invalidate(&self, epoch: u64, path: &str) -> bool {
        if epoch != self.epoch.get() {
            log::debug!("401 on {} belongs to an ended session, ignoring", path);
            return false;
        }
        self.store.clear();
        self.bump();
        self.events.emit(SessionEvent::Invalidated {
            path: path.to_string(),
        });
        true
    }

    fn bump(&self) {
        self.epoch.set(self.epoch.get() + 1);
    }
}
