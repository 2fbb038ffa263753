//! Simple event bus for decoupled communication between producers (the
//! session manager, spawned backend calls) and the frame loop.
//!
//! The bus is single-threaded (WASM constraint) and uses interior mutability
//! via RefCell. Events are buffered and drained once per frame.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use smartbot_types::event::SessionEvent;

/// Shared event bus — clone-cheap via Rc.
pub struct EventBus<E = SessionEvent> {
    inner: Rc<RefCell<VecDeque<E>>>,
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(VecDeque::new())),
        }
    }

    /// Publish an event.
    pub fn emit(&self, event: E) {
        self.inner.borrow_mut().push_back(event);
    }

    /// Drain all pending events. Called by the consumer each frame.
    pub fn drain(&self) -> Vec<E> {
        self.inner.borrow_mut().drain(..).collect()
    }

    /// Check if there are pending events (useful for egui repaint triggers).
    pub fn has_pending(&self) -> bool {
        !self.inner.borrow().is_empty()
    }
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}
