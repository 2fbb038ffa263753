//! Application shell — boot gating and route protection.
//!
//! The shell decides once, synchronously, whether the client starts
//! authenticated, then keeps its view of the session in step with the
//! manager's events. Protected routes are re-checked against the manager on
//! every navigation, since the pipeline may end the session at any time.

use std::rc::Rc;
use smartbot_types::{event::SessionEvent, route::Route, session::Session};
use crate::manager::SessionManager;
use crate::ports::Navigator;

#[derive(Debug, Clone, PartialEq)]
pub enum ShellState {
    Loading,
    Unauthenticated,
    Authenticated(Session),
}

pub struct AppShell {
    session: Rc<SessionManager>,
    navigator: Rc<dyn Navigator>,
    state: ShellState,
    route: Route,
}

impl AppShell {
    pub fn new(session: Rc<SessionManager>, navigator: Rc<dyn Navigator>) -> Self {
        let route = navigator.current_route();
        Self {
            session,
            navigator,
            state: ShellState::Loading,
            route,
        }
    }

    /// One synchronous auth check; leaves the loading state for good.
    pub fn boot(&mut self) -> &ShellState {
        self.state = match self.session.validate_on_boot() {
            Some(session) => ShellState::Authenticated(session),
            None => ShellState::Unauthenticated,
        };
        let requested = self.route;
        self.route = self.guard(requested);
        if self.route != requested {
            self.navigator.redirect(self.route);
        }
        &self.state
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn is_loading(&self) -> bool {
        self.state == ShellState::Loading
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, ShellState::Authenticated(_))
    }

    pub fn user(&self) -> Option<&Session> {
        match &self.state {
            ShellState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    /// Move to `route`, or to the login page if it needs a session the
    /// manager no longer has. Returns where we ended up.
    pub fn navigate(&mut self, route: Route) -> Route {
        let target = self.guard(route);
        if target != route {
            self.navigator.redirect(target);
        }
        self.route = target;
        target
    }

    /// Ask the manager, not the cached state, whether a session exists.
    /// Without one the shell drops to unauthenticated and a protected
    /// current route is redirected to login.
    pub fn verify(&mut self) -> bool {
        if self.session.current().is_some() {
            return true;
        }
        self.state = ShellState::Unauthenticated;
        let route = self.route;
        if route.is_protected() {
            self.navigate(route);
        }
        false
    }

    /// Drain the manager's event bus and apply what happened.
    pub fn sync(&mut self) -> bool {
        let events = self.session.events().drain();
        let changed = !events.is_empty();
        self.process_events(events);
        changed
    }

    pub fn process_events(&mut self, events: Vec<SessionEvent>) {
        for event in events {
            match event {
                SessionEvent::Established { session } | SessionEvent::Updated { session } => {
                    self.state = ShellState::Authenticated(session);
                }
                SessionEvent::SignedOut => {
                    self.state = ShellState::Unauthenticated;
                    self.route = Route::Login;
                }
                SessionEvent::Invalidated { path } => {
                    log::warn!("Session invalidated by {}, redirecting to login", path);
                    self.state = ShellState::Unauthenticated;
                    self.route = Route::Login;
                    self.navigator.redirect(Route::Login);
                }
            }
        }
    }

    fn guard(&mut self, route: Route) -> Route {
        if !route.is_protected() {
            return route;
        }
        match self.session.current() {
            Some(_) => route,
            None => {
                self.state = ShellState::Unauthenticated;
                Route::Login
            }
        }
    }
}
