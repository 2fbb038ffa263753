//! egui views for the SmartBot dashboard.
//!
//! Panels render from [`state::UiState`] and hand back [`state::UiCommand`]s;
//! they never perform I/O themselves.

pub mod panels;
pub mod state;
pub mod theme;
