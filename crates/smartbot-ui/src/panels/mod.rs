pub mod auth;
pub mod dashboard;
pub mod messages;
pub mod nav;
pub mod profile;
pub mod resources;

use egui::RichText;
use crate::state::Feedback;
use crate::theme::*;

/// Inline success / error line under a form.
pub(crate) fn feedback_label(ui: &mut egui::Ui, feedback: Option<&Feedback>) {
    if let Some(fb) = feedback {
        let color = if fb.success { SUCCESS } else { ERROR };
        ui.label(RichText::new(&fb.message).color(color).small());
    }
}

/// Small grey caption above a field.
pub(crate) fn field_label(ui: &mut egui::Ui, text: &str) {
    ui.label(RichText::new(text).color(TEXT_SECONDARY).small());
}
