//! Dashboard overview: stats, account summary, recent messages, activity.

use egui::{self, RichText, ScrollArea};
use serde_json::Value;
use smartbot_types::session::Session;
use crate::state::{record_title, DashboardData, UiCommand};
use crate::theme::*;

pub fn dashboard_page(ui: &mut egui::Ui, data: &DashboardData, user: Option<&Session>) -> Option<UiCommand> {
    let mut command = None;

    ui.horizontal(|ui| {
        let greeting = match user {
            Some(session) => format!("Bonjour, {}", session.display_name()),
            None => "Tableau de bord".to_string(),
        };
        ui.heading(RichText::new(greeting).color(TEXT_PRIMARY).strong());
        if data.loading {
            ui.spinner();
        } else if ui.small_button("Actualiser").clicked() {
            command = Some(UiCommand::LoadDashboard);
        }
    });
    ui.separator();

    ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
        section(ui, "Statistiques", |ui| stat_grid(ui, "stats_grid", &data.stats));
        section(ui, "Comptes", |ui| stat_grid(ui, "summary_grid", &data.summary));

        section(ui, "Messages récents", |ui| {
            if data.recent_messages.is_empty() {
                empty(ui, "Aucun message");
            }
            for message in data.recent_messages.iter().take(5) {
                ui.horizontal(|ui| {
                    let status = message.get("status").and_then(Value::as_str).unwrap_or("");
                    ui.label(RichText::new(status).color(status_color(status)).small());
                    ui.label(RichText::new(record_title(message)).color(TEXT_PRIMARY));
                });
            }
        });

        section(ui, "Activité récente", |ui| {
            if data.activities.is_empty() {
                empty(ui, "Aucune activité");
            }
            for activity in data.activities.iter().take(10) {
                let text = activity
                    .get("description")
                    .or_else(|| activity.get("activity_type"))
                    .and_then(Value::as_str)
                    .unwrap_or("-");
                let when = activity.get("timestamp").and_then(Value::as_str).unwrap_or("");
                ui.horizontal(|ui| {
                    ui.label(RichText::new(when).color(TEXT_SECONDARY).small());
                    ui.label(RichText::new(text).color(TEXT_PRIMARY));
                });
            }
        });
    });

    command
}

fn section(ui: &mut egui::Ui, title: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
    egui::Frame::default()
        .fill(BG_SECONDARY)
        .inner_margin(PANEL_PADDING)
        .corner_radius(PANEL_ROUNDING)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new(title).color(ACCENT).strong());
            ui.add_space(2.0);
            add_contents(ui);
        });
    ui.add_space(8.0);
}

fn empty(ui: &mut egui::Ui, text: &str) {
    ui.label(RichText::new(text).color(TEXT_SECONDARY).italics());
}

/// Scalar entries of a stats object as a two-column grid.
fn stat_grid(ui: &mut egui::Ui, id: &str, value: &Value) {
    let Some(map) = value.as_object().filter(|m| !m.is_empty()) else {
        empty(ui, "Aucune donnée");
        return;
    };
    egui::Grid::new(id).num_columns(2).striped(true).show(ui, |ui| {
        for (key, entry) in map {
            if entry.is_object() || entry.is_array() {
                continue;
            }
            ui.label(RichText::new(key.replace('_', " ")).color(TEXT_SECONDARY));
            ui.label(RichText::new(scalar(entry)).color(TEXT_PRIMARY).strong());
            ui.end_row();
        }
    });
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}
