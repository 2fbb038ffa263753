//! Generic list / JSON editor for the REST collections behind
//! bot configuration, templates, accounts and rules.

use egui::{self, RichText, ScrollArea};
use smartbot_types::route::Route;
use crate::state::{record_id, record_title, Feedback, ResourceKind, ResourceList, UiCommand, UiState};
use crate::theme::*;
use super::{feedback_label, field_label};

pub fn resources_page(ui: &mut egui::Ui, route: Route, state: &mut UiState) -> Option<UiCommand> {
    let mut command = None;

    ui.heading(RichText::new(route.label()).color(TEXT_PRIMARY).strong());
    ui.separator();

    ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
        for kind in ResourceKind::for_route(route) {
            if let Some(cmd) = resource_section(ui, *kind, state.resource_mut(*kind)) {
                command = Some(cmd);
            }
            ui.add_space(8.0);
        }
    });

    command
}

fn resource_section(ui: &mut egui::Ui, kind: ResourceKind, list: &mut ResourceList) -> Option<UiCommand> {
    let mut command = None;

    egui::Frame::default()
        .fill(BG_SECONDARY)
        .inner_margin(PANEL_PADDING)
        .corner_radius(PANEL_ROUNDING)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(RichText::new(kind.label()).color(ACCENT).strong());
                if list.loading {
                    ui.spinner();
                } else if ui.small_button("Actualiser").clicked() {
                    command = Some(UiCommand::LoadResource(kind));
                }
            });
            feedback_label(ui, list.feedback.as_ref());
            ui.add_space(4.0);

            if list.items.is_empty() && !list.loading {
                ui.label(RichText::new("Aucun élément").color(TEXT_SECONDARY).italics());
            }

            let mut edit = None;
            for record in &list.items {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(record_title(record)).color(TEXT_PRIMARY));
                    if kind.is_read_only() {
                        return;
                    }
                    let Some(id) = record_id(record) else { return };
                    if ui.small_button("Modifier").clicked() {
                        edit = Some(record.clone());
                    }
                    if ui.small_button("Supprimer").clicked() {
                        command = Some(UiCommand::DeleteResource { kind, id });
                    }
                });
            }
            if let Some(record) = edit {
                list.start_edit(&record);
            }

            if kind.is_read_only() {
                return;
            }

            ui.add_space(6.0);
            let title = match list.editing {
                Some(id) => format!("Modifier #{}", id),
                None => "Nouvel élément (JSON)".to_string(),
            };
            field_label(ui, &title);
            ui.add(
                egui::TextEdit::multiline(&mut list.editor)
                    .code_editor()
                    .desired_rows(6)
                    .desired_width(f32::INFINITY)
                    .hint_text("{ \"name\": \"...\" }"),
            );

            ui.horizontal(|ui| {
                let enabled = !list.editor.trim().is_empty() && !list.loading;
                if ui.add_enabled(enabled, egui::Button::new("Enregistrer")).clicked() {
                    match list.parsed_editor() {
                        Ok(record) => {
                            command = Some(UiCommand::SaveResource {
                                kind,
                                id: list.editing,
                                record,
                            });
                        }
                        Err(message) => {
                            list.feedback = Some(Feedback::error(message));
                        }
                    }
                }
                if ui.button("Annuler").clicked() {
                    list.reset_editor();
                }
            });
        });

    command
}
