//! Message inbox: filters, pagination, detail and manual reply.

use egui::{self, Align, Layout, RichText, ScrollArea};
use serde_json::Value;
use crate::state::{
    record_id, record_title, MessageListState, ResourceKind, UiCommand, UiState, STATUS_FILTERS,
    TYPE_FILTERS,
};
use crate::theme::*;
use super::{feedback_label, field_label};

pub fn messages_page(ui: &mut egui::Ui, state: &mut UiState) -> Option<UiCommand> {
    let templates = state.resource(ResourceKind::ResponseTemplates).items.clone();
    let list = &mut state.messages;
    let mut command = None;

    ui.horizontal(|ui| {
        ui.heading(RichText::new("Messages").color(TEXT_PRIMARY).strong());
        if list.loading {
            ui.spinner();
        }
    });
    ui.separator();

    if filter_bar(ui, list) {
        command = Some(UiCommand::LoadMessages);
    }
    feedback_label(ui, list.feedback.as_ref());
    ui.add_space(4.0);

    let detail_height = if list.selected.is_some() { ui.available_height() * 0.45 } else { 0.0 };
    ScrollArea::vertical()
        .id_salt("message_list")
        .max_height(ui.available_height() - detail_height - 40.0)
        .auto_shrink([false, false])
        .show(ui, |ui| {
            if list.messages.is_empty() && !list.loading {
                ui.label(RichText::new("Aucun message trouvé").color(TEXT_SECONDARY).italics());
            }
            let mut picked = None;
            for message in &list.messages {
                if message_row(ui, message, list.selected.as_ref()) {
                    picked = Some(message.clone());
                }
            }
            if let Some(message) = picked {
                if let Some(id) = record_id(&message) {
                    command = Some(UiCommand::LoadMessageResponses(id));
                }
                list.responses.clear();
                list.reply_text.clear();
                list.selected = Some(message);
            }
        });

    if pagination(ui, list) {
        command = Some(UiCommand::LoadMessages);
    }

    if list.selected.is_some() {
        ui.separator();
        if let Some(cmd) = detail(ui, list, &templates) {
            command = Some(cmd);
        }
    }

    command
}

/// Returns true when a filter changed.
fn filter_bar(ui: &mut egui::Ui, list: &mut MessageListState) -> bool {
    let mut changed = false;
    ui.horizontal(|ui| {
        let mut status = list.status_filter.clone();
        combo(ui, "status_filter", STATUS_FILTERS, &mut status);
        changed |= list.set_status_filter(&status);

        let mut kind = list.type_filter.clone();
        combo(ui, "type_filter", TYPE_FILTERS, &mut kind);
        changed |= list.set_type_filter(&kind);
    });
    changed
}

fn combo(ui: &mut egui::Ui, id: &str, options: &[(&str, &str)], value: &mut String) {
    let selected = options
        .iter()
        .find(|(v, _)| *v == value.as_str())
        .map(|(_, label)| *label)
        .unwrap_or_default();
    egui::ComboBox::from_id_salt(id)
        .selected_text(selected)
        .show_ui(ui, |ui| {
            for (v, label) in options {
                ui.selectable_value(value, v.to_string(), *label);
            }
        });
}

fn message_row(ui: &mut egui::Ui, message: &Value, selected: Option<&Value>) -> bool {
    let is_selected = selected.is_some_and(|s| record_id(s) == record_id(message));
    let status = message.get("status").and_then(Value::as_str).unwrap_or("");
    let kind = message.get("message_type").and_then(Value::as_str).unwrap_or("");
    let received = message.get("received_at").and_then(Value::as_str).unwrap_or("");

    let mut clicked = false;
    ui.horizontal(|ui| {
        ui.label(RichText::new(status).color(status_color(status)).small());
        ui.label(RichText::new(kind).color(TEXT_SECONDARY).small());
        clicked = ui.selectable_label(is_selected, record_title(message)).clicked();
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            ui.label(RichText::new(received).color(TEXT_SECONDARY).small());
        });
    });
    clicked
}

/// Returns true when the page changed.
fn pagination(ui: &mut egui::Ui, list: &mut MessageListState) -> bool {
    let mut target = None;
    ui.horizontal(|ui| {
        if ui.add_enabled(!list.is_first_page(), egui::Button::new("«")).clicked() {
            target = Some(list.page - 1);
        }
        for page in list.page_window() {
            if ui.selectable_label(page == list.page, page.to_string()).clicked() {
                target = Some(page);
            }
        }
        if ui.add_enabled(!list.is_last_page(), egui::Button::new("»")).clicked() {
            target = Some(list.page + 1);
        }
        ui.label(
            RichText::new(format!("Page {} / {}", list.page, list.total_pages))
                .color(TEXT_SECONDARY)
                .small(),
        );
    });
    target.is_some_and(|page| list.go_to_page(page))
}

fn detail(ui: &mut egui::Ui, list: &mut MessageListState, templates: &[Value]) -> Option<UiCommand> {
    let mut command = None;
    let message = list.selected.clone()?;
    let id = record_id(&message)?;

    egui::Frame::default()
        .fill(BG_SECONDARY)
        .inner_margin(PANEL_PADDING)
        .corner_radius(PANEL_ROUNDING)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(RichText::new(record_title(&message)).color(ACCENT).strong());
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if ui.small_button("Fermer").clicked() {
                        list.selected = None;
                    }
                    if ui.small_button("Supprimer").clicked() {
                        command = Some(UiCommand::DeleteMessage(id));
                    }
                });
            });

            let content = message.get("content").and_then(Value::as_str).unwrap_or("");
            ScrollArea::vertical().id_salt("message_detail").max_height(120.0).show(ui, |ui| {
                ui.label(RichText::new(content).color(TEXT_PRIMARY));
                for response in &list.responses {
                    ui.add_space(4.0);
                    let text = response.get("content").and_then(Value::as_str).unwrap_or("");
                    ui.label(RichText::new(format!("↳ {}", text)).color(SUCCESS));
                }
            });

            ui.add_space(4.0);
            field_label(ui, "Réponse");
            if !templates.is_empty() {
                let selected = list
                    .reply_template
                    .and_then(|t| templates.iter().find(|r| record_id(r) == Some(t)))
                    .map(record_title)
                    .unwrap_or_else(|| "Aucun modèle".to_string());
                let mut choice = list.reply_template;
                egui::ComboBox::from_id_salt("reply_template")
                    .selected_text(selected)
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut choice, None, "Aucun modèle");
                        for template in templates {
                            if let Some(template_id) = record_id(template) {
                                ui.selectable_value(&mut choice, Some(template_id), record_title(template));
                            }
                        }
                    });
                if choice != list.reply_template {
                    list.choose_template(choice, templates);
                }
            }
            ui.add(
                egui::TextEdit::multiline(&mut list.reply_text)
                    .desired_rows(3)
                    .desired_width(f32::INFINITY),
            );
            let ready = !list.reply_text.trim().is_empty() && !list.loading;
            if ui.add_enabled(ready, egui::Button::new("Envoyer la réponse")).clicked() {
                command = Some(UiCommand::ReplyToMessage {
                    message_id: id,
                    content: list.reply_text.trim().to_string(),
                    template_id: list.reply_template,
                });
            }
        });

    command
}
