//! Profile page: account details, edit form and password change.

use egui::{self, RichText};
use smartbot_types::session::Session;
use crate::state::{ProfileForm, UiCommand};
use crate::theme::*;
use super::{feedback_label, field_label};

pub fn profile_page(ui: &mut egui::Ui, form: &mut ProfileForm, user: Option<&Session>) -> Option<UiCommand> {
    let mut command = None;

    ui.horizontal(|ui| {
        ui.heading(RichText::new("Profil").color(TEXT_PRIMARY).strong());
        if form.loading {
            ui.spinner();
        }
    });
    ui.separator();
    feedback_label(ui, form.feedback.as_ref());

    if let Some(session) = user {
        egui::Grid::new("profile_info").num_columns(2).show(ui, |ui| {
            info_row(ui, "Nom d'utilisateur", session.username.as_deref());
            info_row(ui, "Inscrit le", session.date_joined_display().as_deref());
            info_row(ui, "Dernière connexion", session.last_login_display().as_deref());
        });
    }
    ui.add_space(8.0);

    egui::Frame::default()
        .fill(BG_SECONDARY)
        .inner_margin(PANEL_PADDING)
        .corner_radius(PANEL_ROUNDING)
        .show(ui, |ui| {
            ui.set_width(FORM_WIDTH);
            ui.label(RichText::new("Informations").color(ACCENT).strong());
            for (label, value) in [
                ("Prénom", &mut form.first_name),
                ("Nom", &mut form.last_name),
                ("Email", &mut form.email),
                ("Téléphone", &mut form.phone_number),
            ] {
                field_label(ui, label);
                ui.add(egui::TextEdit::singleline(value).desired_width(f32::INFINITY));
            }
            ui.add_space(6.0);
            if ui.add_enabled(!form.loading, egui::Button::new("Mettre à jour")).clicked() {
                command = Some(UiCommand::UpdateProfile(form.to_update()));
            }
        });

    ui.add_space(8.0);

    egui::Frame::default()
        .fill(BG_SECONDARY)
        .inner_margin(PANEL_PADDING)
        .corner_radius(PANEL_ROUNDING)
        .show(ui, |ui| {
            ui.set_width(FORM_WIDTH);
            ui.label(RichText::new("Mot de passe").color(ACCENT).strong());
            field_label(ui, "Mot de passe actuel");
            ui.add(
                egui::TextEdit::singleline(&mut form.old_password)
                    .password(true)
                    .desired_width(f32::INFINITY),
            );
            field_label(ui, "Nouveau mot de passe");
            ui.add(
                egui::TextEdit::singleline(&mut form.new_password)
                    .password(true)
                    .desired_width(f32::INFINITY),
            );
            ui.add_space(6.0);
            let ready = !form.old_password.is_empty() && !form.new_password.is_empty() && !form.loading;
            if ui.add_enabled(ready, egui::Button::new("Changer le mot de passe")).clicked() {
                command = Some(UiCommand::ChangePassword {
                    old_password: form.old_password.clone(),
                    new_password: form.new_password.clone(),
                });
            }
        });

    command
}

fn info_row(ui: &mut egui::Ui, label: &str, value: Option<&str>) {
    ui.label(RichText::new(label).color(TEXT_SECONDARY));
    ui.label(RichText::new(value.unwrap_or("-")).color(TEXT_PRIMARY));
    ui.end_row();
}
