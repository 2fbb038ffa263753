//! Public pages: landing, login and registration forms.

use egui::{self, RichText, Vec2};
use smartbot_types::route::Route;
use crate::state::{LoginForm, RegisterForm, UiCommand};
use crate::theme::*;
use super::{feedback_label, field_label};

fn form_frame(ui: &mut egui::Ui, title: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
    ui.vertical_centered(|ui| {
        ui.add_space(40.0);
        egui::Frame::default()
            .fill(BG_SECONDARY)
            .inner_margin(PANEL_PADDING * 2.0)
            .corner_radius(PANEL_ROUNDING)
            .show(ui, |ui| {
                ui.set_width(FORM_WIDTH);
                ui.heading(RichText::new(title).color(TEXT_PRIMARY).strong());
                ui.separator();
                add_contents(ui);
            });
    });
}

/// Landing page shown at `/`.
pub fn home_page(ui: &mut egui::Ui, authenticated: bool) -> Option<UiCommand> {
    let mut command = None;
    form_frame(ui, "SmartBot", |ui| {
        ui.label(
            RichText::new("Automatisez les réponses à vos emails et messages WhatsApp.")
                .color(TEXT_SECONDARY),
        );
        ui.add_space(12.0);
        ui.horizontal(|ui| {
            if authenticated {
                if ui.button("Aller au tableau de bord").clicked() {
                    command = Some(UiCommand::Navigate(Route::Dashboard));
                }
            } else {
                if ui.button("Se connecter").clicked() {
                    command = Some(UiCommand::Navigate(Route::Login));
                }
                if ui.button("Créer un compte").clicked() {
                    command = Some(UiCommand::Navigate(Route::Register));
                }
            }
        });
    });
    command
}

/// Render the login form. Returns a command on submit or navigation.
pub fn login_page(ui: &mut egui::Ui, form: &mut LoginForm) -> Option<UiCommand> {
    let mut command = None;

    form_frame(ui, "Connexion", |ui| {
        field_label(ui, "Nom d'utilisateur");
        let user = ui.add(
            egui::TextEdit::singleline(&mut form.username)
                .desired_width(f32::INFINITY),
        );

        ui.add_space(4.0);
        field_label(ui, "Mot de passe");
        let pass = ui.add(
            egui::TextEdit::singleline(&mut form.password)
                .password(true)
                .desired_width(f32::INFINITY),
        );

        if let Some(err) = &form.error {
            ui.add_space(4.0);
            ui.label(RichText::new(err).color(ERROR).small());
        }

        ui.add_space(8.0);
        let ready = !form.username.trim().is_empty() && !form.password.is_empty() && !form.busy;
        let enter = (user.lost_focus() || pass.lost_focus())
            && ui.input(|i| i.key_pressed(egui::Key::Enter));

        ui.horizontal(|ui| {
            let label = if form.busy { "Connexion..." } else { "Se connecter" };
            let clicked = ui
                .add_enabled(ready, egui::Button::new(label).min_size(Vec2::new(120.0, 28.0)))
                .clicked();
            if form.busy {
                ui.spinner();
            }
            if ready && (clicked || enter) {
                command = Some(UiCommand::Login {
                    username: form.username.trim().to_string(),
                    password: form.password.clone(),
                });
            }
        });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label(RichText::new("Pas encore de compte ?").color(TEXT_SECONDARY).small());
            if ui.link("S'inscrire").clicked() {
                command = Some(UiCommand::Navigate(Route::Register));
            }
        });
    });

    command
}

/// Render the registration form.
pub fn register_page(ui: &mut egui::Ui, form: &mut RegisterForm) -> Option<UiCommand> {
    let mut command = None;

    form_frame(ui, "Inscription", |ui| {
        let fields: [(&str, &mut String, bool); 5] = [
            ("Nom d'utilisateur", &mut form.username, false),
            ("Email", &mut form.email, false),
            ("Prénom", &mut form.first_name, false),
            ("Nom", &mut form.last_name, false),
            ("Mot de passe", &mut form.password, true),
        ];
        for (label, value, secret) in fields {
            field_label(ui, label);
            ui.add(
                egui::TextEdit::singleline(value)
                    .password(secret)
                    .desired_width(f32::INFINITY),
            );
            ui.add_space(2.0);
        }

        feedback_label(ui, form.feedback.as_ref());

        ui.add_space(8.0);
        let ready = !form.username.trim().is_empty()
            && !form.email.trim().is_empty()
            && !form.password.is_empty()
            && !form.busy;
        ui.horizontal(|ui| {
            if ui.add_enabled(ready, egui::Button::new("Créer le compte")).clicked() {
                command = Some(UiCommand::Register(form.to_request()));
            }
            if form.busy {
                ui.spinner();
            }
        });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label(RichText::new("Déjà inscrit ?").color(TEXT_SECONDARY).small());
            if ui.link("Se connecter").clicked() {
                command = Some(UiCommand::Navigate(Route::Login));
            }
        });
    });

    command
}
