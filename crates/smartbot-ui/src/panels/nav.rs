//! Dashboard chrome: top bar and sidebar menu.

use egui::{self, Align, Layout, RichText};
use smartbot_types::{route::Route, session::Session};
use crate::state::UiCommand;
use crate::theme::*;

/// Render the top bar. `user` is `None` on public pages.
pub fn top_bar(ui: &mut egui::Ui, user: Option<&Session>, status_text: &str, busy: bool) -> Option<UiCommand> {
    let mut command = None;

    ui.horizontal(|ui| {
        ui.label(RichText::new("SmartBot").strong().color(ACCENT).size(16.0));
        ui.separator();
        let status_color = if busy { WARNING } else { TEXT_SECONDARY };
        ui.label(RichText::new(status_text).color(status_color).small());

        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            match user {
                Some(session) => {
                    if ui.button("Déconnexion").clicked() {
                        command = Some(UiCommand::Logout);
                    }
                    if ui
                        .link(RichText::new(session.display_name()).color(TEXT_PRIMARY))
                        .clicked()
                    {
                        command = Some(UiCommand::Navigate(Route::Profile));
                    }
                }
                None => {
                    if ui.button("Inscription").clicked() {
                        command = Some(UiCommand::Navigate(Route::Register));
                    }
                    if ui.button("Connexion").clicked() {
                        command = Some(UiCommand::Navigate(Route::Login));
                    }
                }
            }
        });
    });

    command
}

/// Render the dashboard menu, highlighting `current`.
pub fn sidebar(ui: &mut egui::Ui, current: Route) -> Option<UiCommand> {
    let mut command = None;

    egui::Frame::default()
        .fill(BG_SECONDARY)
        .inner_margin(PANEL_PADDING)
        .show(ui, |ui| {
            ui.label(RichText::new("Menu").color(ACCENT).strong());
            ui.add_space(4.0);
            for route in Route::dashboard_menu() {
                if ui.selectable_label(*route == current, route.label()).clicked() && *route != current {
                    command = Some(UiCommand::Navigate(*route));
                }
            }
        });

    command
}
