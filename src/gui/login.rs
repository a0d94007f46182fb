//! Sign-in screen shown until the session has an identity.

use crate::auth::{AuthStatus, CredentialStore, Identity};
use egui::{Color32, RichText};

#[derive(Default)]
pub struct LoginForm {
    username: String,
    password: String,
    status: AuthStatus,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Draw the form; returns the identity once the credentials check out.
    pub fn show(&mut self, ui: &mut egui::Ui, title: &str, store: &CredentialStore) -> Option<Identity> {
        let mut submitted = false;

        ui.vertical_centered(|ui| {
            ui.add_space(80.0);
            ui.label(
                RichText::new(title)
                    .size(24.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.add_space(20.0);

            egui::Frame::none()
                .fill(ui.visuals().widgets.noninteractive.bg_fill)
                .rounding(8.0)
                .inner_margin(16.0)
                .show(ui, |ui| {
                    ui.set_width(280.0);
                    egui::Grid::new("login_form")
                        .num_columns(2)
                        .spacing([8.0, 8.0])
                        .show(ui, |ui| {
                            ui.label("Username");
                            ui.text_edit_singleline(&mut self.username);
                            ui.end_row();

                            ui.label("Password");
                            let response =
                                ui.add(egui::TextEdit::singleline(&mut self.password).password(true));
                            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                                submitted = true;
                            }
                            ui.end_row();
                        });

                    ui.add_space(10.0);
                    if ui
                        .add(egui::Button::new("Sign in").min_size(egui::vec2(120.0, 28.0)))
                        .clicked()
                    {
                        submitted = true;
                    }
                });

            ui.add_space(10.0);
            match &self.status {
                AuthStatus::Rejected => {
                    ui.label(
                        RichText::new("Incorrect username or password.")
                            .color(Color32::from_rgb(220, 53, 69)),
                    );
                }
                _ if store.is_empty() => {
                    ui.label(
                        RichText::new("No users are configured; add a [credentials] section.")
                            .color(Color32::from_rgb(255, 193, 7)),
                    );
                }
                _ => {
                    ui.label(
                        RichText::new("Enter your username and password.").color(Color32::GRAY),
                    );
                }
            }
        });

        if !submitted {
            return None;
        }

        self.status = store.authenticate(&self.username, &self.password);
        self.password.clear();
        match &self.status {
            AuthStatus::Authenticated(identity) => Some(identity.clone()),
            _ => None,
        }
    }
}
