//! Control Panel Widget
//! Left side panel: logo, welcome line, filters, top-N sliders and actions.

use crate::auth::Identity;
use crate::data::{Category, Dataset, Dimension, FilterSelection, TopN, TOP_N_MAX, TOP_N_MIN};
use chrono::{DateTime, Local};
use egui::{Color32, RichText, ScrollArea};
use std::collections::BTreeMap;

/// Left side control panel holding the current filter selection.
pub struct ControlPanel {
    pub selection: FilterSelection,
    options: BTreeMap<Dimension, Vec<Category>>,
    options_loaded_at: Option<DateTime<Local>>,
    status: String,
    status_is_error: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            selection: FilterSelection::new(),
            options: BTreeMap::new(),
            options_loaded_at: None,
            status: "Ready".to_string(),
            status_is_error: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh the multi-select lists when a new dataset was loaded.
    pub fn update_options(&mut self, dataset: &Dataset) {
        if self.options_loaded_at == Some(dataset.loaded_at()) {
            return;
        }
        self.options = Dimension::ALL
            .iter()
            .map(|&dimension| (dimension, dataset.options(dimension)))
            .collect();
        self.options_loaded_at = Some(dataset.loaded_at());
    }

    /// Forget filters and options, as after a logout.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
        self.status_is_error = false;
    }

    pub fn set_error(&mut self, status: &str) {
        self.status = status.to_string();
        self.status_is_error = true;
    }

    /// Draw the control panel
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        identity: Option<&Identity>,
        logo: Option<&egui::TextureHandle>,
    ) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            if let Some(logo) = logo {
                ui.add(
                    egui::Image::from_texture(egui::load::SizedTexture::from_handle(logo))
                        .max_width(200.0),
                );
                ui.add_space(5.0);
            }
            if let Some(identity) = identity {
                ui.label(RichText::new(format!("Welcome, {}", identity.display_name)).size(14.0));
            }
        });
        ui.add_space(10.0);
        ui.separator();

        // ===== Filters =====
        ui.label(RichText::new("Filters").size(14.0).strong());
        ui.add_space(5.0);

        for dimension in Dimension::ALL {
            let options = self.options.get(&dimension).map(Vec::as_slice).unwrap_or(&[]);
            let selected = self.selection.selected(dimension).count();
            let header = if selected > 0 {
                format!("{} ({})", dimension.title(), selected)
            } else {
                dimension.title().to_string()
            };

            egui::CollapsingHeader::new(header)
                .id_salt(dimension.title())
                .show(ui, |ui| {
                    if options.is_empty() {
                        ui.label(RichText::new("No values").color(Color32::GRAY));
                        return;
                    }
                    ScrollArea::vertical()
                        .id_salt(dimension.title())
                        .max_height(160.0)
                        .show(ui, |ui| {
                            for option in options {
                                let mut checked = self.selection.is_selected(dimension, option);
                                if ui.checkbox(&mut checked, option.label()).changed() {
                                    if checked {
                                        self.selection.select(dimension, option.clone());
                                    } else {
                                        self.selection.deselect(dimension, option);
                                    }
                                    action = ControlPanelAction::FiltersChanged;
                                }
                            }
                        });
                    if selected > 0 && ui.small_button("Clear").clicked() {
                        self.selection.clear(dimension);
                        action = ControlPanelAction::FiltersChanged;
                    }
                });
        }

        ui.add_space(10.0);
        ui.separator();

        // ===== Top-N =====
        ui.label(RichText::new("Rankings").size(14.0).strong());
        ui.add_space(5.0);

        let mut cities = self.selection.top_n_cities.get();
        if ui
            .add(egui::Slider::new(&mut cities, TOP_N_MIN..=TOP_N_MAX).text("Top cities"))
            .changed()
        {
            self.selection.top_n_cities = TopN::new(cities);
            action = ControlPanelAction::FiltersChanged;
        }
        let mut states = self.selection.top_n_states.get();
        if ui
            .add(egui::Slider::new(&mut states, TOP_N_MIN..=TOP_N_MAX).text("Top states"))
            .changed()
        {
            self.selection.top_n_states = TopN::new(states);
            action = ControlPanelAction::FiltersChanged;
        }

        ui.add_space(10.0);
        ui.separator();

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            let button = |label: &str| {
                egui::Button::new(RichText::new(label).size(14.0)).min_size(egui::vec2(180.0, 28.0))
            };
            if ui.add(button("Reload data")).clicked() {
                action = ControlPanelAction::Reload;
            }
            ui.add_space(5.0);
            if ui.add(button("Export charts (PNG)")).clicked() {
                action = ControlPanelAction::ExportCharts;
            }
            ui.add_space(5.0);
            if ui.add(button("Log out")).clicked() {
                action = ControlPanelAction::Logout;
            }
        });

        ui.add_space(10.0);
        let status_color = if self.status_is_error {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPanelAction {
    None,
    FiltersChanged,
    Reload,
    ExportCharts,
    Logout,
}
