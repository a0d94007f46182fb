//! Chart Viewer Widget
//! Central area with the Overview, By City and By State tabs.

use crate::charts::{format_count, ChartPlotter};
use crate::session::RenderOutcome;
use crate::stats::Kpis;
use egui::{Color32, RichText, ScrollArea};

const CARD_SPACING: f32 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    ByCity,
    ByState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerAction {
    None,
    ExportCsv,
}

#[derive(Default)]
pub struct ChartViewer {
    pub tab: Tab,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, ui: &mut egui::Ui, outcome: Option<&RenderOutcome>) -> ViewerAction {
        let Some(outcome) = outcome else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return ViewerAction::None;
        };

        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.tab, Tab::Overview, "Overview");
            ui.selectable_value(&mut self.tab, Tab::ByCity, "By City");
            ui.selectable_value(&mut self.tab, Tab::ByState, "By State");
        });
        ui.separator();

        if outcome.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label(
                    RichText::new("No records match the current filters.")
                        .size(18.0)
                        .color(Color32::GRAY),
                );
            });
            return ViewerAction::None;
        }

        let mut action = ViewerAction::None;
        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| match self.tab {
                Tab::Overview => action = Self::draw_overview(ui, outcome),
                Tab::ByCity => Self::draw_by_city(ui, outcome),
                Tab::ByState => Self::draw_by_state(ui, outcome),
            });
        action
    }

    fn draw_overview(ui: &mut egui::Ui, outcome: &RenderOutcome) -> ViewerAction {
        let summary = &outcome.summary;
        Self::draw_kpis(ui, &summary.kpis);
        ui.add_space(CARD_SPACING);

        ui.columns(2, |columns| {
            Self::card(&mut columns[0], "Students by contract status", |ui| {
                ChartPlotter::draw_count_table(ui, &summary.by_status);
            });
            Self::card(&mut columns[1], "Students by course", |ui| {
                ChartPlotter::draw_count_table(ui, &summary.by_course);
            });
        });

        ui.add_space(CARD_SPACING);
        if ui.button("Download filtered data (CSV)").clicked() {
            return ViewerAction::ExportCsv;
        }
        ViewerAction::None
    }

    fn draw_by_city(ui: &mut egui::Ui, outcome: &RenderOutcome) {
        let summary = &outcome.summary;
        Self::card(ui, "Students per city", |ui| {
            if summary.bubbles.is_empty() {
                ui.label(
                    RichText::new("No cities with valid coordinates for the current filters.")
                        .color(Color32::GRAY),
                );
            } else {
                ChartPlotter::draw_bubble_map(ui, "city_bubble_map", &summary.bubbles);
            }
            let missing = outcome.data_quality_count();
            if missing > 0 {
                ui.label(
                    RichText::new(format!(
                        "{} records without valid coordinates are not shown on the map.",
                        format_count(missing)
                    ))
                    .size(11.0)
                    .color(Color32::from_rgb(255, 193, 7)),
                );
            }
        });

        ui.add_space(CARD_SPACING);
        let title = format!("Top {} cities", summary.top_n_cities.get());
        Self::card(ui, &title, |ui| {
            ChartPlotter::draw_bar_chart(ui, "top_cities", summary.top_cities());
        });
    }

    fn draw_by_state(ui: &mut egui::Ui, outcome: &RenderOutcome) {
        let summary = &outcome.summary;
        Self::card(ui, "Students per state", |ui| {
            if summary.state_bubbles.is_empty() {
                ui.label(
                    RichText::new("No states with valid coordinates for the current filters.")
                        .color(Color32::GRAY),
                );
            } else {
                ChartPlotter::draw_bubble_map(ui, "state_bubble_map", &summary.state_bubbles);
            }
        });

        ui.add_space(CARD_SPACING);
        let title = format!("Top {} states", summary.top_n_states.get());
        Self::card(ui, &title, |ui| {
            ChartPlotter::draw_bar_chart(ui, "top_states", summary.top_states());
        });
    }

    fn draw_kpis(ui: &mut egui::Ui, kpis: &Kpis) {
        let tiles = [
            ("Students", format_count(kpis.total)),
            (
                "Active",
                format!("{} ({:.1}%)", format_count(kpis.active), kpis.active_percent),
            ),
            ("Cities", format_count(kpis.cities)),
            ("States", format_count(kpis.states)),
            ("Courses", format_count(kpis.courses)),
        ];

        ui.columns(tiles.len(), |columns| {
            for (column, (label, value)) in columns.iter_mut().zip(tiles) {
                egui::Frame::none()
                    .rounding(8.0)
                    .fill(column.visuals().widgets.noninteractive.bg_fill)
                    .inner_margin(10.0)
                    .show(column, |ui| {
                        ui.vertical_centered(|ui| {
                            ui.label(RichText::new(label).size(12.0).color(Color32::GRAY));
                            ui.label(RichText::new(value).size(22.0).strong());
                        });
                    });
            }
        });
    }

    fn card(ui: &mut egui::Ui, title: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, Color32::from_rgb(100, 149, 237)))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.label(RichText::new(title).size(16.0).strong());
                ui.add_space(8.0);
                add_contents(ui);
            });
    }
}
