//! Enrollment Dashboard Main Application
//! Login gate, then the control panel and the tabbed chart viewer.

use crate::auth::CredentialStore;
use crate::config::{AppConfig, UiConfig};
use crate::data::{export, DataProvider, Dataset};
use crate::error::DashboardError;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction, LoginForm, ViewerAction};
use crate::session::{RenderOutcome, Session};
use egui::{Color32, RichText, SidePanel};
use std::path::Path;
use tracing::{error, warn};

/// Main application window.
pub struct DashboardApp {
    ui_config: UiConfig,
    credentials: CredentialStore,
    provider: Box<dyn DataProvider>,
    session: Session,
    login: LoginForm,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
    logo: Option<egui::TextureHandle>,

    outcome: Option<RenderOutcome>,
    error: Option<String>,
    needs_render: bool,
}

impl DashboardApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: AppConfig,
        provider: Box<dyn DataProvider>,
    ) -> Self {
        let logo = config
            .ui
            .logo
            .as_deref()
            .and_then(|path| Self::load_logo(&cc.egui_ctx, path));

        Self {
            credentials: CredentialStore::new(config.credentials.clone()),
            session: Session::new(&config),
            ui_config: config.ui,
            provider,
            login: LoginForm::new(),
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            logo,
            outcome: None,
            error: None,
            needs_render: false,
        }
    }

    fn load_logo(ctx: &egui::Context, path: &Path) -> Option<egui::TextureHandle> {
        match image::open(path) {
            Ok(img) => {
                let rgba = img.to_rgba8();
                let size = [rgba.width() as usize, rgba.height() as usize];
                let pixels = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
                Some(ctx.load_texture("logo", pixels, Default::default()))
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "logo not loaded");
                None
            }
        }
    }

    /// Run the filter -> aggregate pass for the current selection.
    fn refresh(&mut self) {
        self.needs_render = false;
        match self
            .session
            .render(self.provider.as_ref(), &self.control_panel.selection)
        {
            Ok(outcome) => {
                if let Some(dataset) = self.session.cached() {
                    self.control_panel.update_options(dataset);
                }
                self.outcome = Some(outcome);
                self.error = None;
            }
            Err(e) => self.fail(e),
        }
    }

    fn fail(&mut self, err: DashboardError) {
        error!(error = %err, "render pass failed");
        self.control_panel.set_error(&format!("Error: {}", err));
        self.error = Some(format!("{}\n{}", err, err.hint()));
        self.outcome = None;
    }

    fn handle_logout(&mut self) {
        self.session.sign_out();
        self.login.reset();
        self.control_panel.reset();
        self.chart_viewer = ChartViewer::new();
        self.outcome = None;
        self.error = None;
    }

    fn handle_export_csv(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name(export::EXPORT_FILE_NAME)
            .save_file()
        else {
            return;
        };

        let result = self
            .session
            .export_csv(self.provider.as_ref(), &self.control_panel.selection)
            .and_then(|bytes| Ok(export::write_csv(&path, &bytes)?));
        match result {
            Ok(()) => self
                .control_panel
                .set_status(&format!("Exported {}", path.display())),
            Err(e) => self.control_panel.set_error(&format!("Export error: {}", e)),
        }
    }

    fn handle_export_charts(&mut self) {
        let Some(dir) = rfd::FileDialog::new().pick_folder() else {
            return;
        };

        match self.session.export_charts(
            self.provider.as_ref(),
            &self.control_panel.selection,
            &dir,
        ) {
            Ok(files) => {
                self.control_panel
                    .set_status(&format!("Exported {} charts to {}", files.len(), dir.display()));
                if let Err(e) = open::that(&dir) {
                    warn!(error = %e, "could not open export folder");
                }
            }
            Err(e) => self
                .control_panel
                .set_error(&format!("Chart export error: {} {}", e, e.hint())),
        }
    }

    fn draw_header(ui: &mut egui::Ui, ui_config: &UiConfig, dataset: Option<&Dataset>) {
        ui.horizontal(|ui| {
            ui.label(
                RichText::new(&ui_config.title)
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let extracted = match (&ui_config.extracted_on, dataset) {
                    (Some(text), _) => Some(text.clone()),
                    (None, Some(dataset)) => {
                        Some(dataset.loaded_at().format("%d/%m/%Y %H:%M").to_string())
                    }
                    (None, None) => None,
                };
                if let Some(extracted) = extracted {
                    ui.label(
                        RichText::new(format!("Data extracted on {}", extracted))
                            .size(11.0)
                            .color(Color32::GRAY),
                    );
                }
            });
        });
        ui.separator();
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.session.is_authenticated() {
            egui::CentralPanel::default().show(ctx, |ui| {
                if let Some(identity) = self.login.show(ui, &self.ui_config.title, &self.credentials)
                {
                    self.session.sign_in(identity);
                    self.needs_render = true;
                }
            });
            return;
        }

        // A stale cache is reloaded on the next pass; failed loads wait for a manual reload.
        if self.needs_render || (self.error.is_none() && !self.session.is_fresh()) {
            self.refresh();
        }

        let mut panel_action = ControlPanelAction::None;
        SidePanel::left("control_panel")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    panel_action =
                        self.control_panel
                            .show(ui, self.session.identity(), self.logo.as_ref());
                });
            });

        let mut viewer_action = ViewerAction::None;
        egui::CentralPanel::default().show(ctx, |ui| {
            Self::draw_header(ui, &self.ui_config, self.session.cached());
            if let Some(message) = &self.error {
                ui.label(RichText::new(message).color(Color32::from_rgb(220, 53, 69)));
            } else {
                viewer_action = self.chart_viewer.show(ui, self.outcome.as_ref());
            }
            if let Some(footer) = &self.ui_config.footer {
                ui.with_layout(egui::Layout::bottom_up(egui::Align::Center), |ui| {
                    ui.label(RichText::new(footer).size(10.0).color(Color32::GRAY));
                });
            }
        });

        match panel_action {
            ControlPanelAction::FiltersChanged => self.needs_render = true,
            ControlPanelAction::Reload => {
                self.session.invalidate();
                self.needs_render = true;
            }
            ControlPanelAction::ExportCharts => self.handle_export_charts(),
            ControlPanelAction::Logout => self.handle_logout(),
            ControlPanelAction::None => {}
        }
        if viewer_action == ViewerAction::ExportCsv {
            self.handle_export_csv();
        }
        if self.needs_render {
            ctx.request_repaint();
        }
    }
}
