//! GUI module - User interface components

mod app;
mod chart_viewer;
mod control_panel;
mod login;

pub use app::DashboardApp;
pub use chart_viewer::{ChartViewer, Tab, ViewerAction};
pub use control_panel::{ControlPanel, ControlPanelAction};
pub use login::LoginForm;
