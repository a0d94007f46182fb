//! Charts module - interactive plots and static PNG export

mod plotter;
mod renderer;

pub use plotter::{bubble_radius, format_count, ChartPlotter};
pub use renderer::{RenderError, StaticChartRenderer, CITY_CHART_FILE, STATE_CHART_FILE};
