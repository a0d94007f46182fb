//! Static Chart Renderer
//! Draws the top-N bar charts to PNG files with plotters.
//!
//! Layout: caption on top, one horizontal bar per entry with the largest at the
//! top, count printed at the end of each bar.

use crate::charts::plotter::format_count;
use crate::stats::{CountEntry, Summary};
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const CITY_CHART_FILE: &str = "top_cities.png";
pub const STATE_CHART_FILE: &str = "top_states.png";

const BAR_COLOR: RGBColor = RGBColor(52, 152, 219);
const CHART_SIZE: (u32, u32) = (1200, 800);

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no rows to draw for {0}")]
    NoData(String),
    #[error("chart drawing failed: {0}")]
    Draw(String),
}

fn draw_err<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> RenderError {
    RenderError::Draw(err.to_string())
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render one horizontal bar chart to `path`.
    pub fn render_bar_chart(
        path: &Path,
        title: &str,
        entries: &[CountEntry],
        size: (u32, u32),
    ) -> Result<(), RenderError> {
        if entries.is_empty() {
            return Err(RenderError::NoData(title.to_string()));
        }

        let rows = entries.len();
        let max = entries.iter().map(|e| e.count).max().unwrap_or(0);
        // Headroom for the count labels.
        let x_max = (max + max / 8).max(max + 1);
        // Row 0 is drawn at the bottom, so the largest entry takes the last row.
        let labels: Vec<String> = entries
            .iter()
            .rev()
            .map(|e| e.category.label().to_string())
            .collect();

        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(220)
            .build_cartesian_2d(0usize..x_max, (0usize..rows).into_segmented())
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(rows)
            .y_label_formatter(&|value| match value {
                SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
                _ => String::new(),
            })
            .x_label_formatter(&|x| format_count(*x))
            .x_desc("Students")
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(entries.iter().enumerate().map(|(i, entry)| {
                let row = rows - 1 - i;
                let mut bar = Rectangle::new(
                    [
                        (0, SegmentValue::Exact(row)),
                        (entry.count, SegmentValue::Exact(row + 1)),
                    ],
                    BAR_COLOR.filled(),
                );
                bar.set_margin(4, 4, 0, 0);
                bar
            }))
            .map_err(draw_err)?;

        chart
            .draw_series(entries.iter().enumerate().map(|(i, entry)| {
                Text::new(
                    format!(" {}", format_count(entry.count)),
                    (entry.count, SegmentValue::CenterOf(rows - 1 - i)),
                    ("sans-serif", 16).into_font(),
                )
            }))
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
        Ok(())
    }

    /// Write the top-N city and state charts into `dir`, returning the files written.
    pub fn export_top_n(dir: &Path, summary: &Summary) -> Result<Vec<PathBuf>, RenderError> {
        if summary.is_empty() {
            return Err(RenderError::NoData("current filters".to_string()));
        }

        let charts = [
            (
                CITY_CHART_FILE,
                format!("Top {} cities", summary.top_n_cities.get()),
                summary.top_cities(),
            ),
            (
                STATE_CHART_FILE,
                format!("Top {} states", summary.top_n_states.get()),
                summary.top_states(),
            ),
        ];

        let mut written = Vec::with_capacity(charts.len());
        for (file, title, entries) in charts {
            if entries.is_empty() {
                continue;
            }
            let path = dir.join(file);
            Self::render_bar_chart(&path, &title, entries, CHART_SIZE)?;
            info!(path = %path.display(), "chart exported");
            written.push(path);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_chart_is_refused_before_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        let err = StaticChartRenderer::render_bar_chart(&path, "Top 10 cities", &[], CHART_SIZE)
            .unwrap_err();
        assert!(matches!(err, RenderError::NoData(_)));
        assert!(!path.exists());
    }
}
