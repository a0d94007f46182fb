//! Chart Plotter Module
//! Interactive bar charts, bubble maps and count tables with egui_plot.

use crate::stats::{CountEntry, GroupedCounts, MapBubble};
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Plot, PlotPoints, Points};

pub const BAR_COLOR: Color32 = Color32::from_rgb(52, 152, 219);
pub const BUBBLE_COLOR: Color32 = Color32::from_rgb(231, 76, 60);

const BAR_ROW_HEIGHT: f32 = 26.0;
const MIN_BUBBLE_RADIUS: f32 = 3.0;
const MAX_BUBBLE_RADIUS: f32 = 24.0;

/// Integer with '.' as thousands separator, e.g. 12345 -> "12.345".
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Bubble radius scaled by area against the largest city.
pub fn bubble_radius(count: usize, max_count: usize) -> f32 {
    if max_count == 0 {
        return MIN_BUBBLE_RADIUS;
    }
    let share = (count as f32 / max_count as f32).sqrt();
    MIN_BUBBLE_RADIUS + share * (MAX_BUBBLE_RADIUS - MIN_BUBBLE_RADIUS)
}

pub struct ChartPlotter;

impl ChartPlotter {
    /// Horizontal bar chart, first entry on top.
    pub fn draw_bar_chart(ui: &mut egui::Ui, id: &str, entries: &[CountEntry]) {
        let rows = entries.len();
        // Bar `i` sits at y = rows - 1 - i so the largest is drawn highest.
        let labels: Vec<String> = entries.iter().map(|e| e.category.label().to_string()).collect();
        let bars: Vec<Bar> = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                Bar::new((rows - 1 - i) as f64, entry.count as f64)
                    .name(format!("{}: {}", entry.category, format_count(entry.count)))
                    .fill(BAR_COLOR)
            })
            .collect();

        Plot::new(id)
            .height((rows as f32 * BAR_ROW_HEIGHT).max(120.0))
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .show_grid([true, false])
            .y_axis_formatter(move |mark, _range| {
                let y = mark.value.round();
                if (mark.value - y).abs() > f64::EPSILON || y < 0.0 {
                    return String::new();
                }
                let row = y as usize;
                if row < rows {
                    labels[rows - 1 - row].clone()
                } else {
                    String::new()
                }
            })
            .x_axis_formatter(|mark, _range| {
                if mark.value < 0.0 {
                    String::new()
                } else {
                    format_count(mark.value.round() as usize)
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).horizontal().width(0.7));
            });
    }

    /// Bubble map: longitude on x, latitude on y, radius by count.
    pub fn draw_bubble_map<B: MapBubble>(ui: &mut egui::Ui, id: &str, bubbles: &[B]) {
        let max_count = bubbles.iter().map(MapBubble::count).max().unwrap_or(0);

        Plot::new(id)
            .height(420.0)
            .data_aspect(1.0)
            .x_axis_label("Longitude")
            .y_axis_label("Latitude")
            .label_formatter(|name, value| {
                if name.is_empty() {
                    format!("{:.2}, {:.2}", value.y, value.x)
                } else {
                    name.to_string()
                }
            })
            .show(ui, |plot_ui| {
                for bubble in bubbles {
                    let position = bubble.point();
                    let point = [position.longitude(), position.latitude()];
                    plot_ui.points(
                        Points::new(PlotPoints::new(vec![point]))
                            .radius(bubble_radius(bubble.count(), max_count))
                            .color(BUBBLE_COLOR.gamma_multiply(0.6))
                            .name(format!("{}: {}", bubble.label(), format_count(bubble.count()))),
                    );
                }
            });
    }

    /// Two-column table of value and count.
    pub fn draw_count_table(ui: &mut egui::Ui, counts: &GroupedCounts) {
        egui::Grid::new(format!("counts_{:?}", counts.dimension))
            .striped(true)
            .num_columns(2)
            .min_col_width(80.0)
            .show(ui, |ui| {
                ui.label(RichText::new(counts.dimension.title()).strong());
                ui.label(RichText::new("Students").strong());
                ui.end_row();

                for entry in &counts.entries {
                    ui.label(entry.category.label());
                    ui.label(format_count(entry.count));
                    ui.end_row();
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_use_dot_thousands_separator() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1.000");
        assert_eq!(format_count(1234567), "1.234.567");
    }

    #[test]
    fn bubble_radius_grows_with_count() {
        assert_eq!(bubble_radius(0, 0), MIN_BUBBLE_RADIUS);
        assert_eq!(bubble_radius(10, 10), MAX_BUBBLE_RADIUS);
        assert!(bubble_radius(2, 10) < bubble_radius(5, 10));
    }
}
