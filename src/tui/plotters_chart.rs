//! Plotters-powered rate chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.
//! The x-axis is the label index (one step per business day); tick labels map
//! the index back to its ISO date.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::SeriesName;

/// Line color for a series, shared by the chart and the settings panel.
pub fn series_rgb(name: SeriesName) -> (u8, u8, u8) {
    match name {
        SeriesName::Promedio => (0, 255, 255),
        SeriesName::Credito => (255, 215, 0),
        SeriesName::Interbank => (0, 220, 90),
        SeriesName::Bbva => (80, 140, 255),
        SeriesName::Scotiabank => (255, 70, 70),
    }
}

/// ISO label for a (possibly fractional) x position, or empty when out of range.
pub fn label_at(labels: &[String], x: f64) -> String {
    let idx = x.round();
    if !idx.is_finite() || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

/// Pre-computed drawing data for one series.
pub struct SeriesLayer {
    pub color: (u8, u8, u8),
    /// Every plotted position, joined into a line.
    pub line: Vec<(f64, f64)>,
    /// Positions observed in the export.
    pub observed: Vec<(f64, f64)>,
    /// Positions synthesized by forward-fill.
    pub filled: Vec<(f64, f64)>,
}

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call, which keeps
/// `render()` focused on drawing.
pub struct RatesPlottersChart<'a> {
    pub layers: &'a [SeriesLayer],
    pub labels: &'a [String],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
}

impl<'a> Widget for RatesPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Mesh lines are too noisy at terminal resolution; axes + labels suffice.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(4)
                .y_labels(5)
                .x_label_formatter(&|v| label_at(self.labels, *v))
                .y_label_formatter(&|v| format!("{v:.2}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for layer in self.layers {
                let (r, g, b) = layer.color;
                let color = RGBColor(r, g, b);
                let dim = RGBColor(r / 2, g / 2, b / 2);

                chart.draw_series(LineSeries::new(layer.line.iter().copied(), &color))?;

                // Pixels rather than `Circle`: the backend maps circle radii into
                // canvas units incorrectly and draws huge markers. Forward-filled
                // points get the dimmed color, observed points the full one.
                chart.draw_series(layer.filled.iter().map(|&(x, y)| Pixel::new((x, y), dim)))?;
                chart.draw_series(layer.observed.iter().map(|&(x, y)| Pixel::new((x, y), color)))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
