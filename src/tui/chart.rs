//! Plotters-powered sales chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + mesh rendering
//! - less manual work for ticks/labels
//! - easy to extend later (legend, annotations, exportable PNG/SVG backends, etc.)
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use chrono::{Days, NaiveDate};
use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A lightweight, render-only chart description.
///
/// The widget is intentionally data-driven: all series and bounds are computed
/// outside the render call. This keeps `render()` focused on drawing and makes
/// it easy to test/benchmark the data prep separately.
pub struct SalesPlottersChart<'a> {
    /// Line series for the observed daily sales (x = day offset from `x_start`).
    pub history: &'a [(f64, f64)],
    /// Line series for the forecast, anchored at the last observed day.
    pub forecast: &'a [(f64, f64)],
    /// X bounds (day offsets).
    pub x_bounds: [f64; 2],
    /// Y bounds (sales units).
    pub y_bounds: [f64; 2],
    /// Calendar date of day offset 0; x tick labels are calendar dates.
    pub x_start: NaiveDate,
    pub y_label: &'a str,
}

/// Map a fractional day offset back to a calendar date label.
pub fn fmt_date_offset(start: NaiveDate, offset: f64) -> String {
    let days = offset.round().max(0.0) as u64;
    match start.checked_add_days(Days::new(days)) {
        Some(date) => date.format("%m-%d").to_string(),
        None => format!("{offset:.0}"),
    }
}

impl<'a> Widget for SalesPlottersChart<'a> {
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

        let x_start = self.x_start;

        // `plotters-ratatui-backend` draws Plotters primitives via Ratatui's
        // `Canvas` widget, which ultimately writes to the terminal buffer.
        //
        // We delegate rendering to the crate-provided widget helper to avoid
        // coupling our code to its internal backend types.
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                // Small margins keep the chart readable without wasting space.
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Axes + tick labels.
            //
            // We disable the mesh lines to reduce visual clutter in low-resolution
            // terminal rendering; the axes + labels are enough for a sales screen.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("date")
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| fmt_date_offset(x_start, *v))
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            // Series styling: keep the palette high-contrast for terminal readability.
            let history_color = RGBColor(0, 255, 255); // cyan
            let forecast_color = RGBColor(255, 255, 0); // yellow

            chart.draw_series(LineSeries::new(self.history.iter().copied(), &history_color))?;
            chart.draw_series(LineSeries::new(self.forecast.iter().copied(), &forecast_color))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_offsets_map_to_calendar_labels() {
        let start = NaiveDate::from_ymd_opt(2023, 12, 30).unwrap();
        assert_eq!(fmt_date_offset(start, 0.0), "12-30");
        assert_eq!(fmt_date_offset(start, 2.4), "01-01");
        assert_eq!(fmt_date_offset(start, -1.0), "12-30");
    }
}
