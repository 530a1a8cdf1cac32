//! Ratatui-based terminal UI.
//!
//! The TUI provides a settings panel for choosing the forecast horizon, the
//! missing-day fill policy, and the ARIMA order, then renders the history and
//! forecast as a chart alongside a forecast preview table.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Terminal,
};

use crate::app::pipeline::{self, RunOutput};
use crate::cli::ForecastArgs;
use crate::error::AppError;
use crate::prep::SeriesCache;

mod chart;

use chart::{fmt_date_offset, SalesPlottersChart};

/// Interactive horizon bounds. The pipeline itself only requires `>= 1`.
const HORIZON_MIN: usize = 7;
const HORIZON_MAX: usize = 60;

const MAX_AR_ORDER: usize = 14;
const MAX_DIFF_ORDER: usize = 2;

/// Start the TUI.
pub fn run(args: ForecastArgs) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::terminal(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(args)?;
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode()
            .map_err(|e| AppError::terminal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::terminal(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    config: crate::domain::ForecastConfig,
    cache: SeriesCache,
    selected_field: usize,
    status: String,
    run: Option<RunOutput>,
}

impl App {
    fn new(args: ForecastArgs) -> Result<Self, AppError> {
        let mut config = crate::app::forecast_config_from_args(&args);
        config.horizon = config.horizon.clamp(HORIZON_MIN, HORIZON_MAX);

        let mut app = Self {
            config,
            cache: SeriesCache::new(),
            selected_field: 0,
            status: "Loading sales data...".to_string(),
            run: None,
        };
        // The first load must succeed; later refits fail soft into the status
        // line.
        app.refresh()?;
        Ok(app)
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::terminal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::terminal(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::terminal(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                if self.selected_field > 0 {
                    self.selected_field -= 1;
                }
            }
            KeyCode::Down => {
                if self.selected_field < 3 {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Char('r') => {
                self.cache.invalidate();
                match self.refresh() {
                    Ok(_) => self.status = "Reloaded sales data.".to_string(),
                    Err(err) => self.status = format!("Reload failed: {err}"),
                }
            }
            KeyCode::Char('e') => self.export_forecast(),
            _ => {}
        }
        false
    }

    fn adjust_field(&mut self, delta: i64) {
        match self.selected_field {
            0 => {
                let horizon = (self.config.horizon as i64 + delta)
                    .clamp(HORIZON_MIN as i64, HORIZON_MAX as i64);
                self.config.horizon = horizon as usize;
                self.refit(format!("horizon: {} days", self.config.horizon));
            }
            1 => {
                self.config.fill = if delta >= 0 {
                    self.config.fill.next()
                } else {
                    self.config.fill.prev()
                };
                self.refit(format!("fill: {}", self.config.fill.display_name()));
            }
            2 => {
                let p = (self.config.order.p as i64 + delta).clamp(0, MAX_AR_ORDER as i64);
                self.config.order.p = p as usize;
                self.refit(format!("order: {}", self.config.order));
            }
            3 => {
                let d = (self.config.order.d as i64 + delta).clamp(0, MAX_DIFF_ORDER as i64);
                self.config.order.d = d as usize;
                self.refit(format!("order: {}", self.config.order));
            }
            _ => {}
        }
    }

    /// Re-run the model stage with the current settings.
    ///
    /// A failed refit (for example, too little history for a larger order)
    /// keeps the last successful result on screen and reports the error in
    /// the status line.
    fn refit(&mut self, on_success: String) {
        match self.refresh() {
            Ok(reused) => {
                let src = if reused { "" } else { " (re-read source)" };
                self.status = format!("{on_success}{src}");
            }
            Err(err) => self.status = format!("{err}"),
        }
    }

    /// Load (or reuse) the prepared series and run the pipeline.
    ///
    /// Returns whether the series cache was hit. On failure the previous
    /// result stays in place, so callers can fail soft.
    fn refresh(&mut self) -> Result<bool, AppError> {
        let (prepared, reused) = self.cache.get_or_load(&self.config.data_path)?;
        let run = pipeline::run_forecast_with_prepared(&self.config, prepared)?;
        self.run = Some(run);
        Ok(reused)
    }

    fn export_forecast(&mut self) {
        let Some(run) = &self.run else {
            self.status = "Nothing to export yet.".to_string();
            return;
        };

        let path = self
            .config
            .export
            .clone()
            .unwrap_or_else(|| PathBuf::from("data/future_forecast.csv"));

        match crate::io::export::write_forecast_csv(&path, &run.run.forecast) {
            Ok(()) => self.status = format!("Forecast saved to {}", path.display()),
            Err(err) => self.status = format!("Export failed: {err}"),
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("salesfc", Style::default().fg(Color::Cyan)),
            Span::raw(" — daily sales forecast"),
        ]));

        lines.push(Line::from(Span::styled(
            format!(
                "source: {} | horizon: {}d | order: {} | fill: {}",
                self.config.data_path.display(),
                self.config.horizon,
                self.config.order,
                self.config.fill.display_name(),
            ),
            Style::default().fg(Color::Gray),
        )));

        if let Some(run) = &self.run {
            lines.push(Line::from(Span::styled(
                format!(
                    "history: {} .. {} ({} days, {} missing) | sigma2={:.3} aic={:.2} bic={:.2}",
                    run.stats.first_date,
                    run.stats.last_date,
                    run.stats.days,
                    run.stats.missing,
                    run.run.fit.sigma2,
                    run.run.fit.aic,
                    run.run.fit.bic,
                ),
                Style::default().fg(Color::Gray),
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(9)])
            .split(area);

        self.draw_chart(frame, chunks[0]);

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(32), Constraint::Min(0)])
            .split(chunks[1]);

        self.draw_settings(frame, bottom[0]);
        self.draw_forecast_preview(frame, bottom[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Sales").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(run) = &self.run else {
            let msg = Paragraph::new("Waiting for data...")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let (history, forecast, x_bounds, y_bounds) = chart_series(run);
        let x_start = run.series.first_date();

        let (chart_rect, insets) = chart_layout(inner);
        let widget = SalesPlottersChart {
            history: &history,
            forecast: &forecast,
            x_bounds,
            y_bounds,
            x_start,
            y_label: "sales",
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, x_bounds, y_bounds, x_start);
        }
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items = vec![
            ListItem::new(format!("Horizon: {} days", self.config.horizon)),
            ListItem::new(format!("Fill: {}", self.config.fill.display_name())),
            ListItem::new(format!("AR terms (p): {}", self.config.order.p)),
            ListItem::new(format!("Differencing (d): {}", self.config.order.d)),
        ];

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_forecast_preview(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Forecast").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(run) = &self.run else {
            return;
        };

        let rows = inner.height.saturating_sub(2).max(1) as usize;
        let table = crate::report::format_forecast_table(&run.run.forecast, rows);
        let p = Paragraph::new(table).style(Style::default().fg(Color::Gray));
        frame.render_widget(p, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  r reload  e export  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Build chart series for Plotters.
///
/// X is the day offset from the first historical date; the forecast segment is
/// anchored at the last observed point so the two lines join visually.
fn chart_series(run: &RunOutput) -> (Vec<(f64, f64)>, Vec<(f64, f64)>, [f64; 2], [f64; 2]) {
    let mut history = Vec::with_capacity(run.series.len());
    for (i, v) in run.series.values().iter().enumerate() {
        if let Some(v) = v {
            history.push((i as f64, *v));
        }
    }

    let n = run.series.len();
    let mut forecast = Vec::with_capacity(run.run.forecast.horizon() + 1);
    if let Some(&last) = history.last() {
        forecast.push(last);
    }
    for (i, &v) in run.run.forecast.values().iter().enumerate() {
        forecast.push(((n + i) as f64, v));
    }

    let x_max = (n + run.run.forecast.horizon()).saturating_sub(1).max(1) as f64;
    let x_bounds = [0.0, x_max];

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in history.iter().chain(forecast.iter()) {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        y_min = 0.0;
        y_max = 1.0;
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    let y_bounds = [y_min - pad, y_max + pad];

    (history, forecast, x_bounds, y_bounds)
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 5
    {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    x_start: chrono::NaiveDate,
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = fmt_date_offset(x_start, x_val);
        let label_len = label.len() as u16;
        let start = x.saturating_sub((label.len() / 2) as u16);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = format!("{:.0}", y_val);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label.len() as u16);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("date")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new("sales")
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::{DailySalesSeries, ForecastConfig};
    use crate::forecast;
    use crate::io::ingest::IngestedData;

    fn demo_run(values: Vec<Option<f64>>, horizon: usize) -> RunOutput {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let series = DailySalesSeries::from_parts(start, values);
        let stats = series.stats();
        let run = forecast::forecast_series(
            &series,
            horizon,
            crate::domain::ArimaOrder { p: 1, d: 0, q: 0 },
            crate::domain::FillPolicy::Interpolate,
        )
        .unwrap();
        RunOutput {
            ingest: IngestedData::default(),
            series,
            stats,
            run,
        }
    }

    #[test]
    fn chart_series_anchors_forecast_at_last_observed_day() {
        let values = (0..20).map(|i| Some(50.0 + i as f64)).collect();
        let out = demo_run(values, 5);
        let (history, forecast, x_bounds, y_bounds) = chart_series(&out);

        assert_eq!(history.len(), 20);
        // Anchor point plus the five forecast days.
        assert_eq!(forecast.len(), 6);
        assert_eq!(forecast[0], *history.last().unwrap());
        assert_eq!(forecast[1].0, 20.0);
        assert_eq!(x_bounds, [0.0, 24.0]);
        assert!(y_bounds[0] < 50.0 && y_bounds[1] > 69.0);
    }

    #[test]
    fn chart_series_skips_missing_days() {
        let mut values: Vec<Option<f64>> = (0..20).map(|i| Some(50.0 + i as f64)).collect();
        values[3] = None;
        values[4] = None;
        let out = demo_run(values, 5);
        let (history, _, _, _) = chart_series(&out);
        assert_eq!(history.len(), 18);
        assert!(history.iter().all(|&(x, _)| x != 3.0 && x != 4.0));
    }

    #[test]
    fn small_areas_fall_back_to_an_uninset_chart() {
        let tiny = Rect::new(0, 0, 15, 6);
        let (rect, insets) = chart_layout(tiny);
        assert_eq!(rect, tiny);
        assert!(insets.is_none());

        let roomy = Rect::new(0, 0, 80, 24);
        let (rect, insets) = chart_layout(roomy);
        assert!(insets.is_some());
        assert!(rect.width < roomy.width && rect.height < roomy.height);
    }

    #[test]
    fn tui_horizon_clamps_to_interactive_bounds() {
        let mut config = ForecastConfig {
            horizon: 90,
            ..ForecastConfig::default()
        };
        config.horizon = config.horizon.clamp(HORIZON_MIN, HORIZON_MAX);
        assert_eq!(config.horizon, 60);

        let mut config = ForecastConfig {
            horizon: 2,
            ..ForecastConfig::default()
        };
        config.horizon = config.horizon.clamp(HORIZON_MIN, HORIZON_MAX);
        assert_eq!(config.horizon, 7);
    }
}
