//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed history: `o` points (missing days are simply absent)
//! - forecast: `-` line continuing from the last observed day

use crate::domain::{DailySalesSeries, ForecastSeries};

/// Render history + forecast on one x-axis of day offsets.
pub fn render_ascii_plot(
    series: &DailySalesSeries,
    forecast: &ForecastSeries,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    // Day offsets from the start of the history.
    let x_max = (series.len().saturating_sub(1) + forecast.horizon()) as f64;
    let x_min = 0.0;

    let history: Vec<(f64, f64)> = series
        .values()
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|y| (i as f64, y)))
        .collect();

    // Anchor the forecast line at the last observed day so it reads as a
    // continuation rather than a floating segment.
    let mut curve: Vec<(f64, f64)> = Vec::with_capacity(forecast.horizon() + 1);
    if let Some(&(x, y)) = history.last() {
        curve.push((x, y));
    }
    let offset = series.len() as f64;
    for (i, &v) in forecast.values().iter().enumerate() {
        curve.push((offset + i as f64, v));
    }

    let (y_min, y_max) = y_range(&history, &curve).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw curve first (so points can overlay).
    draw_curve(&mut grid, &curve, x_min, x_max, y_min, y_max);

    for &(x, y) in &history {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    // Build final string. We include a small header with ranges.
    let mut out = String::new();
    out.push_str(&format!(
        "Plot: days=[{x_min:.0}, {x_max:.0}] | sales=[{y_min:.2}, {y_max:.2}]\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn y_range(history: &[(f64, f64)], curve: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for &(_, y) in history.iter().chain(curve) {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() {
        // Flat data still plots (single horizontal band).
        Some((min_y - 0.5, min_y + 0.5))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    if x_max <= x_min {
        return 0;
    }
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, '-');
        } else {
            grid[row][col] = '-';
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn plot_golden_snapshot_small() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let series = DailySalesSeries::from_parts(start, vec![Some(0.0), Some(10.0)]);
        let forecast = ForecastSeries::from_parts(
            NaiveDate::from_ymd_opt(2023, 1, 3).unwrap(),
            vec![5.0],
        );

        let txt = render_ascii_plot(&series, &forecast, 11, 5);
        let expected = concat!(
            "Plot: days=[0, 2] | sales=[-0.50, 10.50]\n",
            "     o-    \n",
            "       --  \n",
            "         --\n",
            "           \n",
            "o          \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn missing_days_leave_no_point() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let series =
            DailySalesSeries::from_parts(start, vec![Some(1.0), None, Some(3.0)]);
        let forecast = ForecastSeries::from_parts(
            NaiveDate::from_ymd_opt(2023, 1, 4).unwrap(),
            vec![4.0],
        );

        let txt = render_ascii_plot(&series, &forecast, 12, 6);
        // Two observed points, never three. Skip the header line ("Plot: ..."
        // itself contains an 'o').
        let o_count = txt
            .lines()
            .skip(1)
            .flat_map(str::chars)
            .filter(|&c| c == 'o')
            .count();
        assert_eq!(o_count, 2);
    }
}
