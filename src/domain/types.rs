//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during preparation and fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::path::PathBuf;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A single parsed input row: one transaction-level sales observation.
///
/// Raw CSV text (heterogeneous date formats, junk values) is handled in
/// `io::ingest`; by the time a record reaches the preparator its date is a
/// concrete calendar day. Many records may share a date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSalesRecord {
    pub date: NaiveDate,
    pub sales: f64,
}

/// A gap-free daily sales series.
///
/// Invariants (enforced by construction in `prep::prepare`):
/// - exactly one slot per calendar day from `start` onward
/// - dates strictly increasing at one-day frequency
/// - the first and last slot are observed (they come from real records)
/// - never mutated after creation
///
/// Missing days carry an explicit `None` marker rather than being omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySalesSeries {
    start: NaiveDate,
    values: Vec<Option<f64>>,
}

impl DailySalesSeries {
    /// Build a series from a start date and one slot per day.
    ///
    /// Callers outside `prep` are expected to uphold the observed-endpoint
    /// invariant themselves (tests construct small series directly).
    pub fn from_parts(start: NaiveDate, values: Vec<Option<f64>>) -> Self {
        Self { start, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.start
    }

    /// Last calendar day covered by the series.
    pub fn last_date(&self) -> NaiveDate {
        self.date_at(self.values.len().saturating_sub(1))
    }

    pub fn date_at(&self, idx: usize) -> NaiveDate {
        self.start
            .checked_add_days(Days::new(idx as u64))
            .unwrap_or(self.start)
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Iterate `(date, value)` pairs in ascending date order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, Option<f64>)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(i, v)| (self.date_at(i), *v))
    }

    pub fn observed_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub fn missing_count(&self) -> usize {
        self.values.len() - self.observed_count()
    }

    /// Summary statistics over the observed values.
    pub fn stats(&self) -> SeriesStats {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut total = 0.0;
        for v in self.values.iter().flatten() {
            min = min.min(*v);
            max = max.max(*v);
            total += v;
        }
        if !min.is_finite() || !max.is_finite() {
            min = 0.0;
            max = 0.0;
        }
        SeriesStats {
            days: self.values.len(),
            observed: self.observed_count(),
            missing: self.missing_count(),
            first_date: self.first_date(),
            last_date: self.last_date(),
            sales_min: min,
            sales_max: max,
            sales_total: total,
        }
    }
}

/// Summary of a prepared series, used in reports and the TUI header.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    pub days: usize,
    pub observed: usize,
    pub missing: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub sales_min: f64,
    pub sales_max: f64,
    pub sales_total: f64,
}

/// Point forecasts on consecutive calendar days.
///
/// `start` is the day immediately after the last historical date; entry `i`
/// is the forecast for `start + i` days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    start: NaiveDate,
    values: Vec<f64>,
}

impl ForecastSeries {
    pub fn from_parts(start: NaiveDate, values: Vec<f64>) -> Self {
        Self { start, values }
    }

    pub fn horizon(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.start
    }

    pub fn date_at(&self, idx: usize) -> NaiveDate {
        self.start
            .checked_add_days(Days::new(idx as u64))
            .unwrap_or(self.start)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate `(date, forecast)` pairs in ascending date order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(i, v)| (self.date_at(i), *v))
    }
}

/// ARIMA structural order `(p, d, q)`.
///
/// The default `(5, 1, 0)` (five autoregressive lags on the once-differenced
/// series, no moving-average terms) is a tuned-by-convention default for
/// daily retail demand, not something inferred from the data. It is exposed
/// as a parameter (`--order`) rather than hidden as a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArimaOrder {
    /// Autoregressive order.
    pub p: usize,
    /// Differencing order.
    pub d: usize,
    /// Moving-average order.
    pub q: usize,
}

impl ArimaOrder {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Parameters estimated from data: AR + MA + intercept.
    pub fn num_params(&self) -> usize {
        self.p + self.q + 1
    }

    /// Minimum series length required to fit this order.
    ///
    /// After differencing `d` times we need at least one regression row past
    /// the longest lag, so: `d + max(p, q) + 2`.
    pub fn min_observations(&self) -> usize {
        self.d + self.p.max(self.q) + 2
    }
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self::new(5, 1, 0)
    }
}

impl std::fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}

impl FromStr for ArimaOrder {
    type Err = String;

    /// Parse `"p,d,q"` (e.g. `5,1,0`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(format!("Invalid order '{s}'. Expected `p,d,q` (e.g. `5,1,0`)."));
        }
        let parse = |part: &str, name: &str| -> Result<usize, String> {
            part.parse::<usize>()
                .map_err(|_| format!("Invalid {name} in order '{s}': '{part}'."))
        };
        Ok(Self {
            p: parse(parts[0], "p")?,
            d: parse(parts[1], "d")?,
            q: parse(parts[2], "q")?,
        })
    }
}

/// How missing days are resolved before the series reaches the estimator.
///
/// The estimator works on a dense `Vec<f64>`, so the explicit missing markers
/// in `DailySalesSeries` must be resolved one way or another. Linear
/// interpolation is the default: zero-filling a closed store day would drag
/// the level down, and rejecting makes gappy real-world files unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FillPolicy {
    /// Linear interpolation between the nearest observed neighbors.
    Interpolate,
    /// Treat missing days as zero sales.
    Zero,
    /// Fail with a model error if any day is missing.
    Reject,
}

impl FillPolicy {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            FillPolicy::Interpolate => "interpolate",
            FillPolicy::Zero => "zero",
            FillPolicy::Reject => "reject",
        }
    }

    pub fn next(self) -> Self {
        match self {
            FillPolicy::Interpolate => FillPolicy::Zero,
            FillPolicy::Zero => FillPolicy::Reject,
            FillPolicy::Reject => FillPolicy::Interpolate,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FillPolicy::Interpolate => FillPolicy::Reject,
            FillPolicy::Zero => FillPolicy::Interpolate,
            FillPolicy::Reject => FillPolicy::Zero,
        }
    }
}

/// Resolved configuration for one forecast run.
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    pub data_path: PathBuf,
    pub horizon: usize,
    pub order: ArimaOrder,
    pub fill: FillPolicy,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export: Option<PathBuf>,
    pub export_model: Option<PathBuf>,
    pub table_rows: usize,
}

impl Default for ForecastConfig {
    /// Mirrors the CLI defaults, minus the export paths.
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/store1_item1_sales.csv"),
            horizon: 30,
            order: ArimaOrder::default(),
            fill: FillPolicy::Interpolate,
            plot: true,
            plot_width: 100,
            plot_height: 25,
            export: None,
            export_model: None,
            table_rows: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn series_dates_step_daily() {
        let s = DailySalesSeries::from_parts(d(2023, 1, 30), vec![Some(1.0), None, Some(2.0)]);
        assert_eq!(s.len(), 3);
        assert_eq!(s.first_date(), d(2023, 1, 30));
        assert_eq!(s.date_at(1), d(2023, 1, 31));
        assert_eq!(s.date_at(2), d(2023, 2, 1));
        assert_eq!(s.last_date(), d(2023, 2, 1));
        assert_eq!(s.observed_count(), 2);
        assert_eq!(s.missing_count(), 1);
    }

    #[test]
    fn series_stats_ignore_missing() {
        let s = DailySalesSeries::from_parts(d(2023, 1, 1), vec![Some(8.0), None, Some(7.0)]);
        let stats = s.stats();
        assert_eq!(stats.days, 3);
        assert_eq!(stats.observed, 2);
        assert_eq!(stats.missing, 1);
        assert!((stats.sales_total - 15.0).abs() < 1e-12);
        assert!((stats.sales_min - 7.0).abs() < 1e-12);
        assert!((stats.sales_max - 8.0).abs() < 1e-12);
    }

    #[test]
    fn forecast_dates_follow_start() {
        let f = ForecastSeries::from_parts(d(2023, 12, 31), vec![1.0, 2.0]);
        assert_eq!(f.horizon(), 2);
        assert_eq!(f.date_at(0), d(2023, 12, 31));
        assert_eq!(f.date_at(1), d(2024, 1, 1));
    }

    #[test]
    fn order_parses_and_defaults() {
        assert_eq!(ArimaOrder::default(), ArimaOrder::new(5, 1, 0));
        assert_eq!("5,1,0".parse::<ArimaOrder>().unwrap(), ArimaOrder::new(5, 1, 0));
        assert_eq!(" 2, 0, 1 ".parse::<ArimaOrder>().unwrap(), ArimaOrder::new(2, 0, 1));
        assert!("5,1".parse::<ArimaOrder>().is_err());
        assert!("a,b,c".parse::<ArimaOrder>().is_err());
    }

    #[test]
    fn order_min_observations() {
        assert_eq!(ArimaOrder::new(5, 1, 0).min_observations(), 8);
        assert_eq!(ArimaOrder::new(1, 0, 1).min_observations(), 3);
    }
}
