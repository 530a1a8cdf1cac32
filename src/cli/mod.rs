//! Command-line parsing for the sales forecaster.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the preparation/modeling code.

use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::{ArimaOrder, FillPolicy};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "salesfc", version, about = "Daily sales ARIMA forecaster")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Prepare the series, fit ARIMA, print diagnostics + forecast, and export CSV.
    Forecast(ForecastArgs),
    /// Print the forecast table only (useful for scripting).
    Table(ForecastArgs),
    /// Generate a synthetic sales CSV to exercise the pipeline.
    Sample(SampleArgs),
    /// Launch the interactive TUI dashboard.
    ///
    /// This uses the same underlying pipeline as `salesfc forecast`, but renders
    /// the history/forecast chart and table in a terminal UI using Ratatui.
    Tui(ForecastArgs),
}

/// Common options for forecasting.
#[derive(Debug, Parser, Clone)]
pub struct ForecastArgs {
    /// Input CSV with `date` and `sales` columns.
    #[arg(long, default_value = "data/store1_item1_sales.csv")]
    pub data: PathBuf,

    /// Forecast horizon in days (the TUI clamps this to [7, 60]).
    #[arg(short = 'n', long, default_value_t = 30)]
    pub horizon: usize,

    /// ARIMA order as `p,d,q`.
    #[arg(long, default_value = "5,1,0", value_parser = ArimaOrder::from_str)]
    pub order: ArimaOrder,

    /// How to resolve missing days before fitting.
    #[arg(long, value_enum, default_value_t = FillPolicy::Interpolate)]
    pub fill: FillPolicy,

    /// Disable the terminal plot (rendered by default).
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Forecast CSV output path (overwritten each run).
    #[arg(long, default_value = "data/future_forecast.csv")]
    pub export: PathBuf,

    /// Skip writing the forecast CSV.
    #[arg(long)]
    pub no_export: bool,

    /// Export the fitted model (order, coefficients, forecast) to JSON.
    #[arg(long = "export-model")]
    pub export_model: Option<PathBuf>,

    /// Forecast rows shown in the run summary (the export always has all rows).
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
}

/// Options for synthetic data generation.
#[derive(Debug, Parser, Clone)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(long, default_value = "data/store1_item1_sales.csv")]
    pub out: PathBuf,

    /// Number of calendar days to cover.
    #[arg(long, default_value_t = 730)]
    pub days: usize,

    /// First calendar day (ISO format).
    #[arg(long, default_value = "2022-01-01", value_parser = parse_iso_date)]
    pub start: NaiveDate,

    /// Random seed (fixed seed makes the file reproducible).
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Baseline daily sales level.
    #[arg(long, default_value_t = 120.0)]
    pub level: f64,

    /// Linear trend per day.
    #[arg(long, default_value_t = 0.05)]
    pub trend: f64,

    /// Weekly seasonality amplitude.
    #[arg(long, default_value_t = 25.0)]
    pub weekly: f64,

    /// Gaussian noise standard deviation.
    #[arg(long, default_value_t = 10.0)]
    pub noise: f64,

    /// Probability a day is skipped entirely (store closed).
    #[arg(long, default_value_t = 0.03)]
    pub missing_prob: f64,

    /// Probability a day is split across two rows (same date, summed later).
    #[arg(long, default_value_t = 0.05)]
    pub dup_prob: f64,

    /// Probability a row gets an unparseable date (exercises row auditing).
    #[arg(long, default_value_t = 0.01)]
    pub junk_prob: f64,
}

fn parse_iso_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{s}' (expected YYYY-MM-DD): {e}"))
}
