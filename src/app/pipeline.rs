//! Shared ingest -> prepare -> fit -> forecast pipeline.
//!
//! Both the one-shot CLI commands and the interactive TUI drive the same
//! pipeline; the TUI additionally reuses an already-prepared series via
//! [`run_forecast_with_prepared`] so that changing forecast settings does not
//! re-read the CSV.

use crate::domain::{DailySalesSeries, ForecastConfig, SeriesStats};
use crate::error::AppError;
use crate::forecast::{self, ForecastRun};
use crate::io::ingest::IngestedData;
use crate::prep::Prepared;

/// Everything one forecast run produces, ready for reporting and export.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub series: DailySalesSeries,
    pub stats: SeriesStats,
    pub run: ForecastRun,
}

/// Load the configured CSV and run the full pipeline.
pub fn run_forecast(config: &ForecastConfig) -> Result<RunOutput, AppError> {
    let prepared = Prepared::load(&config.data_path)?;
    run_forecast_with_prepared(config, prepared)
}

/// Run the model stage on an already-prepared series.
pub fn run_forecast_with_prepared(
    config: &ForecastConfig,
    prepared: Prepared,
) -> Result<RunOutput, AppError> {
    let stats = prepared.series.stats();
    let run = forecast::forecast_series(&prepared.series, config.horizon, config.order, config.fill)?;
    Ok(RunOutput {
        ingest: prepared.ingest,
        series: prepared.series,
        stats,
        run,
    })
}
