//! Write fitted-model JSON files.
//!
//! Model JSON is the "portable" representation of one forecast run:
//! - ARIMA order + estimated coefficients + fit quality
//! - the fill policy the estimator saw
//! - history summary stats and the forecast grid
//!
//! Useful for diffing runs or inspecting coefficients without rerunning.

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::domain::{FillPolicy, ForecastSeries, SeriesStats};
use crate::error::AppError;
use crate::model::ArimaFitSummary;

/// On-disk schema for a fitted model. Write-only: nothing reads these files
/// back, they exist for diffing runs and external inspection.
#[derive(Debug, Clone, Serialize)]
pub struct ModelFile {
    pub tool: String,
    pub fit: ArimaFitSummary,
    pub fill: FillPolicy,
    pub history: SeriesStats,
    pub forecast: ForecastSeries,
}

/// Write a model JSON file.
pub fn write_model_json(
    path: &Path,
    fit: &ArimaFitSummary,
    fill: FillPolicy,
    history: &SeriesStats,
    forecast: &ForecastSeries,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::usage(format!("Failed to create model JSON '{}': {e}", path.display()))
    })?;

    let model = ModelFile {
        tool: "salesfc".to_string(),
        fit: fit.clone(),
        fill,
        history: *history,
        forecast: forecast.clone(),
    };

    serde_json::to_writer_pretty(file, &model)
        .map_err(|e| AppError::usage(format!("Failed to write model JSON: {e}")))?;

    Ok(())
}
