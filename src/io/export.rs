//! Export the forecast to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts; it is overwritten on every run (no append, no versioning).

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::ForecastSeries;
use crate::error::AppError;

/// Write `date,forecast_sales` rows, one per forecast day, ascending.
pub fn write_forecast_csv(path: &Path, forecast: &ForecastSeries) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::usage(format!("Failed to create forecast CSV '{}': {e}", path.display()))
    })?;

    writeln!(file, "date,forecast_sales")
        .map_err(|e| AppError::usage(format!("Failed to write forecast CSV header: {e}")))?;

    for (date, value) in forecast.iter() {
        writeln!(file, "{date},{value:.4}")
            .map_err(|e| AppError::usage(format!("Failed to write forecast CSV row: {e}")))?;
    }

    Ok(())
}
