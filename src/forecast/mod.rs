//! Forecast orchestration.
//!
//! Bridges the prepared series and the estimator: resolves missing-day
//! markers per the configured fill policy, fits ARIMA on the dense history,
//! and packages the point forecasts with calendar dates continuing
//! immediately after the last historical day.

use chrono::Days;

use crate::domain::{ArimaOrder, DailySalesSeries, FillPolicy, ForecastSeries};
use crate::error::AppError;
use crate::model::{Arima, ArimaFitSummary};

/// Output of one forecast: the fitted model plus the dated predictions.
#[derive(Debug, Clone)]
pub struct ForecastRun {
    pub fit: ArimaFitSummary,
    /// Number of missing days the fill policy resolved.
    pub filled: usize,
    pub forecast: ForecastSeries,
}

/// Fit ARIMA on the series and forecast `horizon` days past its last date.
///
/// The core contract only requires `horizon >= 1`; presentation layers clamp
/// further. Deterministic: same series + horizon + order, same output.
pub fn forecast_series(
    series: &DailySalesSeries,
    horizon: usize,
    order: ArimaOrder,
    fill: FillPolicy,
) -> Result<ForecastRun, AppError> {
    if horizon == 0 {
        return Err(AppError::usage("Forecast horizon must be at least 1 day."));
    }
    if series.is_empty() {
        return Err(AppError::model("Cannot forecast an empty series."));
    }

    let (values, filled) = fill_missing(series, fill)?;
    let model = Arima::fit(order, &values)?;
    let predictions = model.forecast(horizon);

    let start = series
        .last_date()
        .checked_add_days(Days::new(1))
        .ok_or_else(|| AppError::model("Forecast dates overflow the calendar."))?;

    Ok(ForecastRun {
        fit: model.summary(),
        filled,
        forecast: ForecastSeries::from_parts(start, predictions),
    })
}

/// Resolve missing markers into a dense vector the estimator can consume.
///
/// Returns the dense values and how many slots were filled.
fn fill_missing(series: &DailySalesSeries, fill: FillPolicy) -> Result<(Vec<f64>, usize), AppError> {
    let missing = series.missing_count();
    if missing == 0 {
        let dense = series.values().iter().map(|v| v.unwrap_or(0.0)).collect();
        return Ok((dense, 0));
    }

    match fill {
        FillPolicy::Reject => Err(AppError::model(format!(
            "Series has {missing} missing day(s) and the fill policy is `reject`."
        ))),
        FillPolicy::Zero => {
            let dense = series.values().iter().map(|v| v.unwrap_or(0.0)).collect();
            Ok((dense, missing))
        }
        FillPolicy::Interpolate => interpolate(series.values()).map(|dense| (dense, missing)),
    }
}

/// Linear interpolation between observed neighbors.
///
/// Leading/trailing gaps (possible only for hand-built series; `prepare`
/// guarantees observed endpoints) are extended flat from the nearest
/// observation.
fn interpolate(values: &[Option<f64>]) -> Result<Vec<f64>, AppError> {
    let observed: Vec<usize> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|_| i))
        .collect();

    if observed.is_empty() {
        return Err(AppError::model("Series has no observed values."));
    }

    let mut dense = vec![0.0; values.len()];
    for (i, slot) in dense.iter_mut().enumerate() {
        *slot = match values[i] {
            Some(v) => v,
            None => {
                let next = observed.partition_point(|&o| o < i);
                match (next.checked_sub(1).map(|k| observed[k]), observed.get(next)) {
                    (Some(lo), Some(&hi)) => {
                        let u = (i - lo) as f64 / (hi - lo) as f64;
                        let y0 = values[lo].unwrap_or(0.0);
                        let y1 = values[hi].unwrap_or(0.0);
                        y0 + u * (y1 - y0)
                    }
                    (Some(lo), None) => values[lo].unwrap_or(0.0),
                    (None, Some(&hi)) => values[hi].unwrap_or(0.0),
                    (None, None) => unreachable!("observed is non-empty"),
                }
            }
        };
    }

    Ok(dense)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn demand_series(days: usize) -> DailySalesSeries {
        let values: Vec<Option<f64>> = (0..days)
            .map(|i| {
                Some(120.0 + 0.2 * i as f64 + 20.0 * (i as f64 * std::f64::consts::TAU / 7.0).sin())
            })
            .collect();
        DailySalesSeries::from_parts(d(2023, 1, 1), values)
    }

    #[test]
    fn horizon_30_gives_30_consecutive_days() {
        let series = demand_series(120);
        let run = forecast_series(&series, 30, ArimaOrder::default(), FillPolicy::Interpolate).unwrap();

        assert_eq!(run.forecast.horizon(), 30);
        assert_eq!(run.forecast.first_date(), series.last_date().succ_opt().unwrap());
        let dates: Vec<_> = run.forecast.iter().map(|(date, _)| date).collect();
        for pair in dates.windows(2) {
            assert_eq!((pair[1] - pair[0]).num_days(), 1);
        }
        assert_eq!(*dates.last().unwrap(), series.last_date() + chrono::Days::new(30));
    }

    #[test]
    fn repeated_runs_are_bit_for_bit_identical() {
        let series = demand_series(100);
        let a = forecast_series(&series, 14, ArimaOrder::default(), FillPolicy::Interpolate).unwrap();
        let b = forecast_series(&series, 14, ArimaOrder::default(), FillPolicy::Interpolate).unwrap();
        assert_eq!(a.forecast, b.forecast);
    }

    #[test]
    fn length_one_series_is_a_model_error() {
        let series = DailySalesSeries::from_parts(d(2023, 1, 1), vec![Some(5.0)]);
        let err = forecast_series(&series, 7, ArimaOrder::default(), FillPolicy::Interpolate).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Model);
    }

    #[test]
    fn zero_horizon_is_a_usage_error() {
        let series = demand_series(50);
        let err = forecast_series(&series, 0, ArimaOrder::default(), FillPolicy::Interpolate).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn reject_policy_fails_on_gaps() {
        let series = DailySalesSeries::from_parts(
            d(2023, 1, 1),
            vec![Some(1.0), None, Some(3.0), Some(4.0)],
        );
        let err = forecast_series(&series, 7, ArimaOrder::new(1, 0, 0), FillPolicy::Reject).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Model);
    }

    #[test]
    fn interpolation_bridges_interior_gaps() {
        let values = vec![Some(10.0), None, None, Some(40.0), Some(50.0)];
        let dense = interpolate(&values).unwrap();
        assert_eq!(dense, vec![10.0, 20.0, 30.0, 40.0, 50.0]);
    }

    #[test]
    fn interpolation_extends_edges_flat() {
        let values = vec![None, Some(10.0), None];
        let dense = interpolate(&values).unwrap();
        assert_eq!(dense, vec![10.0, 10.0, 10.0]);
    }

    #[test]
    fn filled_count_reports_resolved_gaps() {
        let series = DailySalesSeries::from_parts(
            d(2023, 1, 1),
            (0..40)
                .map(|i| if i % 9 == 4 { None } else { Some(100.0 + (i as f64 * 0.8).sin() * 10.0) })
                .collect(),
        );
        let missing = series.missing_count();
        assert!(missing > 0);

        let run = forecast_series(&series, 7, ArimaOrder::new(2, 1, 0), FillPolicy::Interpolate).unwrap();
        assert_eq!(run.filled, missing);
    }

    #[test]
    fn zero_fill_resolves_gaps_with_zeros() {
        let values = vec![Some(5.0), None, Some(7.0)];
        let series = DailySalesSeries::from_parts(d(2023, 1, 1), values);
        let (dense, filled) = fill_missing(&series, FillPolicy::Zero).unwrap();
        assert_eq!(dense, vec![5.0, 0.0, 7.0]);
        assert_eq!(filled, 1);
    }
}
