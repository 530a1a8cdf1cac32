//! Terminal report formatting.

use crate::domain::{ForecastConfig, ForecastSeries, SeriesStats};
use crate::forecast::ForecastRun;
use crate::io::ingest::IngestedData;

/// Format the full run summary (ingest audit + series stats + fit diagnostics).
pub fn format_run_summary(
    ingest: &IngestedData,
    stats: &SeriesStats,
    run: &ForecastRun,
    config: &ForecastConfig,
) -> String {
    let mut out = String::new();

    out.push_str("=== salesfc - Daily Sales Forecast ===\n");
    out.push_str(&format!("Source: {}\n", config.data_path.display()));
    out.push_str(&format!(
        "Rows: read={} used={} dropped={}\n",
        ingest.rows_read,
        ingest.rows_used,
        ingest.row_errors.len(),
    ));
    out.push_str(&format!(
        "History: {} .. {} | days={} observed={} missing={}\n",
        stats.first_date, stats.last_date, stats.days, stats.observed, stats.missing,
    ));
    out.push_str(&format!(
        "Sales: total={:.2} | daily=[{:.2}, {:.2}]\n",
        stats.sales_total, stats.sales_min, stats.sales_max,
    ));
    out.push_str(&format!(
        "Fill: {} ({} day(s) resolved)\n",
        config.fill.display_name(),
        run.filled,
    ));

    out.push_str("\nModel:\n");
    out.push_str(&format!("- ARIMA{} on n={} observations\n", run.fit.order, run.fit.n_obs));
    out.push_str(&format!("- ar       : {}\n", fmt_vec(&run.fit.ar)));
    out.push_str(&format!("- ma       : {}\n", fmt_vec(&run.fit.ma)));
    out.push_str(&format!("- intercept: {:.6}\n", run.fit.intercept));
    out.push_str(&format!(
        "- sigma2={:.4} AIC={:.3} BIC={:.3}\n",
        run.fit.sigma2, run.fit.aic, run.fit.bic,
    ));
    out.push('\n');

    out
}

/// Format the forecast table.
///
/// `limit = 0` means all rows; otherwise the table is truncated with a
/// trailing note so summaries stay readable for long horizons.
pub fn format_forecast_table(forecast: &ForecastSeries, limit: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!("Forecast ({} days):\n", forecast.horizon()));
    out.push_str(&format!("{:<12} {:>14}\n", "date", "forecast_sales"));
    out.push_str(&format!("{:-<12} {:->14}\n", "", ""));

    let shown = if limit == 0 { forecast.horizon() } else { limit.min(forecast.horizon()) };
    for (date, value) in forecast.iter().take(shown) {
        out.push_str(&format!("{:<12} {:>14.2}\n", date.to_string(), value));
    }
    if shown < forecast.horizon() {
        out.push_str(&format!("... {} more rows in the CSV export\n", forecast.horizon() - shown));
    }

    out
}

fn fmt_vec(v: &[f64]) -> String {
    if v.is_empty() {
        return "[]".to_string();
    }
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.6}")).collect();
    format!("[{}]", parts.join(", "))
}
