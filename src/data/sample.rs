//! Synthetic sales CSV generation.
//!
//! The real store dataset is not shipped with the repo, so `salesfc sample`
//! produces a realistic stand-in: level + linear trend + weekly seasonality +
//! Gaussian noise, deliberately messy in the same ways retail exports are
//! messy (mixed date formats, duplicate rows per day, skipped days, the odd
//! unparseable date). Seeded RNG keeps the file reproducible.

use std::fs::File;
use std::io::Write;

use chrono::{Datelike, Days};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::cli::SampleArgs;
use crate::error::AppError;

/// Counters describing the generated file.
#[derive(Debug, Clone)]
pub struct SampleSummary {
    pub rows_written: usize,
    pub days_covered: usize,
    pub skipped_days: usize,
    pub duplicate_rows: usize,
    pub junk_rows: usize,
}

/// Generate and write a synthetic sales CSV.
pub fn write_sample_csv(args: &SampleArgs) -> Result<SampleSummary, AppError> {
    if args.days == 0 {
        return Err(AppError::usage("Sample day count must be > 0."));
    }
    if !(args.level.is_finite() && args.trend.is_finite() && args.weekly.is_finite()) {
        return Err(AppError::usage("Invalid level/trend/weekly settings."));
    }
    if !(args.noise.is_finite() && args.noise >= 0.0) {
        return Err(AppError::usage("Noise standard deviation must be >= 0."));
    }
    for (name, p) in [
        ("missing-prob", args.missing_prob),
        ("dup-prob", args.dup_prob),
        ("junk-prob", args.junk_prob),
    ] {
        if !(0.0..1.0).contains(&p) {
            return Err(AppError::usage(format!("`--{name}` must be in [0, 1).")));
        }
    }

    let mut rng = StdRng::seed_from_u64(args.seed);
    let normal = Normal::new(0.0, args.noise.max(1e-12))
        .map_err(|e| AppError::usage(format!("Noise distribution error: {e}")))?;

    let mut file = File::create(&args.out).map_err(|e| {
        AppError::usage(format!("Failed to create sample CSV '{}': {e}", args.out.display()))
    })?;
    writeln!(file, "date,sales")
        .map_err(|e| AppError::usage(format!("Failed to write sample CSV: {e}")))?;

    let mut summary = SampleSummary {
        rows_written: 0,
        days_covered: 0,
        skipped_days: 0,
        duplicate_rows: 0,
        junk_rows: 0,
    };

    for i in 0..args.days {
        let date = args
            .start
            .checked_add_days(Days::new(i as u64))
            .ok_or_else(|| AppError::usage("Sample dates overflow the calendar."))?;

        if rng.gen_range(0.0..1.0) < args.missing_prob {
            summary.skipped_days += 1;
            continue;
        }
        summary.days_covered += 1;

        let weekday = date.weekday().num_days_from_monday() as f64;
        let seasonal = args.weekly * (weekday * std::f64::consts::TAU / 7.0).sin();
        let z: f64 = normal.sample(&mut rng);
        let total = (args.level + args.trend * i as f64 + seasonal + z).max(0.0);

        let junk = rng.gen_range(0.0..1.0) < args.junk_prob;
        let date_text = if junk {
            summary.junk_rows += 1;
            "n/a".to_string()
        } else {
            format_date_messy(&mut rng, date)
        };

        if !junk && rng.gen_range(0.0..1.0) < args.dup_prob {
            // Split the day across two rows; downstream aggregation sums them.
            let split = rng.gen_range(0.2..0.8);
            let first = total * split;
            writeln!(file, "{date_text},{first:.2}")
                .map_err(|e| AppError::usage(format!("Failed to write sample CSV: {e}")))?;
            writeln!(file, "{},{:.2}", format_date_messy(&mut rng, date), total - first)
                .map_err(|e| AppError::usage(format!("Failed to write sample CSV: {e}")))?;
            summary.duplicate_rows += 1;
            summary.rows_written += 2;
        } else {
            writeln!(file, "{date_text},{total:.2}")
                .map_err(|e| AppError::usage(format!("Failed to write sample CSV: {e}")))?;
            summary.rows_written += 1;
        }
    }

    Ok(summary)
}

/// Render a date in one of the formats real exports mix together.
///
/// All of these parse under the day-first convention in `io::ingest`.
fn format_date_messy(rng: &mut StdRng, date: chrono::NaiveDate) -> String {
    match rng.gen_range(0..3) {
        0 => date.format("%d/%m/%Y").to_string(),
        1 => date.format("%Y-%m-%d").to_string(),
        _ => date.format("%d-%m-%Y").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::SampleArgs;
    use clap::Parser;

    fn args_for(path: &std::path::Path, extra: &[&str]) -> SampleArgs {
        let mut argv = vec!["sample".to_string(), "--out".to_string(), path.display().to_string()];
        argv.extend(extra.iter().map(|s| s.to_string()));
        SampleArgs::parse_from(argv)
    }

    #[test]
    fn generated_file_round_trips_through_the_pipeline() {
        let path = std::env::temp_dir().join(format!("salesfc-sample-{}.csv", std::process::id()));
        let args = args_for(&path, &["--days", "200", "--seed", "7"]);

        let summary = write_sample_csv(&args).unwrap();
        assert!(summary.rows_written > 0);

        let prepared = crate::prep::Prepared::load(&path).unwrap();
        // Junk rows were dropped during ingest, not fatal.
        assert_eq!(prepared.ingest.row_errors.len(), summary.junk_rows);
        // One slot per day between first and last observed date.
        assert!(prepared.series.len() <= 200);
        assert_eq!(prepared.series.observed_count() + prepared.series.missing_count(), prepared.series.len());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn same_seed_same_file() {
        let dir = std::env::temp_dir();
        let p1 = dir.join(format!("salesfc-seed-a-{}.csv", std::process::id()));
        let p2 = dir.join(format!("salesfc-seed-b-{}.csv", std::process::id()));

        write_sample_csv(&args_for(&p1, &["--days", "60", "--seed", "11"])).unwrap();
        write_sample_csv(&args_for(&p2, &["--days", "60", "--seed", "11"])).unwrap();

        let a = std::fs::read_to_string(&p1).unwrap();
        let b = std::fs::read_to_string(&p2).unwrap();
        std::fs::remove_file(&p1).ok();
        std::fs::remove_file(&p2).ok();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_probability_is_rejected() {
        let path = std::env::temp_dir().join("salesfc-sample-bad.csv");
        let args = args_for(&path, &["--junk-prob", "1.5"]);
        assert!(write_sample_csv(&args).is_err());
    }
}
