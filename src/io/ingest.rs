//! CSV ingest and normalization.
//!
//! This module is responsible for turning a heterogeneous sales CSV into a
//! clean set of `(date, sales)` records that are safe to aggregate.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (no hidden randomness)
//! - **Separation of concerns**: no aggregation or modeling logic here

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::RawSalesRecord;
use crate::error::AppError;

/// A row-level error encountered during ingest.
///
/// Malformed rows are dropped rather than failing the run, but they are never
/// dropped *silently*: each one lands here so callers can audit data loss.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: parsed records + row errors + counters.
#[derive(Debug, Clone, Default)]
pub struct IngestedData {
    pub records: Vec<RawSalesRecord>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load and validate a sales CSV.
///
/// Fails with a data error when no valid dated records remain.
pub fn load_sales_records(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::usage(format!("Failed to open CSV '{}': {e}", path.display()))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::usage(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map) {
            Ok(rec) => records.push(rec),
            Err(message) => {
                log::debug!("dropping line {line}: {message}");
                row_errors.push(RowError { line, message });
            }
        }
    }

    let rows_used = records.len();
    if rows_used == 0 {
        return Err(AppError::data(format!(
            "No valid dated records in '{}' ({rows_read} rows read, all dropped).",
            path.display()
        )));
    }

    if !row_errors.is_empty() {
        log::warn!(
            "dropped {} of {rows_read} rows from '{}' (run with RUST_LOG=debug for details)",
            row_errors.len(),
            path.display()
        );
    }

    Ok(IngestedData {
        records,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿date"). If we don't strip it, schema validation will
    // incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    if !header_map.contains_key("date") {
        return Err(AppError::usage("Missing required column: `date`"));
    }
    if !header_map.contains_key("sales") {
        return Err(AppError::usage("Missing required column: `sales`"));
    }
    Ok(())
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<RawSalesRecord, String> {
    let date = parse_date(get_required(record, header_map, "date")?)?;
    let sales_raw = get_required(record, header_map, "sales")?;

    let sales = sales_raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid `sales` value '{sales_raw}'."))?;
    if !sales.is_finite() {
        return Err(format!("Non-finite `sales` value '{sales_raw}'."));
    }

    Ok(RawSalesRecord { date, sales })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

/// Parse a date using a day-before-month convention.
///
/// Real exports mix ISO dates with `DD/MM/YYYY`-style regional formats (and
/// the occasional two-digit year). Day-first formats are tried before the
/// ISO ones so ambiguous values like `03/02/2023` resolve to 3 February.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 6] = [
        "%d/%m/%Y",
        "%d-%m-%Y",
        "%d.%m.%Y",
        "%d/%m/%y",
        "%Y-%m-%d",
        "%Y/%m/%d",
    ];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: DD/MM/YYYY, DD-MM-YYYY, DD.MM.YYYY, DD/MM/YY, YYYY-MM-DD, YYYY/MM/DD."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_csv(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("salesfc-ingest-{name}-{}.csv", std::process::id()));
        let mut f = File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn date_parsing_is_day_first() {
        let d = parse_date("03/02/2023").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2023, 2, 3).unwrap());
    }

    #[test]
    fn date_parsing_accepts_iso() {
        let d = parse_date("2023-02-03").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2023, 2, 3).unwrap());
    }

    #[test]
    fn date_parsing_rejects_junk() {
        assert!(parse_date("not-a-date").is_err());
        assert!(parse_date("41/01/2023").is_err());
    }

    #[test]
    fn malformed_rows_are_audited_not_fatal() {
        let path = write_temp_csv(
            "audit",
            "date,sales\n01/01/2023,5\nnot-a-date,3\n02/01/2023,oops\n03/01/2023,7\n",
        );
        let ingest = load_sales_records(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(ingest.rows_read, 4);
        assert_eq!(ingest.rows_used, 2);
        assert_eq!(ingest.row_errors.len(), 2);
        assert_eq!(ingest.row_errors[0].line, 3);
        assert_eq!(ingest.row_errors[1].line, 4);
    }

    #[test]
    fn all_rows_dropped_is_a_data_error() {
        let path = write_temp_csv("empty", "date,sales\njunk,1\nworse,2\n");
        let err = load_sales_records(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert_eq!(err.kind(), crate::error::ErrorKind::Data);
    }

    #[test]
    fn missing_sales_column_is_a_usage_error() {
        let path = write_temp_csv("schema", "date,amount\n01/01/2023,5\n");
        let err = load_sales_records(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert_eq!(err.kind(), crate::error::ErrorKind::Usage);
    }

    #[test]
    fn bom_on_first_header_is_stripped() {
        let path = write_temp_csv("bom", "\u{feff}date,sales\n01/01/2023,5\n");
        let ingest = load_sales_records(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(ingest.rows_used, 1);
    }
}
