//! Shared utilities for ingestion, cleaning and export.
//!
//! This module contains common helper functions used across multiple modules
//! to reduce code duplication and ensure consistency.

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::path::Path;

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Cell texts read as missing values, for both CSV and spreadsheet input.
pub const MISSING_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Check if a cell text is a missing value marker. Matching is exact.
pub fn is_missing_marker(s: &str) -> bool {
    MISSING_MARKERS.contains(&s)
}

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Parse an ISO `YYYY-MM-DD` date.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Parse an ISO date-time with a space or `T` separator.
pub fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

// =============================================================================
// Series Statistics Utilities
// =============================================================================

/// Non-null values of a numeric Series as f64.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<f64>> {
    let floats = series.cast(&DataType::Float64)?;
    Ok(floats.f64()?.into_iter().flatten().collect())
}

/// Most frequent non-null value of a numeric Series.
///
/// Ties resolve to the smallest value. Returns `None` when every value is null.
pub fn numeric_mode(series: &Series) -> PolarsResult<Option<f64>> {
    let mut values = numeric_values(series)?;
    values.sort_by(|a, b| a.total_cmp(b));

    let mut best: Option<(f64, usize)> = None;
    let mut i = 0;
    while i < values.len() {
        let value = values[i];
        let mut run = 1;
        while i + run < values.len() && values[i + run] == value {
            run += 1;
        }
        // strict comparison keeps the earliest (smallest) value on ties
        if best.is_none_or(|(_, count)| run > count) {
            best = Some((value, run));
        }
        i += run;
    }

    Ok(best.map(|(value, _)| value))
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric Series with a specific value.
///
/// The result is always Float64.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let floats = series.cast(&DataType::Float64)?;
    let filled: Vec<Option<f64>> = floats
        .f64()?
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_value)))
        .collect();

    Ok(Series::new(series.name().clone(), filled))
}

// =============================================================================
// Formatting Utilities
// =============================================================================

/// Format a byte count as kilobytes with two decimals, e.g. `"2.00 KB"`.
pub fn format_kb(bytes: u64) -> String {
    format!("{:.2} KB", bytes as f64 / 1024.0)
}

/// Replace (or append) the extension of a file name.
///
/// `extension` is given without the leading dot.
pub fn replace_extension(file_name: &str, extension: &str) -> String {
    let path = Path::new(file_name);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(_)) => {
            let stem = stem.to_string_lossy();
            let parent = &file_name[..file_name.len() - path_tail_len(path)];
            format!("{}{}.{}", parent, stem, extension)
        }
        _ => format!("{}.{}", file_name, extension),
    }
}

/// File stem used to build derived file names.
pub fn file_stem(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string())
}

fn path_tail_len(path: &Path) -> usize {
    path.file_name().map(|n| n.len()).unwrap_or(0)
}

// =============================================================================
// Tests
// =============================================================================
