//! Column normalization into the three declared scalar types.
//!
//! Integers widen to Int64, floats to Float64, booleans become text, and text
//! columns that are entirely ISO dates become Date (or Datetime). Columns
//! with no values at all become Float64. Anything else is rendered as text.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use polars::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::utils::{parse_iso_date, parse_iso_datetime};

/// Coerce every column of `df` to Int64, Float64, String, Date or Datetime.
pub fn normalize_frame(df: DataFrame) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        let series = normalize_series(column.as_materialized_series())?;
        if series.dtype() != column.dtype() {
            debug!(
                "Column '{}': {} -> {}",
                column.name(),
                column.dtype(),
                series.dtype()
            );
        }
        columns.push(series.into_column());
    }
    Ok(DataFrame::new(columns)?)
}

fn normalize_series(series: &Series) -> Result<Series> {
    let normalized = match series.dtype() {
        DataType::Int64 | DataType::Float64 | DataType::Date => series.clone(),
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32 => series.cast(&DataType::Int64)?,
        DataType::UInt64 | DataType::Float32 => series.cast(&DataType::Float64)?,
        DataType::Datetime(_, _) => {
            series.cast(&DataType::Datetime(TimeUnit::Microseconds, None))?
        }
        // all-null columns carry no type information; treat them as empty numbers
        DataType::Null => series.cast(&DataType::Float64)?,
        DataType::String if series.null_count() == series.len() => {
            series.cast(&DataType::Float64)?
        }
        DataType::String => coerce_dates(series)?.unwrap_or_else(|| series.clone()),
        _ => to_text(series)?,
    };
    Ok(normalized)
}

/// Convert a text column to Date/Datetime when every non-null value parses.
fn coerce_dates(series: &Series) -> Result<Option<Series>> {
    let values = series.str()?;
    let dates: Option<Vec<Option<NaiveDate>>> = values
        .into_iter()
        .map(|v| match v {
            None => Some(None),
            Some(s) => parse_iso_date(s).map(Some),
        })
        .collect();
    if let Some(dates) = dates {
        return Ok(Some(date_series(series.name().clone(), &dates)?));
    }

    let datetimes: Option<Vec<Option<NaiveDateTime>>> = values
        .into_iter()
        .map(|v| match v {
            None => Some(None),
            Some(s) => parse_iso_datetime(s).map(Some),
        })
        .collect();
    if let Some(datetimes) = datetimes {
        return Ok(Some(datetime_series(series.name().clone(), &datetimes)?));
    }

    Ok(None)
}

/// Build a Date series from calendar dates.
pub(crate) fn date_series(name: PlSmallStr, dates: &[Option<NaiveDate>]) -> Result<Series> {
    let epoch = DateTime::<Utc>::UNIX_EPOCH.date_naive();
    let days: Vec<Option<i32>> = dates
        .iter()
        .map(|d| d.map(|d| (d - epoch).num_days() as i32))
        .collect();
    Ok(Series::new(name, days).cast(&DataType::Date)?)
}

/// Build a microsecond Datetime series from naive timestamps.
pub(crate) fn datetime_series(name: PlSmallStr, values: &[Option<NaiveDateTime>]) -> Result<Series> {
    let micros: Vec<Option<i64>> = values
        .iter()
        .map(|v| v.map(|v| v.and_utc().timestamp_micros()))
        .collect();
    Ok(Series::new(name, micros).cast(&DataType::Datetime(TimeUnit::Microseconds, None))?)
}

fn to_text(series: &Series) -> Result<Series> {
    if let Ok(text) = series.cast(&DataType::String) {
        return Ok(text);
    }

    // nested types have no direct string cast; fall back to display form
    let mut rendered = Vec::with_capacity(series.len());
    for i in 0..series.len() {
        let value = series.get(i)?;
        rendered.push(match value {
            AnyValue::Null => None,
            other => Some(other.to_string()),
        });
    }
    Ok(Series::new(series.name().clone(), rendered))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_widen_and_floats_widen() {
        let df = df![
            "a" => [1i32, 2],
            "b" => [1.5f32, 2.5],
            "c" => [1u8, 2],
        ]
        .unwrap();
        let out = normalize_frame(df).unwrap();

        assert_eq!(out.column("a").unwrap().dtype(), &DataType::Int64);
        assert_eq!(out.column("b").unwrap().dtype(), &DataType::Float64);
        assert_eq!(out.column("c").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_boolean_becomes_text() {
        let df = df!["flag" => [true, false]].unwrap();
        let out = normalize_frame(df).unwrap();

        let flag = out.column("flag").unwrap();
        assert_eq!(flag.dtype(), &DataType::String);
        assert_eq!(flag.str().unwrap().get(0), Some("true"));
    }

    #[test]
    fn test_iso_strings_become_dates() {
        let days = normalize_frame(
            df!["day" => [Some("2024-01-05"), None, Some("2024-02-10")]].unwrap(),
        )
        .unwrap();
        assert_eq!(days.column("day").unwrap().dtype(), &DataType::Date);
        assert_eq!(days.column("day").unwrap().null_count(), 1);

        let stamps =
            normalize_frame(df!["at" => ["2024-01-05 10:00:00", "2024-01-06T11:30:00"]].unwrap())
                .unwrap();
        assert!(matches!(
            stamps.column("at").unwrap().dtype(),
            DataType::Datetime(TimeUnit::Microseconds, None)
        ));

        let mixed =
            normalize_frame(df!["mixed" => [Some("2024-01-05"), Some("soon"), None]].unwrap())
                .unwrap();
        assert_eq!(mixed.column("mixed").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_all_null_text_becomes_number() {
        let df = df!["empty" => [None::<&str>, None]].unwrap();
        let out = normalize_frame(df).unwrap();
        let empty = out.column("empty").unwrap();
        assert_eq!(empty.dtype(), &DataType::Float64);
        assert_eq!(empty.null_count(), 2);
    }
}
