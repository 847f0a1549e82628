use calamine::{Data, DataType as _, Reader, Xlsx};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use polars::prelude::*;
use std::collections::HashSet;
use std::io::Cursor;

use super::coerce::{date_series, datetime_series};
use crate::error::{Result, SweeperError};
use crate::utils::is_missing_marker;

/// Decode the first worksheet of an XLSX workbook.
///
/// The first row is the header; blank headers become `column_N` and repeated
/// headers get a `.1`, `.2`, ... suffix.
pub(crate) fn read_xlsx(name: &str, bytes: &[u8]) -> Result<DataFrame> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SweeperError::EmptyWorkbook(name.to_string()))??;

    if range.is_empty() {
        return Ok(DataFrame::empty());
    }

    let mut rows = range.rows();
    let header = rows.next().unwrap_or(&[]);
    let body: Vec<&[Data]> = rows.collect();
    let width = range.width();

    let names = header_names(header, width);
    let mut columns = Vec::with_capacity(width);
    for (idx, name) in names.into_iter().enumerate() {
        let cells: Vec<Option<&Data>> = body
            .iter()
            .map(|row| row.get(idx).filter(|c| !is_empty_cell(c)))
            .collect();
        columns.push(build_series(name.into(), &cells)?.into_column());
    }

    Ok(DataFrame::new(columns)?)
}

fn is_empty_cell(cell: &Data) -> bool {
    match cell {
        Data::Empty | Data::Error(_) => true,
        Data::String(s) => is_missing_marker(s),
        _ => false,
    }
}

fn header_names(header: &[Data], width: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    (0..width)
        .map(|idx| {
            let base = match header.get(idx) {
                Some(Data::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
                Some(Data::Empty) | None => format!("column_{}", idx + 1),
                Some(Data::String(_)) => format!("column_{}", idx + 1),
                Some(other) => other.to_string(),
            };
            let mut name = base.clone();
            let mut suffix = 1;
            while !seen.insert(name.clone()) {
                name = format!("{}.{}", base, suffix);
                suffix += 1;
            }
            name
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Empty,
    Integer,
    Float,
    Temporal,
    Text,
}

fn classify(cells: &[Option<&Data>]) -> ColumnKind {
    let mut kind = ColumnKind::Empty;
    for cell in cells.iter().flatten() {
        let cell_kind = match cell {
            Data::Int(_) => ColumnKind::Integer,
            Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => ColumnKind::Integer,
            Data::Float(_) => ColumnKind::Float,
            Data::DateTime(_) | Data::DateTimeIso(_) if cell.as_datetime().is_some() => {
                ColumnKind::Temporal
            }
            _ => ColumnKind::Text,
        };
        kind = match (kind, cell_kind) {
            (ColumnKind::Empty, k) => k,
            (a, b) if a == b => a,
            (ColumnKind::Integer, ColumnKind::Float) | (ColumnKind::Float, ColumnKind::Integer) => {
                ColumnKind::Float
            }
            _ => return ColumnKind::Text,
        };
    }
    kind
}

fn build_series(name: PlSmallStr, cells: &[Option<&Data>]) -> Result<Series> {
    let series = match classify(cells) {
        ColumnKind::Empty => Series::new(name, vec![None::<f64>; cells.len()]),
        ColumnKind::Integer => {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|c| {
                    c.and_then(|c| match c {
                        Data::Int(i) => Some(*i),
                        Data::Float(f) => Some(*f as i64),
                        _ => None,
                    })
                })
                .collect();
            Series::new(name, values)
        }
        ColumnKind::Float => {
            let values: Vec<Option<f64>> = cells.iter().map(|c| c.and_then(|c| c.as_f64())).collect();
            Series::new(name, values)
        }
        ColumnKind::Temporal => {
            let values: Vec<Option<NaiveDateTime>> =
                cells.iter().map(|c| c.and_then(|c| c.as_datetime())).collect();
            let date_only = values
                .iter()
                .flatten()
                .all(|v| v.num_seconds_from_midnight() == 0 && v.nanosecond() == 0);
            if date_only {
                let dates: Vec<Option<NaiveDate>> = values.iter().map(|v| v.map(|v| v.date())).collect();
                date_series(name, &dates)?
            } else {
                datetime_series(name, &values)?
            }
        }
        ColumnKind::Text => {
            let values: Vec<Option<String>> = cells.iter().map(|c| c.map(cell_text)).collect();
            Series::new(name, values)
        }
    };
    Ok(series)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(|dt| {
                if dt.num_seconds_from_midnight() == 0 {
                    dt.format("%Y-%m-%d").to_string()
                } else {
                    dt.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            })
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}
