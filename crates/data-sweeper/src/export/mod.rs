//! Serialization of tables into downloadable CSV or XLSX artifacts.
//!
//! CSV goes through the polars writer; XLSX is written cell by cell with
//! `rust_xlsxwriter` so numbers, dates and text keep their cell types.

use chrono::{DateTime, NaiveDate, Utc};
use polars::prelude::*;
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Result, SweeperError};
use crate::types::{ScalarType, TabularData};
use crate::utils::replace_extension;

/// Highest zero-based row and column indices of an XLSX worksheet.
const XLSX_MAX_ROW: usize = 1_048_575;
const XLSX_MAX_COL: usize = 16_383;

/// Target format of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv,
    Excel,
}

impl ExportFormat {
    /// Extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xlsx",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = SweeperError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            other => Err(SweeperError::InvalidConfig(format!(
                "unknown export format '{}' (expected csv or excel)",
                other
            ))),
        }
    }
}

/// A named, typed blob ready to be downloaded or written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Write the artifact into `dir`, creating it if needed.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        info!("Saved {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// Converts tables to CSV or XLSX.
pub struct Exporter;

impl Exporter {
    /// Serialize `data` with a header row and no index column.
    ///
    /// The artifact is named after `source_name` with its extension replaced.
    pub fn export(
        data: &TabularData,
        source_name: &str,
        format: ExportFormat,
    ) -> Result<ExportArtifact> {
        let bytes = match format {
            ExportFormat::Csv => Self::to_csv(data)?,
            ExportFormat::Excel => Self::to_xlsx(data)?,
        };

        Ok(ExportArtifact {
            file_name: replace_extension(source_name, format.extension()),
            mime_type: format.mime_type().to_string(),
            bytes,
        })
    }

    /// CSV bytes: header row, comma separated, ISO dates.
    pub fn to_csv(data: &TabularData) -> Result<Vec<u8>> {
        let mut df = data.frame().clone();
        let mut buf = Vec::new();
        CsvWriter::new(&mut buf)
            .include_header(true)
            .with_separator(b',')
            .finish(&mut df)?;
        Ok(buf)
    }

    /// XLSX bytes with a single worksheet. Nulls become empty cells.
    pub fn to_xlsx(data: &TabularData) -> Result<Vec<u8>> {
        if data.height() > XLSX_MAX_ROW || data.width() > XLSX_MAX_COL + 1 {
            return Err(SweeperError::ExportLimit(format!(
                "{} rows x {} columns exceeds the worksheet size",
                data.height(),
                data.width()
            )));
        }

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let header_format = Format::new().set_bold();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let datetime_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

        for (idx, column) in data.frame().get_columns().iter().enumerate() {
            let col = idx as u16;
            worksheet.write_string_with_format(0, col, column.name().as_str(), &header_format)?;

            let series = column.as_materialized_series();
            match ScalarType::of(series.dtype()) {
                ScalarType::Number => {
                    let floats = series.cast(&DataType::Float64)?;
                    for (row, value) in floats.f64()?.into_iter().enumerate() {
                        if let Some(v) = value {
                            worksheet.write_number(row as u32 + 1, col, v)?;
                        }
                    }
                }
                ScalarType::Date if series.dtype() == &DataType::Date => {
                    let epoch = DateTime::<Utc>::UNIX_EPOCH.date_naive();
                    let days = series.cast(&DataType::Int32)?;
                    for (row, value) in days.i32()?.into_iter().enumerate() {
                        if let Some(date) = value.and_then(|d| days_to_date(epoch, d)) {
                            worksheet.write_datetime_with_format(
                                row as u32 + 1,
                                col,
                                &date,
                                &date_format,
                            )?;
                        }
                    }
                }
                ScalarType::Date => {
                    let micros = series
                        .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?
                        .cast(&DataType::Int64)?;
                    for (row, value) in micros.i64()?.into_iter().enumerate() {
                        let stamp = value
                            .and_then(DateTime::<Utc>::from_timestamp_micros)
                            .map(|dt| dt.naive_utc());
                        if let Some(stamp) = stamp {
                            worksheet.write_datetime_with_format(
                                row as u32 + 1,
                                col,
                                &stamp,
                                &datetime_format,
                            )?;
                        }
                    }
                }
                ScalarType::Text => {
                    let text = series.cast(&DataType::String)?;
                    for (row, value) in text.str()?.into_iter().enumerate() {
                        if let Some(s) = value {
                            worksheet.write_string(row as u32 + 1, col, s)?;
                        }
                    }
                }
            }
        }

        Ok(workbook.save_to_buffer()?)
    }
}

fn days_to_date(epoch: NaiveDate, days: i32) -> Option<NaiveDate> {
    epoch.checked_add_signed(chrono::Duration::days(i64::from(days)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{FileIngestor, Upload};
    use pretty_assertions::assert_eq;

    fn sample() -> TabularData {
        TabularData::new(
            df![
                "product" => [Some("A"), Some("B"), None],
                "qty" => [Some(1i64), None, Some(3)],
                "price" => [1.5, 2.0, 3.25],
            ]
            .unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_export_names_and_mime_types() {
        let csv = Exporter::export(&sample(), "sales.xlsx", ExportFormat::Csv).unwrap();
        assert_eq!(csv.file_name, "sales.csv");
        assert_eq!(csv.mime_type, "text/csv");

        let xlsx = Exporter::export(&sample(), "sales.csv", ExportFormat::Excel).unwrap();
        assert_eq!(xlsx.file_name, "sales.xlsx");
        assert_eq!(
            xlsx.mime_type,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        // xlsx is a zip archive
        assert_eq!(&xlsx.bytes[..2], b"PK");
    }

    #[test]
    fn test_csv_has_header_and_no_index() {
        let bytes = Exporter::to_csv(&sample()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next(), Some("product,qty,price"));
        assert_eq!(lines.next(), Some("A,1,1.5"));
        assert_eq!(lines.next(), Some("B,,2.0"));
    }

    #[test]
    fn test_xlsx_round_trips_through_ingestor() {
        let original = sample();
        let artifact = Exporter::export(&original, "sales.csv", ExportFormat::Excel).unwrap();

        let upload = Upload::new(artifact.file_name.clone(), artifact.bytes);
        let back = FileIngestor::default().read(&upload).unwrap();

        assert_eq!(back, original);
    }

    #[test]
    fn test_xlsx_dates_round_trip() {
        let original = TabularData::new(
            df!["day" => [Some("2024-01-05"), None, Some("2024-02-29")]].unwrap(),
        )
        .unwrap();
        let bytes = Exporter::to_xlsx(&original).unwrap();

        let back = FileIngestor::default()
            .read(&Upload::new("days.xlsx", bytes))
            .unwrap();
        assert_eq!(back.column_type("day").unwrap(), ScalarType::Date);
        assert_eq!(back, original);
    }

    #[test]
    fn test_empty_csv_column_round_trips_through_xlsx() {
        let ingestor = FileIngestor::default();
        let original = ingestor.read(&Upload::new("a.csv", "a,b\n1,\n2,\n")).unwrap();
        assert_eq!(original.column_type("b").unwrap(), ScalarType::Number);

        let bytes = Exporter::to_xlsx(&original).unwrap();
        let back = ingestor.read(&Upload::new("a.xlsx", bytes)).unwrap();

        assert_eq!(back.column_type("b").unwrap(), ScalarType::Number);
        assert_eq!(back, original);
    }

    #[test]
    fn test_export_format_from_str() {
        assert_eq!("Excel".parse::<ExportFormat>().unwrap(), ExportFormat::Excel);
        assert_eq!("xlsx".parse::<ExportFormat>().unwrap(), ExportFormat::Excel);
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!("pdf".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_write_to_creates_directory() {
        let dir = std::env::temp_dir().join(format!("sweeper-export-{}", std::process::id()));
        let artifact = ExportArtifact {
            file_name: "a.csv".to_string(),
            mime_type: "text/csv".to_string(),
            bytes: b"x\n1\n".to_vec(),
        };

        let path = artifact.write_to(&dir).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"x\n1\n");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
