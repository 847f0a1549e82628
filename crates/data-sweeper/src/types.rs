use polars::prelude::*;
use serde::{Deserialize, Serialize};
use static_assertions::assert_impl_all;

use crate::error::{Result, SweeperError};
use crate::ingest::normalize_frame;
use crate::utils::format_kb;

/// Declared scalar type of a column, fixed at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Number,
    Text,
    Date,
}

impl ScalarType {
    /// Map a normalized polars dtype to its scalar type.
    pub fn of(dtype: &DataType) -> Self {
        match dtype {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64 => ScalarType::Number,
            DataType::Date | DataType::Datetime(_, _) => ScalarType::Date,
            _ => ScalarType::Text,
        }
    }
}

impl std::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ScalarType::Number => "number",
            ScalarType::Text => "text",
            ScalarType::Date => "date",
        };
        f.write_str(name)
    }
}

/// An immutable table of named, typed columns.
///
/// Every column's dtype maps to exactly one [`ScalarType`]. Cleaning, undo and
/// redo never mutate a `TabularData`; they hand back a new one. Cloning is
/// cheap because polars columns are reference counted.
#[derive(Debug, Clone)]
pub struct TabularData {
    frame: DataFrame,
}

assert_impl_all!(TabularData: Send, Sync);

impl TabularData {
    /// Wrap a frame, coercing every column to a declared scalar type.
    pub fn new(frame: DataFrame) -> Result<Self> {
        Ok(Self {
            frame: normalize_frame(frame)?,
        })
    }

    /// Wrap a frame whose columns are already normalized.
    pub(crate) fn from_normalized(frame: DataFrame) -> Self {
        Self { frame }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Scalar type of the named column.
    pub fn column_type(&self, name: &str) -> Result<ScalarType> {
        let column = self
            .frame
            .column(name)
            .map_err(|_| SweeperError::ColumnNotFound(name.to_string()))?;
        Ok(ScalarType::of(column.dtype()))
    }

    /// Per-column display information in column order.
    pub fn columns(&self) -> Vec<ColumnInfo> {
        self.frame
            .get_columns()
            .iter()
            .map(|col| ColumnInfo {
                name: col.name().to_string(),
                scalar_type: ScalarType::of(col.dtype()),
                null_count: col.null_count(),
            })
            .collect()
    }

    /// Names of all numeric columns in column order.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns()
            .into_iter()
            .filter(|c| c.scalar_type == ScalarType::Number)
            .map(|c| c.name)
            .collect()
    }

    /// The first `rows` rows.
    pub fn head(&self, rows: usize) -> DataFrame {
        self.frame.head(Some(rows))
    }
}

impl PartialEq for TabularData {
    fn eq(&self, other: &Self) -> bool {
        self.frame.equals_missing(&other.frame)
    }
}

/// Display information about one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub scalar_type: ScalarType,
    pub null_count: usize,
}

/// Metadata shown for an uploaded file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetadata {
    pub name: String,
    pub size_bytes: u64,
    /// Size formatted as `"{:.2} KB"`.
    pub size_kb: String,
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<ColumnInfo>,
}

impl FileMetadata {
    pub fn new(name: &str, size_bytes: u64, data: &TabularData) -> Self {
        Self {
            name: name.to_string(),
            size_bytes,
            size_kb: format_kb(size_bytes),
            row_count: data.height(),
            column_count: data.width(),
            columns: data.columns(),
        }
    }
}

/// One row of the upload history table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(rename = "File Name")]
    pub file_name: String,
    #[serde(rename = "Size (KB)")]
    pub size_kb: String,
}

impl HistoryRecord {
    pub fn new(file_name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            file_name: file_name.into(),
            size_kb: format_kb(size_bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_type_mapping() {
        assert_eq!(ScalarType::of(&DataType::Int64), ScalarType::Number);
        assert_eq!(ScalarType::of(&DataType::Float64), ScalarType::Number);
        assert_eq!(ScalarType::of(&DataType::Date), ScalarType::Date);
        assert_eq!(
            ScalarType::of(&DataType::Datetime(TimeUnit::Microseconds, None)),
            ScalarType::Date
        );
        assert_eq!(ScalarType::of(&DataType::String), ScalarType::Text);
        assert_eq!(ScalarType::of(&DataType::Boolean), ScalarType::Text);
    }

    #[test]
    fn test_equality_treats_nulls_as_equal() {
        let a = TabularData::new(df!["x" => [Some(1.0), None]].unwrap()).unwrap();
        let b = TabularData::new(df!["x" => [Some(1.0), None]].unwrap()).unwrap();
        let c = TabularData::new(df!["x" => [Some(1.0), Some(2.0)]].unwrap()).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_numeric_columns_and_types() {
        let data = TabularData::new(
            df![
                "name" => ["a", "b"],
                "qty" => [1i32, 2],
                "price" => [1.5f32, 2.5],
            ]
            .unwrap(),
        )
        .unwrap();

        assert_eq!(data.numeric_columns(), vec!["qty", "price"]);
        assert_eq!(data.column_type("name").unwrap(), ScalarType::Text);
        assert!(matches!(
            data.column_type("missing"),
            Err(SweeperError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_history_record_formats_size() {
        let record = HistoryRecord::new("report.csv", 2048);
        assert_eq!(record.size_kb, "2.00 KB");

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"File Name\":\"report.csv\""));
        assert!(json.contains("\"Size (KB)\":\"2.00 KB\""));
    }

    #[test]
    fn test_file_metadata() {
        let data = TabularData::new(df!["a" => [Some(1i64), None, Some(3)]].unwrap()).unwrap();
        let meta = FileMetadata::new("a.csv", 1536, &data);
        assert_eq!(meta.size_kb, "1.50 KB");
        assert_eq!(meta.row_count, 3);
        assert_eq!(meta.column_count, 1);
        assert_eq!(meta.columns[0].null_count, 1);
    }
}
