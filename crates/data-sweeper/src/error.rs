//! Error types for the data sweeper.
//!
//! Every fallible operation in the library returns [`SweeperError`]. Errors are
//! serializable as `{code, message}` so a presentation layer can render them
//! without matching on variants.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for ingestion, cleaning, rendering and export.
#[derive(Error, Debug)]
pub enum SweeperError {
    /// The uploaded file's extension is neither `.csv` nor `.xlsx`.
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    /// No session history exists for this file name.
    #[error("No file named '{0}' has been uploaded")]
    UnknownFile(String),

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// An operation needing a numeric column was given another type.
    #[error("Column '{column}' is {actual}, expected a numeric column")]
    NotNumeric { column: String, actual: String },

    /// The workbook contains no worksheet.
    #[error("Workbook '{0}' has no worksheets")]
    EmptyWorkbook(String),

    /// Spreadsheet decoding failed.
    #[error("Failed to read spreadsheet: {0}")]
    SpreadsheetRead(String),

    /// Spreadsheet encoding failed.
    #[error("Failed to write spreadsheet: {0}")]
    SpreadsheetWrite(#[from] rust_xlsxwriter::XlsxError),

    /// PDF report rendering failed.
    #[error("Failed to render PDF report: {0}")]
    PdfRender(String),

    /// Table does not fit the target format's limits.
    #[error("Cannot export: {0}")]
    ExportLimit(String),

    /// Chart rendering failed.
    #[error("Failed to render chart: {0}")]
    ChartRender(String),

    /// A shell command line could not be parsed.
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<SweeperError>,
    },
}

impl SweeperError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        SweeperError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable code for presentation layers.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::UnknownFile(_) => "UNKNOWN_FILE",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::NotNumeric { .. } => "NOT_NUMERIC",
            Self::EmptyWorkbook(_) => "EMPTY_WORKBOOK",
            Self::SpreadsheetRead(_) => "SPREADSHEET_READ_ERROR",
            Self::SpreadsheetWrite(_) => "SPREADSHEET_WRITE_ERROR",
            Self::PdfRender(_) => "PDF_RENDER_ERROR",
            Self::ExportLimit(_) => "EXPORT_LIMIT",
            Self::ChartRender(_) => "CHART_RENDER_ERROR",
            Self::InvalidCommand(_) => "INVALID_COMMAND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// True for the per-file unsupported extension signal, looking through context.
    pub fn is_unsupported_format(&self) -> bool {
        match self {
            Self::UnsupportedFormat(_) => true,
            Self::WithContext { source, .. } => source.is_unsupported_format(),
            _ => false,
        }
    }
}

impl Serialize for SweeperError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("SweeperError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

impl From<calamine::XlsxError> for SweeperError {
    fn from(err: calamine::XlsxError) -> Self {
        SweeperError::SpreadsheetRead(err.to_string())
    }
}

/// Result type alias for sweeper operations.
pub type Result<T> = std::result::Result<T, SweeperError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| SweeperError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            SweeperError::UnsupportedFormat(".txt".to_string()).error_code(),
            "UNSUPPORTED_FORMAT"
        );
        assert_eq!(
            SweeperError::ColumnNotFound("test".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
    }

    #[test]
    fn test_unsupported_message() {
        let error = SweeperError::UnsupportedFormat(".txt".to_string());
        assert_eq!(error.to_string(), "Unsupported file type: .txt");
    }

    #[test]
    fn test_is_unsupported_format_through_context() {
        let error = SweeperError::UnsupportedFormat(".pdf".to_string()).with_context("notes.pdf");
        assert!(error.is_unsupported_format());
        assert!(!SweeperError::UnknownFile("a.csv".to_string()).is_unsupported_format());
    }

    #[test]
    fn test_error_serialization() {
        let error = SweeperError::ColumnNotFound("price".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("price"));
    }

    #[test]
    fn test_with_context() {
        let error = SweeperError::UnknownFile("sales.csv".to_string()).with_context("During undo");
        assert!(error.to_string().contains("During undo"));
        assert_eq!(error.error_code(), "UNKNOWN_FILE");
    }
}
