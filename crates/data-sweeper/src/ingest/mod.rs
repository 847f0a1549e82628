//! File ingestion: extension dispatch, decoding and column normalization.
//!
//! Uploads are decoded with the polars CSV reader or with `calamine` for XLSX
//! workbooks. Every decoded frame passes through [`normalize_frame`] so each
//! column ends up with exactly one declared [`ScalarType`](crate::types::ScalarType).

mod coerce;
mod csv;
mod excel;

pub use coerce::normalize_frame;

use std::path::Path;
use tracing::{debug, info};

use crate::config::SweeperConfig;
use crate::error::{Result, ResultExt, SweeperError};
use crate::types::TabularData;

/// Supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    Csv,
    Excel,
}

impl FileFormat {
    /// Detect the format from a file name's extension, ignoring case.
    ///
    /// Anything other than `.csv` or `.xlsx` yields
    /// [`SweeperError::UnsupportedFormat`] carrying the lowercased extension
    /// with its dot, or an empty string when there is no extension.
    pub fn from_file_name(name: &str) -> Result<Self> {
        let ext = Path::new(name)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_ascii_lowercase()))
            .unwrap_or_default();

        match ext.as_str() {
            ".csv" => Ok(FileFormat::Csv),
            ".xlsx" => Ok(FileFormat::Excel),
            _ => Err(SweeperError::UnsupportedFormat(ext)),
        }
    }

    /// Extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Excel => "xlsx",
        }
    }
}

/// An uploaded file: its name and raw bytes.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read an upload from disk, named after the path's final component.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Decodes uploads into [`TabularData`].
#[derive(Debug, Clone, Default)]
pub struct FileIngestor {
    infer_schema_length: Option<usize>,
}

impl FileIngestor {
    pub fn new(config: &SweeperConfig) -> Self {
        Self {
            infer_schema_length: config.csv_infer_schema_length,
        }
    }

    /// Decode an upload according to its extension.
    pub fn read(&self, upload: &Upload) -> Result<TabularData> {
        let format = FileFormat::from_file_name(&upload.name)?;
        debug!("Reading '{}' as {:?} ({} bytes)", upload.name, format, upload.size());

        let frame = match format {
            FileFormat::Csv => csv::read_csv(&upload.bytes, self.infer_schema_length)
                .context(format!("Failed to parse CSV '{}'", upload.name))?,
            FileFormat::Excel => excel::read_xlsx(&upload.name, &upload.bytes)
                .context(format!("Failed to parse workbook '{}'", upload.name))?,
        };

        let data = TabularData::new(frame)?;
        info!(
            "Loaded '{}': {} rows x {} columns",
            upload.name,
            data.height(),
            data.width()
        );
        Ok(data)
    }
}
