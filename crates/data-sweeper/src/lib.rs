//! # Data Sweeper
//!
//! A small data-cleaning toolkit for tabular files built on Polars.
//!
//! ## Overview
//!
//! This crate takes uploaded CSV or Excel files through a short workflow:
//!
//! - **Ingestion**: Decode `.csv` and `.xlsx` uploads into typed tables
//! - **Cleaning**: Remove duplicate rows and fill missing numeric values
//!   with the mean, median or mode
//! - **History**: Per-file undo/redo over table snapshots
//! - **Visualization**: Bar charts of numeric columns rendered to SVG
//! - **Reporting**: One-page PDF summaries of a file's shape
//! - **Conversion**: Re-export any table as CSV or XLSX
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use data_sweeper::{CleaningOperation, FileIngestor, Session, SweeperConfig, Upload};
//!
//! let config = SweeperConfig::default();
//! let ingestor = FileIngestor::new(&config);
//! let mut session = Session::new();
//!
//! let upload = Upload::from_path("sales.csv")?;
//! let outcome = session.ingest(&upload, &ingestor)?;
//! println!("{} rows", outcome.metadata.row_count);
//!
//! session.apply("sales.csv", &CleaningOperation::RemoveDuplicates)?;
//! session.undo("sales.csv");
//! ```
//!
//! ## Configuration
//!
//! Use [`SweeperConfig::builder()`] to customize preview size, chart
//! dimensions and the output directory, or load the same fields from JSON
//! with [`SweeperConfig::from_json_file`].

// Core modules
pub mod cleaner;
pub mod config;
pub mod error;
pub mod export;
pub mod imputers;
pub mod ingest;
pub mod reporting;
pub mod session;
pub mod shell;
pub mod types;
pub mod utils;
pub mod visualizer;

// Re-exports for convenient access
pub use cleaner::{CleaningOperation, DataCleaner};
pub use config::{ConfigValidationError, FillStrategy, SweeperConfig, SweeperConfigBuilder};
pub use error::{Result as SweeperResult, ResultExt, SweeperError};
pub use export::{ExportArtifact, ExportFormat, Exporter};
pub use imputers::StatisticalImputer;
pub use ingest::{FileFormat, FileIngestor, Upload, normalize_frame};
pub use reporting::{ReportGenerator, ReportSummary};
pub use session::{CleaningOutcome, FileHistory, IngestOutcome, Session};
pub use shell::{Shell, ShellCommand, ShellOutput};
pub use types::{ColumnInfo, FileMetadata, HistoryRecord, ScalarType, TabularData};
pub use visualizer::{BarChart, Visualizer};
