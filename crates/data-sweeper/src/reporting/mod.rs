//! Report generation module.
//!
//! Produces a one-page PDF summary of an uploaded file: its name, size, row
//! count and column count.
//!
//! # Example
//!
//! ```rust,ignore
//! use data_sweeper::reporting::{ReportGenerator, ReportSummary};
//!
//! let summary = ReportSummary::new("sales.csv", upload.size(), &data);
//! let artifact = ReportGenerator::new(&config).artifact(&summary)?;
//! artifact.write_to("output")?;
//! ```

mod generator;

pub use generator::{ReportGenerator, ReportSummary};
