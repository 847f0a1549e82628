//! Configuration types for the data sweeper.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic setup, plus JSON loading for the CLI.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SweeperError};

/// Strategy for filling missing values in numeric columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FillStrategy {
    /// Leave missing values as-is
    #[default]
    None,
    /// Use the mean of non-null values
    Mean,
    /// Use the median of non-null values
    Median,
    /// Use the most frequent non-null value (smallest on ties)
    Mode,
}

impl FillStrategy {
    /// Lowercase name used in step messages and the CLI.
    pub fn as_str(&self) -> &'static str {
        match self {
            FillStrategy::None => "none",
            FillStrategy::Mean => "mean",
            FillStrategy::Median => "median",
            FillStrategy::Mode => "mode",
        }
    }
}

impl std::str::FromStr for FillStrategy {
    type Err = SweeperError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(FillStrategy::None),
            "mean" => Ok(FillStrategy::Mean),
            "median" => Ok(FillStrategy::Median),
            "mode" => Ok(FillStrategy::Mode),
            other => Err(SweeperError::InvalidConfig(format!(
                "unknown fill strategy '{}' (expected none, mean, median or mode)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for FillStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for a sweeper session.
///
/// Use [`SweeperConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use data_sweeper::config::{SweeperConfig, FillStrategy};
///
/// let config = SweeperConfig::builder()
///     .preview_rows(10)
///     .default_fill_strategy(FillStrategy::Median)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SweeperConfig {
    /// Number of rows shown in a data preview.
    /// Default: 5
    pub preview_rows: usize,

    /// Rows sampled for CSV schema inference. `None` scans the whole file.
    /// Default: None
    pub csv_infer_schema_length: Option<usize>,

    /// Width of rendered bar charts in pixels.
    /// Default: 800
    pub chart_width: u32,

    /// Height of rendered bar charts in pixels.
    /// Default: 480
    pub chart_height: u32,

    /// Font size of the PDF report lines in points.
    /// Default: 12.0
    pub report_font_size: f32,

    /// Directory that reports, charts and converted files are written to.
    /// Default: "output"
    pub output_dir: PathBuf,

    /// Fill strategy applied by the CLI when none is given.
    /// Default: None
    pub default_fill_strategy: FillStrategy,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            csv_infer_schema_length: None,
            chart_width: 800,
            chart_height: 480,
            report_font_size: 12.0,
            output_dir: PathBuf::from("output"),
            default_fill_strategy: FillStrategy::default(),
        }
    }
}

impl SweeperConfig {
    /// Create a new configuration builder.
    pub fn builder() -> SweeperConfigBuilder {
        SweeperConfigBuilder::default()
    }

    /// Load and validate a configuration from a JSON file.
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: SweeperConfig = serde_json::from_str(&content)?;
        config
            .validate()
            .map_err(|e| SweeperError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        if self.chart_width == 0 || self.chart_height == 0 {
            return Err(ConfigValidationError::InvalidChartSize {
                width: self.chart_width,
                height: self.chart_height,
            });
        }

        if !(self.report_font_size > 0.0 && self.report_font_size <= 72.0) {
            return Err(ConfigValidationError::InvalidFontSize(self.report_font_size));
        }

        if self.csv_infer_schema_length == Some(0) {
            return Err(ConfigValidationError::InvalidInferLength);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid chart size {width}x{height} (both dimensions must be positive)")]
    InvalidChartSize { width: u32, height: u32 },

    #[error("Invalid report font size: {0} (must be in (0, 72])")]
    InvalidFontSize(f32),

    #[error("Invalid CSV schema inference length: 0 (use None to scan all rows)")]
    InvalidInferLength,
}

/// Builder for [`SweeperConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct SweeperConfigBuilder {
    preview_rows: Option<usize>,
    csv_infer_schema_length: Option<Option<usize>>,
    chart_width: Option<u32>,
    chart_height: Option<u32>,
    report_font_size: Option<f32>,
    output_dir: Option<PathBuf>,
    default_fill_strategy: Option<FillStrategy>,
}

impl SweeperConfigBuilder {
    /// Set how many rows a preview shows.
    pub fn preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = Some(rows);
        self
    }

    /// Limit CSV schema inference to the first `rows` rows.
    ///
    /// # Arguments
    /// * `rows` - `None` to scan every row
    pub fn csv_infer_schema_length(mut self, rows: Option<usize>) -> Self {
        self.csv_infer_schema_length = Some(rows);
        self
    }

    /// Set the chart dimensions in pixels.
    pub fn chart_size(mut self, width: u32, height: u32) -> Self {
        self.chart_width = Some(width);
        self.chart_height = Some(height);
        self
    }

    /// Set the PDF report font size in points.
    pub fn report_font_size(mut self, size: f32) -> Self {
        self.report_font_size = Some(size);
        self
    }

    /// Set the output directory for generated files.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the fill strategy used when none is requested explicitly.
    pub fn default_fill_strategy(mut self, strategy: FillStrategy) -> Self {
        self.default_fill_strategy = Some(strategy);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `SweeperConfig` or an error if validation fails.
    pub fn build(self) -> std::result::Result<SweeperConfig, ConfigValidationError> {
        let defaults = SweeperConfig::default();
        let config = SweeperConfig {
            preview_rows: self.preview_rows.unwrap_or(defaults.preview_rows),
            csv_infer_schema_length: self
                .csv_infer_schema_length
                .unwrap_or(defaults.csv_infer_schema_length),
            chart_width: self.chart_width.unwrap_or(defaults.chart_width),
            chart_height: self.chart_height.unwrap_or(defaults.chart_height),
            report_font_size: self.report_font_size.unwrap_or(defaults.report_font_size),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            default_fill_strategy: self.default_fill_strategy.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}
