//! Statistical imputation methods.
//!
//! Provides mean, median and mode fills for numeric columns.

use polars::prelude::*;
use tracing::{debug, warn};

use crate::config::FillStrategy;
use crate::error::{Result, ResultExt};
use crate::types::{ScalarType, TabularData};
use crate::utils::{fill_numeric_nulls, numeric_mode};

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Fill nulls in every numeric column that has them.
    ///
    /// Text and date columns, and numeric columns without nulls, are left
    /// untouched. Filled columns become Float64. A numeric column with only
    /// nulls has no statistic and is skipped with a warning.
    pub fn fill_missing(
        data: &TabularData,
        strategy: FillStrategy,
    ) -> Result<(TabularData, Vec<String>)> {
        let mut processing_steps = Vec::new();
        if strategy == FillStrategy::None {
            return Ok((data.clone(), processing_steps));
        }

        let mut df = data.frame().clone();
        for info in data.columns() {
            if info.scalar_type != ScalarType::Number || info.null_count == 0 {
                continue;
            }
            Self::fill_column(&mut df, &info.name, strategy, &mut processing_steps)?;
        }

        if processing_steps.is_empty() {
            debug!("No missing numeric values to fill");
        }
        Ok((TabularData::from_normalized(df), processing_steps))
    }

    /// The statistic `strategy` computes over the non-null values of `series`.
    pub fn fill_value(series: &Series, strategy: FillStrategy) -> Result<Option<f64>> {
        let value = match strategy {
            FillStrategy::None => None,
            FillStrategy::Mean => series.mean(),
            FillStrategy::Median => series.median(),
            FillStrategy::Mode => numeric_mode(series)?,
        };
        Ok(value)
    }

    fn fill_column(
        df: &mut DataFrame,
        col_name: &str,
        strategy: FillStrategy,
        processing_steps: &mut Vec<String>,
    ) -> Result<()> {
        let series = df
            .column(col_name)
            .context(format!("Column '{}' vanished during fill", col_name))?
            .as_materialized_series()
            .clone();

        let Some(fill_value) = Self::fill_value(&series, strategy)? else {
            warn!(
                "Column '{}' has no non-null values; cannot compute {}",
                col_name, strategy
            );
            return Ok(());
        };

        let filled = fill_numeric_nulls(&series, fill_value)?;
        df.replace(col_name, filled)?;

        processing_steps.push(format!(
            "Filled '{}' with {}: {:.2}",
            col_name, strategy, fill_value
        ));
        debug!("Filled {} nulls in '{}'", series.null_count(), col_name);

        Ok(())
    }
}
