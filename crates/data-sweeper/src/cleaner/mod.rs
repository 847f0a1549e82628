//! Cleaning operations over [`TabularData`].
//!
//! This module provides:
//! - Exact duplicate row removal
//! - A [`CleaningOperation`] enum the session applies uniformly
//!
//! Every operation returns a new table together with human-readable step
//! messages; the input is never modified.

use polars::prelude::*;
use tracing::{debug, info};

use crate::config::FillStrategy;
use crate::error::{Result, ResultExt};
use crate::imputers::StatisticalImputer;
use crate::types::TabularData;

/// A user-triggered cleaning operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleaningOperation {
    /// Drop rows that exactly repeat an earlier row.
    RemoveDuplicates,
    /// Fill nulls in numeric columns with the given statistic.
    FillMissing(FillStrategy),
}

impl CleaningOperation {
    /// Run the operation, returning the new table and its step messages.
    pub fn apply(&self, data: &TabularData) -> Result<(TabularData, Vec<String>)> {
        match self {
            CleaningOperation::RemoveDuplicates => DataCleaner::remove_duplicates(data),
            CleaningOperation::FillMissing(strategy) => {
                StatisticalImputer::fill_missing(data, *strategy)
            }
        }
    }

    /// Short label used in log lines and the shell.
    pub fn label(&self) -> String {
        match self {
            CleaningOperation::RemoveDuplicates => "remove duplicates".to_string(),
            CleaningOperation::FillMissing(strategy) => format!("fill missing ({})", strategy),
        }
    }
}

/// Data cleaner for row-level operations.
pub struct DataCleaner;

impl DataCleaner {
    /// Remove rows that duplicate an earlier row across all columns.
    ///
    /// Nulls compare equal to nulls. The first occurrence is kept and the
    /// surviving rows keep their original order, so the operation is idempotent.
    pub fn remove_duplicates(data: &TabularData) -> Result<(TabularData, Vec<String>)> {
        let mut cleaning_actions = Vec::new();
        let before = data.height();

        if data.width() == 0 {
            cleaning_actions.push("No duplicate rows found".to_string());
            return Ok((data.clone(), cleaning_actions));
        }

        let deduped = data
            .frame()
            .clone()
            .lazy()
            .unique_stable(None, UniqueKeepStrategy::First)
            .collect()
            .context("Failed to remove duplicate rows")?;

        let removed = before - deduped.height();
        if removed > 0 {
            cleaning_actions.push(format!("Removed {} duplicate rows", removed));
            info!("Removed {} duplicate rows", removed);
        } else {
            cleaning_actions.push("No duplicate rows found".to_string());
            debug!("No duplicate rows found");
        }

        Ok((TabularData::from_normalized(deduped), cleaning_actions))
    }
}
