//! Imputation module for handling missing values.
//!
//! Numeric columns are filled with a statistic (mean, median, mode) of their
//! non-null values.

mod statistical;

pub use statistical::StatisticalImputer;
