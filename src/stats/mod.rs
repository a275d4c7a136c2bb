//! Statistics over a loaded table.
//!
//! ```text
//!   Dataset ──data()──▶ &RecordBatch
//!                           │  (borrowed, never copied)
//!                           ▼
//!                  ┌──────────────────┐
//!                  │ StatisticsEngine │  validate column → f64 values
//!                  └──────────────────┘
//!                           │
//!                           ▼
//!                      aggregate      mean / variance / median
//! ```

pub mod aggregate;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use arrow::record_batch::RecordBatch;
use log::debug;
use serde::Serialize;

use crate::data::model::Dataset;
use crate::error::{Result, StatError};

/// All three statistics of one column, computed from a single extraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    /// Non-missing values that went into the statistics.
    pub count: usize,
    pub mean: f64,
    pub variance: f64,
    pub median: f64,
}

/// Computes column statistics over a borrowed table.
///
/// Unbound (never loaded, or loaded from an empty dataset) every query
/// returns `Ok(None)`. Bound, a query on an empty or unknown column name is
/// an error rather than a silent pass-through to the aggregate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatisticsEngine<'a> {
    table: Option<&'a RecordBatch>,
}

impl<'a> StatisticsEngine<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to `dataset`'s table, replacing any previous binding.
    pub fn load(&mut self, dataset: Option<&'a Dataset>) {
        self.table = dataset.and_then(Dataset::data);
        match self.table {
            Some(t) => debug!(
                "Statistics bound to table with {} rows x {} columns",
                t.num_rows(),
                t.num_columns()
            ),
            None => debug!("Statistics unbound: dataset has no table"),
        }
    }

    pub fn is_bound(&self) -> bool {
        self.table.is_some()
    }

    /// `true` iff a table is bound and has a column named `col`.
    pub fn validate(&self, col: &str) -> bool {
        matches!(self.checked_column(col), Ok(Some(_)))
    }

    /// The gate every query goes through. `Ok(None)` when unbound, an error
    /// for an empty or unknown name, otherwise the column itself.
    fn checked_column(&self, col: &str) -> Result<Option<&'a ArrayRef>> {
        let Some(table) = self.table else {
            return Ok(None);
        };
        if col.is_empty() {
            return Err(StatError::EmptyColumnName);
        }
        table
            .column_by_name(col)
            .map(Some)
            .ok_or_else(|| StatError::ColumnNotFound {
                column: col.to_string(),
            })
    }

    pub fn mean(&self, col: &str) -> Result<Option<f64>> {
        Ok(self.values(col)?.map(|v| aggregate::mean(&v)))
    }

    /// Sample variance (divisor `n - 1`).
    pub fn variance(&self, col: &str) -> Result<Option<f64>> {
        Ok(self.values(col)?.map(|v| aggregate::variance(&v)))
    }

    pub fn median(&self, col: &str) -> Result<Option<f64>> {
        Ok(self.values(col)?.map(|v| aggregate::median(&v)))
    }

    pub fn describe(&self, col: &str) -> Result<Option<ColumnSummary>> {
        Ok(self.values(col)?.map(|v| ColumnSummary {
            column: col.to_string(),
            count: v.len(),
            mean: aggregate::mean(&v),
            variance: aggregate::variance(&v),
            median: aggregate::median(&v),
        }))
    }

    /// Non-missing values of `col` widened to `f64`. Nulls and NaNs are
    /// skipped.
    fn values(&self, col: &str) -> Result<Option<Vec<f64>>> {
        let Some(column) = self.checked_column(col)? else {
            return Ok(None);
        };

        let data_type = column.data_type();
        if !(data_type.is_numeric() || *data_type == DataType::Boolean) {
            return Err(StatError::NonNumericColumn {
                column: col.to_string(),
                data_type: data_type.clone(),
            });
        }

        let widened = cast(column, &DataType::Float64)?;
        let values = widened
            .as_primitive::<Float64Type>()
            .iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .collect();
        Ok(Some(values))
    }
}
