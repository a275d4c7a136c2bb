use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use log::debug;

use super::file::FileHandle;
use super::loader;
use crate::config::ReadOptions;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Cell – one parsed value before it lands in an Arrow column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as produced by the format readers.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Null => Ok(()),
        }
    }
}

impl Cell {
    /// Read a text field the way pandas would: integers, then floats, then
    /// booleans, falling back to text.
    pub fn guess(s: &str) -> Cell {
        let trimmed = s.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Cell::Integer(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return Cell::Float(f);
        }
        match trimmed {
            "true" | "True" | "TRUE" => Cell::Bool(true),
            "false" | "False" | "FALSE" => Cell::Bool(false),
            _ => Cell::Text(s.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Column typing
// ---------------------------------------------------------------------------

/// Narrowest Arrow type that holds every non-null cell of a column.
/// A column without any value is Float64 (all nulls).
fn infer_type(cells: &[Cell]) -> DataType {
    let mut ints = false;
    let mut floats = false;
    let mut bools = false;
    let mut text = false;
    for cell in cells {
        match cell {
            Cell::Integer(_) => ints = true,
            Cell::Float(_) => floats = true,
            Cell::Bool(_) => bools = true,
            Cell::Text(_) => text = true,
            Cell::Null => {}
        }
    }
    if text || (bools && (ints || floats)) {
        DataType::Utf8
    } else if bools {
        DataType::Boolean
    } else if ints && !floats {
        DataType::Int64
    } else {
        DataType::Float64
    }
}

fn build_column(cells: Vec<Cell>, data_type: &DataType) -> ArrayRef {
    match data_type {
        DataType::Int64 => Arc::new(Int64Array::from(
            cells
                .into_iter()
                .map(|c| match c {
                    Cell::Integer(i) => Some(i),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        DataType::Boolean => Arc::new(BooleanArray::from(
            cells
                .into_iter()
                .map(|c| match c {
                    Cell::Bool(b) => Some(b),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        DataType::Utf8 => Arc::new(StringArray::from(
            cells
                .into_iter()
                .map(|c| match c {
                    Cell::Null => None,
                    Cell::Text(s) => Some(s),
                    other => Some(other.to_string()),
                })
                .collect::<Vec<_>>(),
        )),
        _ => Arc::new(Float64Array::from(
            cells
                .into_iter()
                .map(|c| match c {
                    Cell::Integer(i) => Some(i as f64),
                    Cell::Float(f) => Some(f),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
    }
}

/// Assemble named, column-major cells into a single record batch.
///
/// Empty header names become `column_<n>` (1-based); repeated names get a
/// `.1`, `.2`, ... suffix. Every column must have `n_rows` cells.
pub fn build_table(headers: Vec<String>, columns: Vec<Vec<Cell>>, n_rows: usize) -> Result<RecordBatch> {
    let mut fields = Vec::with_capacity(headers.len());
    let mut arrays = Vec::with_capacity(headers.len());

    for (name, cells) in unique_names(headers).into_iter().zip(columns) {
        let data_type = infer_type(&cells);
        arrays.push(build_column(cells, &data_type));
        fields.push(Field::new(name, data_type, true));
    }

    let options = RecordBatchOptions::new().with_row_count(Some(n_rows));
    let batch = RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), arrays, &options)?;
    Ok(batch)
}

fn unique_names(headers: Vec<String>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(headers.len());

    for (idx, name) in headers.into_iter().enumerate() {
        let base = if name.is_empty() {
            format!("column_{}", idx + 1)
        } else {
            name
        };
        let mut name = base.clone();
        let count = counts.entry(base.clone()).or_insert(0);
        while used.contains(&name) {
            *count += 1;
            name = format!("{base}.{count}");
        }
        used.insert(name.clone());
        names.push(name);
    }
    names
}

// ---------------------------------------------------------------------------
// Dataset – the loaded table
// ---------------------------------------------------------------------------

/// Owns the table read from one file. Empty until [`Dataset::load`] succeeds
/// on a file with a recognised extension.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    table: Option<RecordBatch>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load with default [`ReadOptions`].
    pub fn load(&mut self, handle: &FileHandle) -> Result<()> {
        self.load_with(handle, &ReadOptions::default())
    }

    /// Dispatch on the handle's extension tag and keep the parsed table.
    ///
    /// An unrecognised extension leaves the dataset untouched. Parse
    /// failures are returned unchanged.
    pub fn load_with(&mut self, handle: &FileHandle, options: &ReadOptions) -> Result<()> {
        let Some(ext) = handle.suffix() else {
            debug!(
                "{}: unsupported file extension, no table loaded",
                handle.path().display()
            );
            return Ok(());
        };

        let table = loader::read_table(handle.path(), ext, options)?;
        debug!(
            "Loaded {} rows x {} columns from {}",
            table.num_rows(),
            table.num_columns(),
            handle.path().display()
        );
        self.table = Some(table);
        Ok(())
    }

    /// The loaded table, or `None` when nothing has been loaded.
    pub fn data(&self) -> Option<&RecordBatch> {
        self.table.as_ref()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.table
            .as_ref()
            .map(|t| t.schema_ref().fields().iter().map(|f| f.name().as_str()).collect())
            .unwrap_or_default()
    }
}

impl From<RecordBatch> for Dataset {
    fn from(table: RecordBatch) -> Self {
        Self { table: Some(table) }
    }
}
