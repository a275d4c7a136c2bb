/// Data layer: file handles, format readers, and the loaded table.
///
/// Architecture:
/// ```text
///  .csv / .txt / .xlsx / .xls / .json
///        │
///        ▼
///   ┌────────────┐
///   │ FileHandle │  exists? → extension tag
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → RecordBatch
///   └──────────┘
///        │
///        ▼
///   ┌─────────┐
///   │ Dataset │  owns the table, hands out &RecordBatch
///   └─────────┘
/// ```

pub mod file;
pub mod loader;
pub mod model;
