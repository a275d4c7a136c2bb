use std::collections::HashSet;
use std::path::Path;

use arrow::record_batch::RecordBatch;
use calamine::{open_workbook_auto, Data, Reader};
use log::debug;
use serde_json::{Map, Value as JsonValue};

use super::file::FileExtension;
use super::model::{build_table, Cell};
use crate::config::ReadOptions;
use crate::error::{Result, StatError};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Parse `path` into a table, choosing the reader by extension tag.
///
/// * `.csv` / `.txt` – delimited text with a header row
/// * `.xlsx` / `.xls` – first (or configured) worksheet, header in row 1
/// * `.json` – records array or column-oriented object
pub fn read_table(path: &Path, ext: FileExtension, options: &ReadOptions) -> Result<RecordBatch> {
    debug!("Reading {} as {ext}", path.display());
    match ext {
        FileExtension::Csv | FileExtension::Txt => load_csv(path, options),
        FileExtension::Excel | FileExtension::ExcelOld => load_excel(path, options),
        FileExtension::Json => load_json(path),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Header row with column names, one record per line. A file without a
/// header and ragged rows are errors; missing-value tokens become nulls.
fn load_csv(path: &Path, options: &ReadOptions) -> Result<RecordBatch> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    if headers.is_empty() {
        return Err(StatError::malformed("no columns to parse from file"));
    }

    let mut columns: Vec<Vec<Cell>> = vec![Vec::new(); headers.len()];
    let mut n_rows = 0;

    for result in reader.records() {
        let record = result?;
        for (col, value) in columns.iter_mut().zip(record.iter()) {
            let cell = if options.is_null_token(value.trim()) {
                Cell::Null
            } else {
                Cell::guess(value)
            };
            col.push(cell);
        }
        n_rows += 1;
    }

    build_table(headers, columns, n_rows)
}

// ---------------------------------------------------------------------------
// Excel loader
// ---------------------------------------------------------------------------

fn load_excel(path: &Path, options: &ReadOptions) -> Result<RecordBatch> {
    let mut workbook = open_workbook_auto(path)?;
    let range = match &options.sheet {
        Some(name) => workbook.worksheet_range(name)?,
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| StatError::malformed("workbook has no worksheets"))??,
    };

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return build_table(Vec::new(), Vec::new(), 0);
    };
    let headers: Vec<String> = header_row
        .iter()
        .map(|c| match c {
            Data::String(s) => s.clone(),
            Data::Empty => String::new(),
            other => other.to_string(),
        })
        .collect();

    let mut columns: Vec<Vec<Cell>> = vec![Vec::new(); headers.len()];
    let mut n_rows = 0;
    for row in rows {
        for (idx, col) in columns.iter_mut().enumerate() {
            col.push(row.get(idx).map(excel_to_cell).unwrap_or(Cell::Null));
        }
        n_rows += 1;
    }

    build_table(headers, columns, n_rows)
}

fn excel_to_cell(val: &Data) -> Cell {
    match val {
        Data::Int(i) => Cell::Integer(*i),
        Data::Float(f) => Cell::Float(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) => Cell::Text(s.clone()),
        Data::Empty | Data::Error(_) => Cell::Null,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Accepted layouts:
///
/// ```json
/// [{ "name": "A", "math_score": 70 }, { "name": "B", "math_score": 80 }]
/// { "name": { "0": "A", "1": "B" }, "math_score": { "0": 70, "1": 80 } }
/// { "name": ["A", "B"], "math_score": [70, 80] }
/// ```
fn load_json(path: &Path) -> Result<RecordBatch> {
    let text = std::fs::read_to_string(path)?;
    let root: JsonValue = serde_json::from_str(&text)?;

    match root {
        JsonValue::Array(records) => load_json_records(&records),
        JsonValue::Object(columns) => load_json_columns(&columns),
        _ => Err(StatError::malformed(
            "expected a JSON array of records or an object of columns",
        )),
    }
}

fn load_json_records(records: &[JsonValue]) -> Result<RecordBatch> {
    let mut objects = Vec::with_capacity(records.len());
    let mut headers: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| StatError::malformed(format!("row {i} is not a JSON object")))?;
        for key in obj.keys() {
            if seen.insert(key.as_str()) {
                headers.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let columns = headers
        .iter()
        .map(|h| {
            objects
                .iter()
                .map(|obj| obj.get(h).map(json_to_cell).unwrap_or(Cell::Null))
                .collect()
        })
        .collect();

    build_table(headers, columns, objects.len())
}

fn load_json_columns(map: &Map<String, JsonValue>) -> Result<RecordBatch> {
    let headers: Vec<String> = map.keys().cloned().collect();

    if map.values().all(JsonValue::is_array) {
        let arrays: Vec<&Vec<JsonValue>> = map.values().filter_map(JsonValue::as_array).collect();
        let n_rows = arrays.first().map_or(0, |a| a.len());
        if arrays.iter().any(|a| a.len() != n_rows) {
            return Err(StatError::malformed("all arrays must be of the same length"));
        }
        let columns = arrays
            .into_iter()
            .map(|vals| vals.iter().map(json_to_cell).collect())
            .collect();
        return build_table(headers, columns, n_rows);
    }

    if map.values().all(JsonValue::is_object) {
        // Row order follows the first appearance of each index key.
        let mut index: Vec<&str> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for col in map.values().filter_map(JsonValue::as_object) {
            for key in col.keys() {
                if seen.insert(key.as_str()) {
                    index.push(key.as_str());
                }
            }
        }
        let columns = map
            .values()
            .filter_map(JsonValue::as_object)
            .map(|col| {
                index
                    .iter()
                    .map(|key| col.get(*key).map(json_to_cell).unwrap_or(Cell::Null))
                    .collect()
            })
            .collect();
        return build_table(headers, columns, index.len());
    }

    Err(StatError::malformed(
        "JSON object values must be all arrays or all objects",
    ))
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) => Cell::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Cell::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Cell::Float(f)
            } else {
                Cell::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => Cell::Bool(*b),
        JsonValue::Null => Cell::Null,
        other => Cell::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, AsArray};
    use arrow::datatypes::{DataType, Float64Type, Int64Type};

    fn write(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn csv_types_and_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "s.csv",
            "name,math_score,ratio\nA,70,0.5\nB,,NA\nC,90,1.5\n",
        );
        let table = read_table(&path, FileExtension::Csv, &ReadOptions::default()).unwrap();

        assert_eq!(table.num_rows(), 3);
        let schema = table.schema();
        assert_eq!(schema.field(0).data_type(), &DataType::Utf8);
        assert_eq!(schema.field(1).data_type(), &DataType::Int64);
        assert_eq!(schema.field(2).data_type(), &DataType::Float64);

        let scores = table.column(1).as_primitive::<Int64Type>();
        assert!(scores.is_null(1));
        assert_eq!(scores.value(2), 90);
        assert!(table.column(2).as_primitive::<Float64Type>().is_null(1));
    }

    #[test]
    fn txt_reads_as_csv_with_custom_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "s.txt", "x;y\n1;2\n3;4\n");
        let options = ReadOptions {
            delimiter: b';',
            ..Default::default()
        };
        let table = read_table(&path, FileExtension::Txt, &options).unwrap();
        assert_eq!(table.num_columns(), 2);
        assert_eq!(table.num_rows(), 2);
    }

    #[test]
    fn ragged_csv_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "bad.csv", "a,b\n1,2\n3\n");
        let err = read_table(&path, FileExtension::Csv, &ReadOptions::default()).unwrap_err();
        assert!(matches!(err, StatError::Csv(_)));
    }

    #[test]
    fn empty_csv_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "empty.csv", "");
        let err = read_table(&path, FileExtension::Csv, &ReadOptions::default()).unwrap_err();
        assert!(matches!(err, StatError::Malformed { .. }));
        assert_eq!(err.to_string(), "Malformed table: no columns to parse from file");
    }

    #[test]
    fn header_only_csv_has_no_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "header.csv", "math_score\n");
        let table = read_table(&path, FileExtension::Csv, &ReadOptions::default()).unwrap();
        assert_eq!(table.num_columns(), 1);
        assert_eq!(table.num_rows(), 0);
    }

    #[test]
    fn json_records_union_of_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "r.json",
            r#"[{"a": 1, "b": 2.5}, {"a": 3, "c": "x"}]"#,
        );
        let table = read_table(&path, FileExtension::Json, &ReadOptions::default()).unwrap();
        let schema = table.schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert!(table.column(1).is_null(1));
        assert!(table.column(2).is_null(0));
    }

    #[test]
    fn json_column_objects_follow_index_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "c.json",
            r#"{"math_score": {"0": 70, "1": 80, "2": 90}, "name": {"0": "A", "2": "C"}}"#,
        );
        let table = read_table(&path, FileExtension::Json, &ReadOptions::default()).unwrap();
        assert_eq!(table.num_rows(), 3);
        assert_eq!(table.schema().field(0).name(), "math_score");
        assert_eq!(table.column(0).as_primitive::<Int64Type>().value(2), 90);
        assert!(table.column(1).is_null(1));
    }

    #[test]
    fn json_column_arrays() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "l.json", r#"{"x": [1, 2, 3], "y": [1.5, null, 2.5]}"#);
        let table = read_table(&path, FileExtension::Json, &ReadOptions::default()).unwrap();
        assert_eq!(table.num_rows(), 3);
        assert!(table.column(1).is_null(1));
    }

    #[test]
    fn json_column_arrays_of_unequal_length_are_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "r.json", r#"{"x": [1, 2, 3], "y": [1]}"#);
        let err = read_table(&path, FileExtension::Json, &ReadOptions::default()).unwrap_err();
        assert!(matches!(err, StatError::Malformed { .. }));
    }

    #[test]
    fn json_scalar_root_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "n.json", "42");
        let err = read_table(&path, FileExtension::Json, &ReadOptions::default()).unwrap_err();
        assert!(matches!(err, StatError::Malformed { .. }));
    }

    #[test]
    fn invalid_json_propagates_parser_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "bad.json", "[{\"a\": 1,");
        let err = read_table(&path, FileExtension::Json, &ReadOptions::default()).unwrap_err();
        assert!(matches!(err, StatError::Json(_)));
    }

    fn write_scores_workbook(path: &Path) {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let scores = workbook.add_worksheet();
        scores.set_name("Scores").unwrap();
        scores.write_string(0, 0, "name").unwrap();
        scores.write_string(0, 1, "math_score").unwrap();
        for (row, (name, score)) in [("A", 70), ("B", 80), ("C", 90)].into_iter().enumerate() {
            let row = row as u32 + 1;
            scores.write_string(row, 0, name).unwrap();
            scores.write_number(row, 1, score).unwrap();
        }
        // Row 4 has no score: read back as an empty cell.
        scores.write_string(4, 0, "D").unwrap();

        let blank = workbook.add_worksheet();
        blank.set_name("Blank").unwrap();
        workbook.save(path).unwrap();
    }

    #[test]
    fn workbook_first_sheet_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.xlsx");
        write_scores_workbook(&path);

        let table = read_table(&path, FileExtension::Excel, &ReadOptions::default()).unwrap();
        assert_eq!(table.num_rows(), 4);
        let schema = table.schema();
        assert_eq!(schema.field(0).name(), "name");
        assert_eq!(schema.field(0).data_type(), &DataType::Utf8);
        assert_eq!(schema.field(1).name(), "math_score");
        assert_eq!(schema.field(1).data_type(), &DataType::Float64);

        let scores = table.column(1).as_primitive::<Float64Type>();
        assert_eq!(scores.value(0), 70.0);
        assert_eq!(scores.value(2), 90.0);
        assert!(scores.is_null(3));
    }

    #[test]
    fn workbook_named_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.xlsx");
        write_scores_workbook(&path);

        let scores = ReadOptions {
            sheet: Some("Scores".to_string()),
            ..Default::default()
        };
        let table = read_table(&path, FileExtension::Excel, &scores).unwrap();
        assert_eq!(table.num_columns(), 2);

        let blank = ReadOptions {
            sheet: Some("Blank".to_string()),
            ..Default::default()
        };
        let table = read_table(&path, FileExtension::Excel, &blank).unwrap();
        assert_eq!(table.num_columns(), 0);
        assert_eq!(table.num_rows(), 0);
    }

    #[test]
    fn workbook_missing_sheet_is_an_excel_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.xlsx");
        write_scores_workbook(&path);

        let options = ReadOptions {
            sheet: Some("Physics".to_string()),
            ..Default::default()
        };
        let err = read_table(&path, FileExtension::Excel, &options).unwrap_err();
        assert!(matches!(err, StatError::Excel(_)));
    }

    #[test]
    fn xls_goes_to_the_legacy_reader() {
        // An OOXML package under a .xls name is rejected by the BIFF reader.
        let dir = tempfile::tempdir().unwrap();
        let xlsx = dir.path().join("scores.xlsx");
        write_scores_workbook(&xlsx);
        let xls = dir.path().join("scores.xls");
        std::fs::copy(&xlsx, &xls).unwrap();

        let err = read_table(&xls, FileExtension::ExcelOld, &ReadOptions::default()).unwrap_err();
        assert!(matches!(err, StatError::Excel(calamine::Error::Xls(_))));
    }

    #[test]
    fn excel_cells() {
        assert_eq!(excel_to_cell(&Data::Int(3)), Cell::Integer(3));
        assert_eq!(excel_to_cell(&Data::Float(2.5)), Cell::Float(2.5));
        assert_eq!(excel_to_cell(&Data::Bool(true)), Cell::Bool(true));
        assert_eq!(excel_to_cell(&Data::Empty), Cell::Null);
        assert_eq!(
            excel_to_cell(&Data::Error(calamine::CellErrorType::Div0)),
            Cell::Null
        );
    }

    #[test]
    fn corrupt_workbook_is_an_excel_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "bad.xlsx", "definitely not a zip archive");
        let err = read_table(&path, FileExtension::Excel, &ReadOptions::default()).unwrap_err();
        assert!(matches!(err, StatError::Excel(_)));
    }
}
