//! CSV reading and writing.
//!
//! Rows decode to string-valued mappings keyed by the column headers.
//! Reading can produce a plain row sequence, a mapping keyed by a
//! designated column, or a grouped mapping from key-column value to all
//! rows sharing it. Writing accepts a flattening option for row groups
//! and a sort-column option for dated-entries style files.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use csv::ReaderBuilder;
use serde_json::{Map, Value};

use crate::error::{FileweaveError, Result};
use crate::expand::expand_path;

/// Shape of the value produced when reading a CSV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsvLayout {
    /// A sequence of row mappings, in file order.
    Rows,
    /// A mapping from key-column value to the row holding it. The last
    /// row wins when a key repeats.
    Keyed { column: String },
    /// A mapping from key-column value to all rows sharing it, in file
    /// order within each group.
    Grouped { column: String },
}

/// Options for writing a CSV file.
#[derive(Debug, Clone, Default)]
pub struct CsvWriteOptions {
    /// Merge a collection of row groups into one row sequence before
    /// writing.
    pub flatten: bool,
    /// Stable-sort rows by this column's value. The column becomes the
    /// first CSV field and the remaining fields are sorted
    /// alphabetically.
    pub sort_column: Option<String>,
}

impl CsvWriteOptions {
    /// Options for a file of dated entries: flattened row groups sorted
    /// by their `Date` column.
    pub fn dated() -> Self {
        Self {
            flatten: true,
            sort_column: Some("Date".to_string()),
        }
    }
}

/// Read a CSV file into the requested layout.
///
/// The path is expanded first; a missing file is
/// [`FileweaveError::MissingFile`].
pub fn read_csv(path: impl AsRef<str>, layout: &CsvLayout) -> Result<Value> {
    let full = expand_path(path.as_ref());
    if !full.exists() {
        return Err(FileweaveError::missing_file(full));
    }
    decode(&full, layout)
}

/// Write a CSV file from a sequence of rows or a mapping of rows, and
/// return the content unchanged.
///
/// With `flatten`, the content may instead hold collections of rows
/// (row groups), which are merged into one sequence first. Missing
/// parent directories are created before writing.
pub fn write_csv(
    path: impl AsRef<str>,
    content: Value,
    options: &CsvWriteOptions,
) -> Result<Value> {
    let full = expand_path(path.as_ref());
    super::create_parent_dirs(&full)?;
    encode(&full, &content, options)?;
    Ok(content)
}

/// Registry decoder: a plain row sequence.
pub(crate) fn read_default(path: &Path) -> Result<Value> {
    decode(path, &CsvLayout::Rows)
}

/// Registry encoder: rows as given, no flattening, no sorting.
pub(crate) fn write_default(path: &Path, content: &Value) -> Result<()> {
    encode(path, content, &CsvWriteOptions::default())
}

fn decode(path: &Path, layout: &CsvLayout) -> Result<Value> {
    let text = fs::read_to_string(path).map_err(|e| FileweaveError::file_read(path, e))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| FileweaveError::malformed(path, e))?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        // A row whose field count disagrees with the header is a
        // malformed record, surfaced here by the reader.
        let record = record.map_err(|e| FileweaveError::malformed(path, e))?;
        let mut row = Map::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            row.insert(header.to_string(), Value::String(cell.to_string()));
        }
        rows.push(Value::Object(row));
    }

    match layout {
        CsvLayout::Rows => Ok(Value::Array(rows)),
        CsvLayout::Keyed { column } => {
            let mut keyed = Map::new();
            for row in rows {
                let key = key_of(path, &row, column)?;
                keyed.insert(key, row);
            }
            Ok(Value::Object(keyed))
        }
        CsvLayout::Grouped { column } => {
            let mut grouped = Map::new();
            for row in rows {
                let key = key_of(path, &row, column)?;
                let group = grouped.entry(key).or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(members) = group {
                    members.push(row);
                }
            }
            Ok(Value::Object(grouped))
        }
    }
}

fn key_of(path: &Path, row: &Value, column: &str) -> Result<String> {
    row.get(column)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            FileweaveError::malformed(path, format!("row has no '{column}' column"))
        })
}

fn encode(path: &Path, content: &Value, options: &CsvWriteOptions) -> Result<()> {
    let mut rows = collect_rows(path, content, options.flatten)?;

    if let Some(column) = &options.sort_column {
        for row in &rows {
            if !row.contains_key(column) {
                return Err(FileweaveError::malformed(
                    path,
                    format!("cannot sort by missing '{column}' column"),
                ));
            }
        }
        // Vec::sort_by is stable, so equal keys keep their input order.
        rows.sort_by(|a, b| sort_key(a, column).cmp(&sort_key(b, column)));
    }

    let headers = header_fields(&rows, options.sort_column.as_deref());

    // Render every record before touching the file, so bad content
    // never leaves a half-written destination behind.
    let mut records = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut record = Vec::with_capacity(headers.len());
        for header in &headers {
            record.push(cell_text(path, row.get(header))?);
        }
        records.push(record);
    }

    let file = fs::File::create(path).map_err(|e| FileweaveError::file_write(path, e))?;
    let mut writer = csv::Writer::from_writer(file);
    if !records.is_empty() {
        writer
            .write_record(&headers)
            .map_err(|e| write_failure(path, e))?;
        for record in &records {
            writer.write_record(record).map_err(|e| write_failure(path, e))?;
        }
    }
    writer
        .flush()
        .map_err(|e| FileweaveError::file_write(path, e))?;
    Ok(())
}

/// Gather the rows to write: mapping values or sequence members, each a
/// row mapping, or (with `flatten`) a row group to merge.
fn collect_rows(path: &Path, content: &Value, flatten: bool) -> Result<Vec<Map<String, Value>>> {
    let members: Vec<&Value> = match content {
        Value::Array(members) => members.iter().collect(),
        Value::Object(mapping) => mapping.values().collect(),
        _ => {
            return Err(FileweaveError::malformed(
                path,
                "CSV content must be a sequence or a mapping of rows",
            ))
        }
    };

    let mut rows = Vec::new();
    for member in members {
        if flatten {
            let group = member.as_array().ok_or_else(|| {
                FileweaveError::malformed(path, "flatten expects each member to be a row group")
            })?;
            for row in group {
                rows.push(row_mapping(path, row)?);
            }
        } else {
            rows.push(row_mapping(path, member)?);
        }
    }
    Ok(rows)
}

fn row_mapping(path: &Path, row: &Value) -> Result<Map<String, Value>> {
    row.as_object().cloned().ok_or_else(|| {
        FileweaveError::malformed(path, "each CSV row must be a mapping of column to value")
    })
}

/// Header order: the sort column first (when given), remaining columns
/// sorted alphabetically.
fn header_fields(rows: &[Map<String, Value>], sort_column: Option<&str>) -> Vec<String> {
    let mut columns: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();
    let mut headers = Vec::with_capacity(columns.len());
    if let Some(column) = sort_column {
        columns.remove(column);
        headers.push(column.to_string());
    }
    headers.extend(columns.into_iter().map(str::to_string));
    headers
}

fn sort_key(row: &Map<String, Value>, column: &str) -> String {
    row.get(column).map(scalar_text).unwrap_or_default()
}

/// Cell rendering for scalar values; absent cells are empty.
fn cell_text(path: &Path, value: Option<&Value>) -> Result<String> {
    match value {
        None => Ok(String::new()),
        Some(value) if value.is_array() || value.is_object() => Err(FileweaveError::malformed(
            path,
            format!("CSV cells must be scalar, got {value}"),
        )),
        Some(value) => Ok(scalar_text(value)),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn write_failure(path: &Path, error: csv::Error) -> FileweaveError {
    FileweaveError::file_write(path, std::io::Error::other(error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_fixture(dir: &TempDir, name: &str, text: &str) -> String {
        let path = dir.path().join(name);
        fs::write(&path, text).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_read_rows_layout() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_fixture(
            &temp_dir,
            "entries.csv",
            "Date,Amount\n2024-01-01,3.00\n2024-01-02,4.00\n",
        );

        let value = read_csv(&path, &CsvLayout::Rows).unwrap();

        assert_eq!(
            value,
            json!([
                {"Date": "2024-01-01", "Amount": "3.00"},
                {"Date": "2024-01-02", "Amount": "4.00"},
            ])
        );
    }

    #[test]
    fn test_read_keyed_layout_last_row_wins() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_fixture(
            &temp_dir,
            "entries.csv",
            "Date,Amount\n2024-01-01,3.00\n2024-01-01,9.00\n2024-01-02,4.00\n",
        );

        let value = read_csv(
            &path,
            &CsvLayout::Keyed {
                column: "Date".to_string(),
            },
        )
        .unwrap();

        assert_eq!(
            value,
            json!({
                "2024-01-01": {"Date": "2024-01-01", "Amount": "9.00"},
                "2024-01-02": {"Date": "2024-01-02", "Amount": "4.00"},
            })
        );
    }

    #[test]
    fn test_read_grouped_layout() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_fixture(
            &temp_dir,
            "entries.csv",
            "Date,Amount\n2024-01-01,3.00\n2024-01-01,9.00\n2024-01-02,4.00\n",
        );

        let value = read_csv(
            &path,
            &CsvLayout::Grouped {
                column: "Date".to_string(),
            },
        )
        .unwrap();

        assert_eq!(
            value,
            json!({
                "2024-01-01": [
                    {"Date": "2024-01-01", "Amount": "3.00"},
                    {"Date": "2024-01-01", "Amount": "9.00"},
                ],
                "2024-01-02": [
                    {"Date": "2024-01-02", "Amount": "4.00"},
                ],
            })
        );
    }

    #[test]
    fn test_missing_key_column_is_malformed() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_fixture(&temp_dir, "entries.csv", "Amount\n3.00\n");

        let error = read_csv(
            &path,
            &CsvLayout::Keyed {
                column: "Date".to_string(),
            },
        )
        .unwrap_err();

        match error {
            FileweaveError::MalformedContent { detail, .. } => {
                assert!(detail.contains("'Date'"));
            }
            other => panic!("expected MalformedContent, got {other:?}"),
        }
    }

    #[test]
    fn test_ragged_row_is_malformed() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_fixture(&temp_dir, "entries.csv", "Date,Amount\n2024-01-01\n");

        let error = read_csv(&path, &CsvLayout::Rows).unwrap_err();
        assert!(matches!(error, FileweaveError::MalformedContent { .. }));
    }

    #[test]
    fn test_write_sorted_by_date_puts_date_first() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.csv");
        let content = json!([
            {"Amount": "4.00", "Date": "2024-01-03", "Payee": "grocer"},
            {"Amount": "1.00", "Date": "2024-01-01", "Payee": "cafe"},
            {"Amount": "2.50", "Date": "2024-01-02", "Payee": "bakery"},
        ]);

        write_csv(
            path.to_str().unwrap(),
            content,
            &CsvWriteOptions {
                flatten: false,
                sort_column: Some("Date".to_string()),
            },
        )
        .unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Date,Amount,Payee",
                "2024-01-01,1.00,cafe",
                "2024-01-02,2.50,bakery",
                "2024-01-03,4.00,grocer",
            ]
        );
    }

    #[test]
    fn test_write_flattens_row_groups() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.csv");
        let content = json!({
            "2024-01-02": [{"Date": "2024-01-02", "Amount": "4.00"}],
            "2024-01-01": [
                {"Date": "2024-01-01", "Amount": "1.00"},
                {"Date": "2024-01-01", "Amount": "2.00"},
            ],
        });

        write_csv(path.to_str().unwrap(), content, &CsvWriteOptions::dated()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Date,Amount",
                "2024-01-01,1.00",
                "2024-01-01,2.00",
                "2024-01-02,4.00",
            ]
        );
    }

    #[test]
    fn test_write_stable_sort_keeps_input_order_for_ties() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.csv");
        let content = json!([
            {"Date": "2024-01-01", "Payee": "first"},
            {"Date": "2024-01-01", "Payee": "second"},
        ]);

        write_csv(
            path.to_str().unwrap(),
            content,
            &CsvWriteOptions {
                flatten: false,
                sort_column: Some("Date".to_string()),
            },
        )
        .unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            vec!["Date,Payee", "2024-01-01,first", "2024-01-01,second"]
        );
    }

    #[test]
    fn test_scalar_cells_render_and_null_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.csv");
        let content = json!([
            {"Count": 3, "Open": true, "Note": Value::Null},
        ]);

        write_csv(path.to_str().unwrap(), content, &CsvWriteOptions::default()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            vec!["Count,Note,Open", "3,,true"]
        );
    }

    #[test]
    fn test_non_scalar_cell_is_malformed_and_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.csv");
        let content = json!([
            {"Date": "2024-01-01", "Tags": ["a", "b"]},
        ]);

        let error =
            write_csv(path.to_str().unwrap(), content, &CsvWriteOptions::default()).unwrap_err();

        assert!(matches!(error, FileweaveError::MalformedContent { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_zero_rows_writes_an_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.csv");

        write_csv(path.to_str().unwrap(), json!([]), &CsvWriteOptions::default()).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
