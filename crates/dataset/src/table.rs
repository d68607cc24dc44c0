//! In-memory table: column names plus ordered row records.

use std::collections::HashSet;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

use crate::error::{DataError, Result};
use crate::sources::{CsvOptions, CsvSource, DataSource, SourceFormat, WorkbookSource};

/// One data record: column name to cell text, in column order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataRow {
    cells: Vec<(String, String)>,
}

impl DataRow {
    /// Build a row from ordered `(column, value)` pairs
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        pairs.into_iter().collect()
    }

    /// Cell text for a column, `None` if the row has no such column
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Iterate over `(column, value)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DataRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Serialize for DataRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (key, value) in &self.cells {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Parsed tabular data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<DataRow>,
}

impl Dataset {
    /// Parse an uploaded file, detecting CSV or workbook from its bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match SourceFormat::sniff(bytes) {
            SourceFormat::Csv => Self::from_csv(bytes, CsvOptions::default()),
            SourceFormat::Workbook => Self::from_workbook(bytes),
        }
    }

    /// Parse delimited text
    pub fn from_csv(bytes: &[u8], options: CsvOptions) -> Result<Self> {
        let records = CsvSource::with_options(bytes, options).read_records()?;
        Self::from_records(records)
    }

    /// Parse the first sheet of a workbook
    pub fn from_workbook(bytes: &[u8]) -> Result<Self> {
        let records = WorkbookSource::new(bytes).read_records()?;
        Self::from_records(records)
    }

    /// Build a dataset from raw records, the first one being the header row
    ///
    /// Blank headers become `Column<n>` (1-based position) and repeated
    /// headers get a `_<k>` suffix. Short rows are padded with empty cells,
    /// cells beyond the header are dropped, and rows whose cells are all
    /// blank are skipped.
    pub fn from_records(records: Vec<Vec<String>>) -> Result<Self> {
        let mut records = records.into_iter();
        let header = records.next().ok_or(DataError::Empty)?;
        if header.iter().all(|cell| cell.trim().is_empty()) {
            return Err(DataError::Empty);
        }

        let columns = normalize_headers(header);

        let mut skipped = 0usize;
        let rows: Vec<DataRow> = records
            .filter(|record| {
                let blank = record.iter().all(|cell| cell.trim().is_empty());
                skipped += usize::from(blank);
                !blank
            })
            .map(|mut record| -> DataRow {
                record.resize(columns.len(), String::new());
                columns.iter().cloned().zip(record).collect()
            })
            .collect();

        debug!(
            columns = columns.len(),
            rows = rows.len(),
            skipped,
            "parsed dataset"
        );

        Ok(Self { columns, rows })
    }

    /// Column names in header order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Data rows in file order
    pub fn rows(&self) -> &[DataRow] {
        &self.rows
    }

    /// Consume the dataset, returning its rows
    pub fn into_rows(self) -> Vec<DataRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn normalize_headers(header: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    header
        .into_iter()
        .enumerate()
        .map(|(index, name)| {
            let name = name.trim();
            let base = if name.is_empty() {
                format!("Column{}", index + 1)
            } else {
                name.to_string()
            };

            let mut candidate = base.clone();
            let mut suffix = 2;
            while !seen.insert(candidate.clone()) {
                candidate = format!("{base}_{suffix}");
                suffix += 1;
            }
            candidate
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn records(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_from_records() {
        let data = Dataset::from_records(records(&[
            &["Name", "Course"],
            &["Alice", "Rust"],
            &["Bob", "Go"],
        ]))
        .unwrap();

        assert_eq!(data.columns(), ["Name", "Course"]);
        assert_eq!(data.len(), 2);
        assert_eq!(data.rows()[0].get("Name"), Some("Alice"));
        assert_eq!(data.rows()[1].get("Course"), Some("Go"));
        assert_eq!(data.rows()[1].get("Missing"), None);
    }

    #[test]
    fn test_ragged_rows() {
        let data = Dataset::from_records(records(&[
            &["A", "B"],
            &["1"],
            &["1", "2", "3"],
        ]))
        .unwrap();

        assert_eq!(data.rows()[0].get("B"), Some(""));
        assert_eq!(data.rows()[1].len(), 2);
    }

    #[test]
    fn test_blank_and_duplicate_headers() {
        let data = Dataset::from_records(records(&[&["Name", "", "Name", "Name"], &["a", "b", "c", "d"]]))
            .unwrap();
        assert_eq!(data.columns(), ["Name", "Column2", "Name_2", "Name_3"]);
        assert_eq!(data.rows()[0].get("Name_3"), Some("d"));
    }

    #[test]
    fn test_blank_rows_skipped() {
        let data = Dataset::from_records(records(&[&["Name"], &["Alice"], &[""], &["  "]])).unwrap();
        assert_eq!(data.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(Dataset::from_records(vec![]), Err(DataError::Empty)));
        assert!(matches!(
            Dataset::from_records(records(&[&["", " "]])),
            Err(DataError::Empty)
        ));
    }

    #[test]
    fn test_header_only() {
        let data = Dataset::from_records(records(&[&["Name"]])).unwrap();
        assert!(data.is_empty());
        assert_eq!(data.columns(), ["Name"]);
    }

    #[test]
    fn test_row_serializes_in_column_order() {
        let row = DataRow::from_pairs([("Zed", "1"), ("Alpha", "2")]);
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"Zed":"1","Alpha":"2"}"#);
    }
}
