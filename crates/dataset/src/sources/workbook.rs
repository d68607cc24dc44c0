//! Spreadsheet workbook data source using calamine.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, ExcelDateTime, Range, Reader};
use chrono::NaiveTime;
use tracing::debug;

use crate::error::{DataError, Result};
use crate::sources::DataSource;

/// Workbook held in memory (xlsx, xls, xlsb or ods)
///
/// Only the first sheet is read.
pub struct WorkbookSource<'a> {
    bytes: &'a [u8],
}

impl<'a> WorkbookSource<'a> {
    /// Create a new workbook source over uploaded bytes
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Convert a calamine cell to a string
    fn cell_to_string(cell: &Data) -> String {
        match cell {
            Data::Empty => String::new(),
            Data::String(s) => s.clone(),
            Data::Int(i) => i.to_string(),
            Data::Float(f) => {
                // Whole numbers print without a trailing ".0"
                if f.fract() == 0.0 {
                    format!("{:.0}", f)
                } else {
                    f.to_string()
                }
            }
            Data::Bool(b) => b.to_string(),
            Data::Error(e) => {
                debug!(error = ?e, "error cell read as empty");
                String::new()
            }
            Data::DateTime(dt) => Self::datetime_to_string(dt),
            Data::DateTimeIso(s) => s.clone(),
            Data::DurationIso(s) => s.clone(),
        }
    }

    /// Format a date cell as `YYYY-MM-DD`, with the time only when it is set
    ///
    /// Durations print as `H:MM:SS`.
    fn datetime_to_string(dt: &ExcelDateTime) -> String {
        if dt.is_duration() {
            if let Some(duration) = dt.as_duration() {
                let secs = duration.num_seconds();
                return format!("{}:{:02}:{:02}", secs / 3600, secs % 3600 / 60, secs % 60);
            }
        } else if let Some(datetime) = dt.as_datetime() {
            let format = if datetime.time() == NaiveTime::MIN {
                "%Y-%m-%d"
            } else {
                "%Y-%m-%d %H:%M:%S"
            };
            return datetime.format(format).to_string();
        }

        debug!(serial = dt.as_f64(), "date cell out of range, keeping serial");
        dt.to_string()
    }

    /// Extract every row of a calamine Range
    fn extract_rows(sheet_range: &Range<Data>) -> Vec<Vec<String>> {
        sheet_range
            .rows()
            .map(|row| row.iter().map(Self::cell_to_string).collect())
            .collect()
    }
}

impl DataSource for WorkbookSource<'_> {
    fn read_records(&self) -> Result<Vec<Vec<String>>> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(self.bytes))?;

        if let Some(name) = workbook.sheet_names().first() {
            debug!(sheet = %name, "reading first sheet");
        }

        let sheet_range = workbook
            .worksheet_range_at(0)
            .ok_or(DataError::NoSheets)??;

        Ok(Self::extract_rows(&sheet_range))
    }
}
