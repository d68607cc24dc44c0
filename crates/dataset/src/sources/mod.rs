//! Data source implementations.
//!
//! Each source turns an uploaded byte buffer into raw records; the first
//! record is the header row.

pub mod csv;
pub mod workbook;

pub use self::csv::{CsvOptions, CsvSource};
pub use self::workbook::WorkbookSource;

use crate::error::Result;

/// Trait for sources that can provide tabular records
pub trait DataSource {
    /// Read every record, header row first
    fn read_records(&self) -> Result<Vec<Vec<String>>>;
}

/// Format of an uploaded data file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Delimited text
    Csv,
    /// Spreadsheet workbook (xlsx, xls, ods)
    Workbook,
}

impl SourceFormat {
    /// Guess the format from the leading bytes
    ///
    /// Zip containers (xlsx, ods) and OLE compound files (xls) are
    /// workbooks, anything else is treated as CSV.
    pub fn sniff(bytes: &[u8]) -> Self {
        const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
        const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

        if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
            SourceFormat::Workbook
        } else {
            SourceFormat::Csv
        }
    }
}
