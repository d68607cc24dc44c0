//! # dataset
//!
//! Tabular data ingest for certforge - read an uploaded CSV file or
//! spreadsheet workbook into an ordered list of column names and an
//! ordered list of row records.
//!
//! ## Features
//!
//! - **CSV Support**: delimiter/quote/trim options via the `csv` crate
//! - **Workbook Support**: first sheet of `.xlsx`, `.xls`, `.ods` files via `calamine`
//! - **Stable shape**: header and row order are preserved, ragged rows are
//!   padded, blank or duplicate headers are renamed so every column is unique
//!
//! ## Example
//!
//! ```rust,ignore
//! use dataset::Dataset;
//!
//! let data = Dataset::from_bytes(&uploaded)?;
//! for row in data.rows() {
//!     println!("{:?}", row.get("Name"));
//! }
//! ```

pub mod error;
pub mod sources;

mod table;

pub use error::{DataError, Result};
pub use sources::{CsvOptions, SourceFormat};
pub use table::{DataRow, Dataset};
