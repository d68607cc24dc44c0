//! CSV data source.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sources::DataSource;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Options for CSV parsing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// Field delimiter (default: comma)
    pub delimiter: u8,
    /// Quote character (default: double quote)
    pub quote: u8,
    /// Whether to trim whitespace from fields
    pub trim: bool,
    /// Whether to allow records with differing field counts
    pub flexible: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            trim: true,
            flexible: true,
        }
    }
}

impl CsvOptions {
    /// Create options for tab-separated values (TSV)
    pub fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            ..Default::default()
        }
    }

    /// Create options for semicolon-separated values (common in European locales)
    pub fn semicolon() -> Self {
        Self {
            delimiter: b';',
            ..Default::default()
        }
    }
}

/// CSV data held in memory
pub struct CsvSource<'a> {
    bytes: &'a [u8],
    options: CsvOptions,
}

impl<'a> CsvSource<'a> {
    /// Create a CSV source with default options
    pub fn new(bytes: &'a [u8]) -> Self {
        Self::with_options(bytes, CsvOptions::default())
    }

    /// Create a CSV source with custom options
    pub fn with_options(bytes: &'a [u8], options: CsvOptions) -> Self {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        Self { bytes, options }
    }
}

impl DataSource for CsvSource<'_> {
    fn read_records(&self) -> Result<Vec<Vec<String>>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            .has_headers(false) // the header row is handled by Dataset
            .trim(if self.options.trim {
                csv::Trim::All
            } else {
                csv::Trim::None
            })
            .flexible(self.options.flexible)
            .from_reader(self.bytes);

        let mut result = Vec::new();
        for record in reader.records() {
            let record = record?;
            result.push(record.iter().map(str::to_string).collect());
        }

        Ok(result)
    }
}
