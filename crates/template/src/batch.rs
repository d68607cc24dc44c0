//! Batch generation: one rendered document per data row

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dataset::DataRow;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::archive::{package_archive, NamedOutput};
use crate::coords::CoordinateTransformer;
use crate::renderer::TemplateRenderer;
use crate::schema::Field;
use crate::source::PdfTemplate;
use crate::{ConfigurationError, Result, TemplateError};

/// How output files are named: `<prefix>_<n>.<extension>`, `n` 1-based
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputNaming {
    pub prefix: String,
    pub extension: String,
}

impl Default for OutputNaming {
    fn default() -> Self {
        Self {
            prefix: "certificate".to_string(),
            extension: "pdf".to_string(),
        }
    }
}

impl OutputNaming {
    /// File name for a 0-based row index
    pub fn file_name(&self, row_index: usize) -> String {
        format!("{}_{}.{}", self.prefix, row_index + 1, self.extension)
    }
}

/// Validated inputs for a batch run
#[derive(Debug, Clone)]
pub struct BatchGenerator {
    template: PdfTemplate,
    fields: Vec<Field>,
    rows: Vec<DataRow>,
    scale_ratio: f64,
    naming: OutputNaming,
}

impl BatchGenerator {
    /// Check that a batch can run
    ///
    /// Fails up front, before any row is rendered, when the template is
    /// missing, there are no fields or rows, or the scale is unmeasured.
    pub fn new(
        template: Option<PdfTemplate>,
        fields: Vec<Field>,
        rows: Vec<DataRow>,
        scale_ratio: f64,
    ) -> Result<Self> {
        let template = template.ok_or(ConfigurationError::MissingTemplate)?;
        if fields.is_empty() {
            return Err(ConfigurationError::NoFields.into());
        }
        if rows.is_empty() {
            return Err(ConfigurationError::NoRows.into());
        }
        if !CoordinateTransformer::new(scale_ratio, template.page_height()).is_ready() {
            return Err(ConfigurationError::ScaleNotMeasured.into());
        }

        Ok(Self {
            template,
            fields,
            rows,
            scale_ratio,
            naming: OutputNaming::default(),
        })
    }

    /// Use a different output naming scheme
    pub fn with_naming(mut self, naming: OutputNaming) -> Self {
        self.naming = naming;
        self
    }

    /// Start the run
    pub fn run(self) -> BatchRun {
        info!(
            rows = self.rows.len(),
            fields = self.fields.len(),
            "batch started"
        );
        BatchRun {
            generator: self,
            next_row: 0,
            cancel: None,
            cancelled: false,
        }
    }
}

/// Result for one row
#[derive(Debug)]
pub struct RowOutcome {
    /// 0-based position in the dataset
    pub row_index: usize,
    pub file_name: String,
    pub result: Result<Vec<u8>>,
}

/// A row that failed to render
#[derive(Debug)]
pub struct RowFailure {
    pub row_index: usize,
    pub file_name: String,
    pub error: TemplateError,
}

/// Lazy batch: each call to `next` renders one row
///
/// Rows come out in dataset order. A cancelled or exhausted run stays
/// finished; start a new batch to run again.
pub struct BatchRun {
    generator: BatchGenerator,
    next_row: usize,
    cancel: Option<Arc<AtomicBool>>,
    cancelled: bool,
}

impl BatchRun {
    /// Stop before the next row once `flag` is set
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Number of rows in the batch
    pub fn total(&self) -> usize {
        self.generator.rows.len()
    }

    /// Rows processed so far
    pub fn completed(&self) -> usize {
        self.next_row
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Drain the run into an aggregate report
    pub fn collect_report(self) -> BatchReport {
        self.collect_report_with(|_, _| {})
    }

    /// Drain the run, calling `on_progress(done, total)` after each row
    pub fn collect_report_with<F>(mut self, mut on_progress: F) -> BatchReport
    where
        F: FnMut(usize, usize),
    {
        let total = self.total();
        let mut outputs = Vec::new();
        let mut failures = Vec::new();

        while let Some(outcome) = self.next() {
            match outcome.result {
                Ok(bytes) => outputs.push(NamedOutput {
                    name: outcome.file_name,
                    bytes,
                }),
                Err(error) => failures.push(RowFailure {
                    row_index: outcome.row_index,
                    file_name: outcome.file_name,
                    error,
                }),
            }
            on_progress(self.completed(), total);
        }

        let report = BatchReport {
            outputs,
            failures,
            cancelled: self.cancelled,
        };
        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            cancelled = report.cancelled,
            "batch finished"
        );
        report
    }

    fn cancel_requested(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

impl Iterator for BatchRun {
    type Item = RowOutcome;

    fn next(&mut self) -> Option<RowOutcome> {
        if self.cancelled || self.next_row >= self.generator.rows.len() {
            return None;
        }
        if self.cancel_requested() {
            info!(completed = self.next_row, "batch cancelled");
            self.cancelled = true;
            return None;
        }

        let row_index = self.next_row;
        self.next_row += 1;

        let generator = &self.generator;
        let file_name = generator.naming.file_name(row_index);
        let renderer = TemplateRenderer::new(&generator.fields, generator.scale_ratio);

        let result = renderer
            .render(generator.template.bytes(), &generator.rows[row_index])
            .map_err(|e| TemplateError::RowRender {
                row: row_index,
                reason: e.to_string(),
            });

        match &result {
            Ok(bytes) => debug!(row = row_index, file = %file_name, size = bytes.len(), "row rendered"),
            Err(e) => warn!(row = row_index, error = %e, "row failed"),
        }

        Some(RowOutcome {
            row_index,
            file_name,
            result,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.cancelled {
            0
        } else {
            self.generator.rows.len() - self.next_row
        };
        (0, Some(remaining))
    }
}

/// Aggregate outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Successful documents in row order
    pub outputs: Vec<NamedOutput>,
    /// Failed rows in row order
    pub failures: Vec<RowFailure>,
    /// Whether the run stopped early
    pub cancelled: bool,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outputs.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Zip every successful output
    pub fn to_archive(&self) -> Result<Vec<u8>> {
        package_archive(&self.outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_naming() {
        let naming = OutputNaming::default();
        assert_eq!(naming.file_name(0), "certificate_1.pdf");
        assert_eq!(naming.file_name(41), "certificate_42.pdf");

        let custom: OutputNaming = serde_json::from_str(r#"{ "prefix": "award" }"#).unwrap();
        assert_eq!(custom.file_name(2), "award_3.pdf");
    }

    #[test]
    fn test_missing_template_rejected() {
        let result = BatchGenerator::new(
            None,
            vec![Field::new("Name")],
            vec![DataRow::from_pairs([("Name", "Alice")])],
            1.0,
        );
        assert!(matches!(
            result,
            Err(TemplateError::Configuration(ConfigurationError::MissingTemplate))
        ));
    }

    #[test]
    fn test_row_failures_are_collected() {
        let template = PdfTemplate::unchecked(
            b"%PDF-1.4 corrupt",
            pdf_core::PageSize {
                width: 612.0,
                height: 792.0,
            },
        );
        let rows = vec![
            DataRow::from_pairs([("Name", "Alice")]),
            DataRow::from_pairs([("Name", "Bob")]),
        ];

        let report = BatchGenerator::new(Some(template), vec![Field::new("Name")], rows, 1.0)
            .unwrap()
            .run()
            .collect_report();

        assert_eq!(report.succeeded(), 0);
        assert_eq!(report.failed(), 2);
        assert!(!report.cancelled);
        assert_eq!(report.failures[1].row_index, 1);
        assert_eq!(report.failures[1].file_name, "certificate_2.pdf");
        assert!(matches!(
            report.failures[0].error,
            TemplateError::RowRender { row: 0, .. }
        ));
    }
}
