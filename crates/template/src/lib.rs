//! Template Engine - certificate fields, rendering and batch generation
//!
//! This crate provides:
//! - Field schema types (position, fine-tune offset, styles)
//! - Display-space to PDF-space coordinate transform
//! - Layout JSON (save/reload a field arrangement)
//! - An editing session owning template, dataset and fields
//! - Per-row rendering onto a fresh copy of the template
//! - Lazy batch generation with per-row failure reporting
//! - Zip packaging of the generated documents
//!
//! # Example
//!
//! ```ignore
//! use template::{EditingSession, Position};
//!
//! let mut session = EditingSession::new();
//! session.upload_template(pdf_bytes)?;
//! session.upload_dataset(&csv_bytes)?;
//! session.set_preview_width(612.0);
//!
//! let id = session.add_field("Name")?.id.clone();
//! session.set_position(&id, Position::new(100.0, 100.0))?;
//!
//! let report = session.run_batch()?.collect_report();
//! let archive = report.to_archive()?;
//! ```

mod archive;
mod batch;
mod coords;
mod layout;
mod renderer;
mod schema;
mod session;
mod source;

pub use archive::{package_archive, NamedOutput};
pub use batch::{BatchGenerator, BatchReport, BatchRun, OutputNaming, RowFailure, RowOutcome};
pub use coords::{scale_ratio, CoordinateTransformer};
pub use layout::{parse_layout, Layout, LAYOUT_VERSION};
pub use renderer::{Placement, TemplateRenderer};
pub use schema::*;
pub use session::{EditingSession, DEFAULT_FIELD_POSITION, ZOOM_RANGE};
pub use source::{PdfTemplate, TemplateInfo};

use thiserror::Error;

/// Reasons a batch cannot start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("no template has been uploaded")]
    MissingTemplate,

    #[error("no fields have been placed")]
    NoFields,

    #[error("the dataset has no rows")]
    NoRows,

    #[error("the preview scale has not been measured")]
    ScaleNotMeasured,
}

/// Errors that can occur during template processing
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to parse source: {0}")]
    SourceParse(String),

    #[error("Batch not configured: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Row {row} failed: {reason}")]
    RowRender { row: usize, reason: String },

    #[error("Field error: {0}")]
    FieldError(String),

    #[error("PDF error: {0}")]
    PdfError(#[from] pdf_core::PdfError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    ArchiveError(String),
}

/// Result type for template operations
pub type Result<T> = std::result::Result<T, TemplateError>;
