//! Uploaded template document

use std::sync::Arc;

use pdf_core::{PageSize, PdfDocument};
use serde::Serialize;
use tracing::info;

use crate::{Result, TemplateError};

/// Immutable template bytes plus first-page geometry
///
/// The bytes are shared, so cloning is cheap. Rendering never mutates
/// them; every output row parses its own copy.
#[derive(Debug, Clone)]
pub struct PdfTemplate {
    bytes: Arc<[u8]>,
    page_count: usize,
    page_size: PageSize,
}

/// Summary of an uploaded template
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateInfo {
    pub page_count: usize,
    pub page_width: f64,
    pub page_height: f64,
}

impl PdfTemplate {
    /// Parse an uploaded PDF, reading its page count and first-page size
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let doc = PdfDocument::open_from_bytes(&bytes)
            .map_err(|e| TemplateError::SourceParse(e.to_string()))?;
        let page_size = doc
            .page_size(1)
            .map_err(|e| TemplateError::SourceParse(e.to_string()))?;
        let page_count = doc.page_count();

        info!(
            page_count,
            width = page_size.width,
            height = page_size.height,
            "template loaded"
        );

        Ok(Self {
            bytes: bytes.into(),
            page_count,
            page_size,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// First-page width in points
    pub fn page_width(&self) -> f64 {
        self.page_size.width
    }

    /// First-page height in points
    pub fn page_height(&self) -> f64 {
        self.page_size.height
    }

    /// Wrap bytes without parsing them
    #[cfg(test)]
    pub(crate) fn unchecked(bytes: &[u8], page_size: PageSize) -> Self {
        Self {
            bytes: bytes.into(),
            page_count: 1,
            page_size,
        }
    }

    pub fn info(&self) -> TemplateInfo {
        TemplateInfo {
            page_count: self.page_count,
            page_width: self.page_size.width,
            page_height: self.page_size.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_is_source_parse_error() {
        let result = PdfTemplate::from_bytes(b"not a pdf".to_vec());
        assert!(matches!(result, Err(TemplateError::SourceParse(_))));
    }
}
