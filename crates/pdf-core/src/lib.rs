//! PDF Core - Low-level PDF manipulation
//!
//! This crate provides functionality for:
//! - Opening template PDFs from bytes and reading page geometry
//! - Resolving and measuring the standard (base-14) text fonts
//! - Inserting text at PDF-space coordinates with alignment and underline
//! - Serializing the modified document back to bytes
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{Align, FontFamily, FontStyle, FontWeight, PdfDocument, StandardFont};
//!
//! let mut doc = PdfDocument::open_from_bytes(&template_bytes)?;
//! let font = StandardFont::new(FontFamily::Helvetica, FontWeight::Bold, FontStyle::Normal);
//! doc.set_font(font, 16.0);
//! doc.insert_text("Hello, World!", 1, 300.0, 692.0, Align::Center)?;
//! let bytes = doc.to_bytes()?;
//! ```

mod document;
mod font;
mod text;

pub use document::{Color, PageSize, PdfDocument};
pub use font::{encode_win_ansi, FontFamily, FontStyle, FontWeight, StandardFont};
pub use text::{generate_text_operators, escape_literal, TextRenderContext};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("No font selected")]
    FontNotSet,

    #[error("Character {ch:?} cannot be drawn with {font}")]
    UnsupportedGlyph { ch: char, font: &'static str },

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Text alignment options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    /// Horizontal shift applied to the origin for a run of `width` points
    pub fn offset(self, width: f64) -> f64 {
        match self {
            Align::Left => 0.0,
            Align::Center => -width / 2.0,
            Align::Right => -width,
        }
    }
}
