//! Display-space / PDF-space coordinate transform

use crate::schema::Position;

/// Converts between display pixels (origin top-left, Y down) and PDF
/// points (origin bottom-left, Y up)
///
/// `scale_ratio` is displayed pixels per PDF point. A ratio that is zero,
/// negative or not finite means the preview has not been measured yet; in
/// that state both conversions return their input unchanged and
/// [`is_ready`](Self::is_ready) is false.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransformer {
    scale_ratio: f64,
    page_height: f64,
}

impl CoordinateTransformer {
    pub fn new(scale_ratio: f64, page_height: f64) -> Self {
        Self {
            scale_ratio,
            page_height,
        }
    }

    pub fn scale_ratio(&self) -> f64 {
        self.scale_ratio
    }

    pub fn page_height(&self) -> f64 {
        self.page_height
    }

    /// Whether the scale ratio has been measured
    pub fn is_ready(&self) -> bool {
        self.scale_ratio.is_finite() && self.scale_ratio > 0.0
    }

    /// PDF point to display pixel: `(x*s, H*s - y*s)`
    pub fn to_display(&self, point: Position) -> Position {
        if !self.is_ready() {
            return point;
        }
        let s = self.scale_ratio;
        Position::new(point.x * s, self.page_height * s - point.y * s)
    }

    /// Display pixel to PDF point: `(x/s, H - y/s)`
    pub fn to_pdf(&self, point: Position) -> Position {
        if !self.is_ready() {
            return point;
        }
        let s = self.scale_ratio;
        Position::new(point.x / s, self.page_height - point.y / s)
    }
}

/// Scale ratio for a preview rendered `displayed_width` pixels wide
///
/// Returns 0 (not ready) when either width is unusable.
pub fn scale_ratio(displayed_width: f64, pdf_width: f64) -> f64 {
    if displayed_width.is_finite()
        && pdf_width.is_finite()
        && displayed_width > 0.0
        && pdf_width > 0.0
    {
        displayed_width / pdf_width
    } else {
        0.0
    }
}
