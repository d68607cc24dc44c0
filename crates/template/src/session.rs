//! Editing session: template, dataset and placed fields

use std::ops::RangeInclusive;

use dataset::Dataset;
use tracing::{debug, info, warn};

use crate::batch::{BatchGenerator, BatchRun};
use crate::coords::{scale_ratio, CoordinateTransformer};
use crate::layout::Layout;
use crate::schema::{unique_field_id, Field, FieldStyles, Offset, Position};
use crate::source::PdfTemplate;
use crate::{Result, TemplateError};

/// Allowed preview zoom factors
pub const ZOOM_RANGE: RangeInclusive<f64> = 0.5..=2.0;

/// Display position given to a newly added field
pub const DEFAULT_FIELD_POSITION: Position = Position { x: 50.0, y: 50.0 };

/// Mutable editor state
///
/// Owns the uploaded template and dataset plus the fields placed on the
/// preview. Replacing the template or the dataset clears every field.
#[derive(Debug)]
pub struct EditingSession {
    template: Option<PdfTemplate>,
    dataset: Option<Dataset>,
    fields: Vec<Field>,
    zoom: f64,
    preview_width: Option<f64>,
    scale_ratio: f64,
}

impl Default for EditingSession {
    fn default() -> Self {
        Self {
            template: None,
            dataset: None,
            fields: Vec::new(),
            zoom: 1.0,
            preview_width: None,
            scale_ratio: 0.0,
        }
    }
}

impl EditingSession {
    pub fn new() -> Self {
        Self::default()
    }

    // === Uploads ===

    /// Replace the template
    ///
    /// A buffer that does not parse leaves the session untouched.
    pub fn upload_template(&mut self, bytes: Vec<u8>) -> Result<&PdfTemplate> {
        let template = PdfTemplate::from_bytes(bytes)?;
        self.clear_fields("template replaced");
        let template = self.template.insert(template);
        self.scale_ratio = self
            .preview_width
            .map(|width| scale_ratio(width, template.page_width()))
            .unwrap_or(0.0);
        Ok(template)
    }

    /// Replace the dataset, returning its column names
    ///
    /// A buffer that does not parse leaves the session untouched.
    pub fn upload_dataset(&mut self, bytes: &[u8]) -> Result<&[String]> {
        let dataset =
            Dataset::from_bytes(bytes).map_err(|e| TemplateError::SourceParse(e.to_string()))?;
        Ok(self.set_dataset(dataset))
    }

    /// Replace the dataset with one parsed elsewhere
    pub fn set_dataset(&mut self, dataset: Dataset) -> &[String] {
        info!(
            columns = dataset.columns().len(),
            rows = dataset.len(),
            "dataset loaded"
        );
        self.clear_fields("dataset replaced");
        self.dataset.insert(dataset).columns()
    }

    pub fn template(&self) -> Option<&PdfTemplate> {
        self.template.as_ref()
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    /// Column names of the current dataset
    pub fn columns(&self) -> &[String] {
        self.dataset.as_ref().map(Dataset::columns).unwrap_or_default()
    }

    // === Fields ===

    /// Place a field for a column
    ///
    /// Adding a column that already has a field returns the existing one.
    pub fn add_field(&mut self, column: &str) -> Result<&Field> {
        if !self.columns().iter().any(|c| c == column) {
            return Err(TemplateError::FieldError(format!("unknown column '{column}'")));
        }

        let index = match self.fields.iter().position(|f| f.name == column) {
            Some(index) => index,
            None => {
                let field = Field {
                    id: unique_field_id(column, &self.fields),
                    position: DEFAULT_FIELD_POSITION,
                    ..Field::new(column)
                };
                debug!(id = %field.id, column, "field added");
                self.fields.push(field);
                self.fields.len() - 1
            }
        };
        Ok(&self.fields[index])
    }

    /// Remove the field for a column, returning whether one existed
    pub fn remove_field(&mut self, column: &str) -> bool {
        let before = self.fields.len();
        self.fields.retain(|f| f.name != column);
        let removed = self.fields.len() != before;
        if removed {
            debug!(column, "field removed");
        }
        removed
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Move a field to a display position
    pub fn set_position(&mut self, id: &str, position: Position) -> Result<()> {
        ensure_finite("position", position.x, position.y)?;
        self.field_mut(id)?.position = position;
        Ok(())
    }

    /// Move a field by a pointer delta in screen pixels
    ///
    /// The delta is divided by the current zoom so the field follows the
    /// pointer on a zoomed preview.
    pub fn drag_field(&mut self, id: &str, dx: f64, dy: f64) -> Result<Position> {
        ensure_finite("drag delta", dx, dy)?;
        let zoom = self.zoom;
        let field = self.field_mut(id)?;
        let moved = Position::new(field.position.x + dx / zoom, field.position.y + dy / zoom);
        ensure_finite("position", moved.x, moved.y)?;
        field.position = moved;
        Ok(moved)
    }

    /// Replace a field's styles
    pub fn set_styles(&mut self, id: &str, styles: FieldStyles) -> Result<()> {
        if !(styles.font_size.is_finite() && styles.font_size > 0.0) {
            return Err(TemplateError::FieldError(format!(
                "font size must be positive, got {}",
                styles.font_size
            )));
        }
        self.field_mut(id)?.styles = Some(styles);
        Ok(())
    }

    /// Set a field's render-time correction in PDF points
    pub fn set_fine_tune_offset(&mut self, id: &str, offset: Offset) -> Result<()> {
        ensure_finite("offset", offset.dx, offset.dy)?;
        self.field_mut(id)?.fine_tune_offset = offset;
        Ok(())
    }

    fn field_mut(&mut self, id: &str) -> Result<&mut Field> {
        self.fields
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| TemplateError::FieldError(format!("unknown field '{id}'")))
    }

    fn clear_fields(&mut self, reason: &str) {
        if !self.fields.is_empty() {
            debug!(count = self.fields.len(), reason, "fields cleared");
        }
        self.fields.clear();
    }

    // === View ===

    /// Set the preview zoom, clamped to [`ZOOM_RANGE`]; returns the zoom in effect
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        if zoom.is_nan() {
            return self.zoom;
        }
        self.zoom = zoom.clamp(*ZOOM_RANGE.start(), *ZOOM_RANGE.end());
        self.zoom
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Record the unzoomed preview width in pixels; returns the new scale ratio
    ///
    /// The ratio stays 0 (not ready) until a template is loaded.
    pub fn set_preview_width(&mut self, width: f64) -> f64 {
        self.preview_width = Some(width);
        self.scale_ratio = self
            .template
            .as_ref()
            .map(|t| scale_ratio(width, t.page_width()))
            .unwrap_or(0.0);
        debug!(width, ratio = self.scale_ratio, "preview measured");
        self.scale_ratio
    }

    pub fn scale_ratio(&self) -> f64 {
        self.scale_ratio
    }

    /// Transformer for the current template and preview scale
    pub fn transformer(&self) -> CoordinateTransformer {
        let page_height = self.template.as_ref().map_or(0.0, PdfTemplate::page_height);
        CoordinateTransformer::new(self.scale_ratio, page_height)
    }

    /// Where a field appears on screen, zoom applied
    pub fn display_position(&self, id: &str) -> Option<Position> {
        self.field(id)
            .map(|f| Position::new(f.position.x * self.zoom, f.position.y * self.zoom))
    }

    /// Where a field's origin lands on the page, fine-tune offset included
    ///
    /// `None` until the scale has been measured.
    pub fn pdf_position(&self, id: &str) -> Option<Position> {
        let transformer = self.transformer();
        if !transformer.is_ready() {
            return None;
        }
        self.field(id).map(|f| {
            let p = transformer.to_pdf(f.position);
            Position::new(p.x + f.fine_tune_offset.dx, p.y + f.fine_tune_offset.dy)
        })
    }

    // === Layout ===

    /// Snapshot the current field arrangement
    pub fn layout(&self) -> Layout {
        let ratio = self.transformer().is_ready().then_some(self.scale_ratio);
        Layout::new(self.fields.clone(), ratio)
    }

    /// Replace the fields with a saved arrangement
    ///
    /// Fields for columns missing from the current dataset are dropped.
    /// When the layout was saved at a different preview scale, positions
    /// are rescaled so every field keeps its place on the page.
    /// Returns the number of fields applied.
    pub fn apply_layout(&mut self, layout: Layout) -> usize {
        let rescale = self.layout_rescale(layout.scale_ratio);
        let columns = self.columns();
        let has_dataset = self.dataset.is_some();

        let mut fields: Vec<Field> = Vec::with_capacity(layout.fields.len());
        for field in layout.fields {
            if has_dataset && !columns.contains(&field.name) {
                warn!(column = %field.name, "layout field dropped: column not in dataset");
                continue;
            }
            if fields.iter().any(|f| f.name == field.name) {
                continue;
            }
            let id = unique_field_id(&field.name, &fields);
            let position = Position::new(field.position.x * rescale, field.position.y * rescale);
            fields.push(Field {
                id,
                position,
                ..field
            });
        }

        info!(count = fields.len(), "layout applied");
        self.fields = fields;
        self.fields.len()
    }

    /// Factor taking positions saved at `saved` to the current scale
    fn layout_rescale(&self, saved: Option<f64>) -> f64 {
        let saved = saved.filter(|r| r.is_finite() && *r > 0.0);
        match saved {
            Some(saved) if self.transformer().is_ready() => {
                let factor = self.scale_ratio / saved;
                if factor != 1.0 {
                    debug!(saved, current = self.scale_ratio, "layout rescaled");
                }
                factor
            }
            Some(_) => {
                debug!("preview not measured, layout positions kept as saved");
                1.0
            }
            None => 1.0,
        }
    }

    // === Batch ===

    /// Validate the session and start a batch over every dataset row
    pub fn run_batch(&self) -> Result<BatchRun> {
        let rows = self
            .dataset
            .as_ref()
            .map(|d| d.rows().to_vec())
            .unwrap_or_default();

        let generator = BatchGenerator::new(
            self.template.clone(),
            self.fields.clone(),
            rows,
            self.scale_ratio,
        )?;
        Ok(generator.run())
    }
}

fn ensure_finite(what: &str, x: f64, y: f64) -> Result<()> {
    if x.is_finite() && y.is_finite() {
        Ok(())
    } else {
        Err(TemplateError::FieldError(format!("{what} must be finite")))
    }
}
