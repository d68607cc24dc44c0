//! Template rendering

use dataset::DataRow;
use pdf_core::{Align, PdfDocument, StandardFont};
use tracing::{debug, warn};

use crate::coords::CoordinateTransformer;
use crate::schema::{resolve_font, Field, Rgb};
use crate::{ConfigurationError, Result, TemplateError};

/// Fields are drawn on the first page only
const TARGET_PAGE: usize = 1;

/// Where and how one field value lands on the page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Draw X in points, alignment already applied
    pub x: f64,
    /// Baseline Y in points
    pub y: f64,
    /// Measured text width in points
    pub width: f64,
    pub font: StandardFont,
    pub size: f32,
    pub color: Rgb,
    pub underline: bool,
}

/// Template renderer
///
/// Draws one data row onto a freshly parsed copy of the template.
pub struct TemplateRenderer<'a> {
    /// Fields to draw
    fields: &'a [Field],
    /// Displayed pixels per PDF point
    scale_ratio: f64,
}

impl<'a> TemplateRenderer<'a> {
    /// Create a new renderer for a field set
    pub fn new(fields: &'a [Field], scale_ratio: f64) -> Self {
        Self {
            fields,
            scale_ratio,
        }
    }

    /// Compute the draw position of `value` for `field`
    ///
    /// The origin is the field's display position converted to PDF space
    /// plus its fine-tune offset, then shifted left by half (center) or
    /// all (right) of the text width. Returns `None` when there is
    /// nothing to draw: the value is blank, the size is unusable, or the
    /// text cannot be measured in the resolved font.
    pub fn placement(&self, field: &Field, value: &str, page_height: f64) -> Option<Placement> {
        if value.trim().is_empty() {
            debug!(field = %field.id, "field skipped: empty value");
            return None;
        }

        let styles = field.effective_styles();
        if !(styles.font_size.is_finite() && styles.font_size > 0.0) {
            warn!(field = %field.id, size = styles.font_size, "field skipped: invalid font size");
            return None;
        }

        let font = resolve_font(&styles);
        let width = match font.text_width(value, styles.font_size) {
            Ok(width) => width,
            Err(e) => {
                warn!(field = %field.id, error = %e, "field skipped: text cannot be drawn");
                return None;
            }
        };

        let transformer = CoordinateTransformer::new(self.scale_ratio, page_height);
        let origin = transformer.to_pdf(field.position);
        let x = origin.x + field.fine_tune_offset.dx;
        let y = origin.y + field.fine_tune_offset.dy;
        let align: Align = styles.text_align.into();

        Some(Placement {
            x: x + align.offset(width),
            y,
            width,
            font,
            size: styles.font_size,
            color: styles.color,
            underline: styles.underline,
        })
    }

    /// Render one row
    ///
    /// # Arguments
    /// * `template_bytes` - Template PDF, parsed fresh for this call
    /// * `row` - Values keyed by column name
    pub fn render(&self, template_bytes: &[u8], row: &DataRow) -> Result<Vec<u8>> {
        if !CoordinateTransformer::new(self.scale_ratio, 0.0).is_ready() {
            return Err(ConfigurationError::ScaleNotMeasured.into());
        }

        let mut doc = PdfDocument::open_from_bytes(template_bytes)
            .map_err(|e| TemplateError::SourceParse(e.to_string()))?;
        let page_height = doc
            .page_size(TARGET_PAGE)
            .map_err(|e| TemplateError::SourceParse(e.to_string()))?
            .height;

        for field in self.fields {
            let Some(value) = row.get(&field.name) else {
                debug!(field = %field.id, column = %field.name, "field skipped: column missing");
                continue;
            };

            let Some(placement) = self.placement(field, value, page_height) else {
                continue;
            };

            if let Err(e) = self.draw(&mut doc, value, &placement) {
                warn!(field = %field.id, error = %e, "field skipped: draw failed");
            }
        }

        Ok(doc.to_bytes()?)
    }

    /// Draw a value at a computed placement
    fn draw(&self, doc: &mut PdfDocument, value: &str, placement: &Placement) -> Result<()> {
        doc.set_font(placement.font, placement.size);
        doc.set_text_color(placement.color.to_pdf_color());
        doc.set_underline(placement.underline);
        doc.insert_text(value, TARGET_PAGE, placement.x, placement.y, Align::Left)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldStyles, Offset, Position, TextAlign};

    fn styled(column: &str, x: f64, y: f64, styles: FieldStyles) -> Field {
        Field {
            position: Position::new(x, y),
            styles: Some(styles),
            ..Field::new(column)
        }
    }

    #[test]
    fn test_placement_left() {
        let field = styled("Name", 100.0, 100.0, FieldStyles::default());
        let renderer = TemplateRenderer::new(std::slice::from_ref(&field), 1.0);

        let p = renderer.placement(&field, "Alice", 792.0).unwrap();
        assert_eq!(p.x, 100.0);
        assert_eq!(p.y, 692.0);
        assert_eq!(p.font, StandardFont::Helvetica);
        assert_eq!(p.size, 12.0);
    }

    #[test]
    fn test_placement_right_aligned() {
        let styles = FieldStyles {
            font_size: 16.0,
            text_align: TextAlign::Right,
            ..Default::default()
        };
        let field = styled("Name", 300.0, 100.0, styles);
        let renderer = TemplateRenderer::new(std::slice::from_ref(&field), 1.0);

        let p = renderer.placement(&field, "Bob", 792.0).unwrap();
        assert!((p.width - 28.464).abs() < 1e-9);
        assert!((p.x - 271.536).abs() < 1e-9);
        assert!((p.x - 272.0).abs() < 1.0);
    }

    #[test]
    fn test_placement_center_aligned() {
        let styles = FieldStyles {
            font_family: "Times New Roman".to_string(),
            font_size: 20.0,
            text_align: TextAlign::Center,
            ..Default::default()
        };
        let field = styled("Name", 200.0, 50.0, styles);
        let renderer = TemplateRenderer::new(std::slice::from_ref(&field), 0.5);

        for value in ["A", "Alice Wonderland", "Zoë"] {
            let p = renderer.placement(&field, value, 792.0).unwrap();
            let expected_x = 400.0;
            assert!((p.x - (expected_x - p.width / 2.0)).abs() < 1e-9);
            assert_eq!(p.font, StandardFont::TimesRoman);
        }
    }

    #[test]
    fn test_placement_fine_tune_offset() {
        let field = Field {
            fine_tune_offset: Offset::new(2.5, -4.0),
            ..styled("Name", 100.0, 100.0, FieldStyles::default())
        };
        let renderer = TemplateRenderer::new(std::slice::from_ref(&field), 1.0);

        let p = renderer.placement(&field, "Alice", 792.0).unwrap();
        assert_eq!(p.x, 102.5);
        assert_eq!(p.y, 688.0);
    }

    #[test]
    fn test_placement_skips() {
        let field = styled("Name", 0.0, 0.0, FieldStyles::default());
        let renderer = TemplateRenderer::new(std::slice::from_ref(&field), 1.0);

        assert!(renderer.placement(&field, "", 792.0).is_none());
        assert!(renderer.placement(&field, "   ", 792.0).is_none());
        assert!(renderer.placement(&field, "名前", 792.0).is_none());

        let zero = styled(
            "Name",
            0.0,
            0.0,
            FieldStyles {
                font_size: 0.0,
                ..Default::default()
            },
        );
        assert!(renderer.placement(&zero, "Alice", 792.0).is_none());
    }

    #[test]
    fn test_render_rejects_unmeasured_scale() {
        let fields = [Field::new("Name")];
        let renderer = TemplateRenderer::new(&fields, 0.0);
        let row = DataRow::from_pairs([("Name", "Alice")]);

        let result = renderer.render(b"irrelevant", &row);
        assert!(matches!(
            result,
            Err(TemplateError::Configuration(ConfigurationError::ScaleNotMeasured))
        ));
    }

    #[test]
    fn test_render_rejects_bad_template() {
        let fields = [Field::new("Name")];
        let renderer = TemplateRenderer::new(&fields, 1.0);
        let row = DataRow::from_pairs([("Name", "Alice")]);

        let result = renderer.render(b"%PDF-1.4 truncated", &row);
        assert!(matches!(result, Err(TemplateError::SourceParse(_))));
    }
}
