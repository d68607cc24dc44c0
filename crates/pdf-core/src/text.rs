//! Text rendering utilities

use crate::document::Color;

/// Context for rendering text
pub struct TextRenderContext {
    /// PDF font resource name (e.g., "CF1")
    pub font_name: String,
    /// Font size in points
    pub font_size: f32,
    /// Text width in points (for the underline)
    pub text_width: f64,
    /// Text color (RGB)
    pub color: Color,
    /// Underline position and thickness in 1/1000 em, if underlined
    pub underline: Option<(f64, f64)>,
}

/// Escape WinAnsi bytes for a PDF literal string
///
/// Backslash and parentheses are escaped, bytes outside printable ASCII
/// are written as three-digit octal escapes.
pub fn escape_literal(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 2);
    out.push('(');
    for &b in bytes {
        match b {
            b'\\' | b'(' | b')' => {
                out.push('\\');
                out.push(b as char);
            }
            0x20..=0x7E => out.push(b as char),
            _ => out.push_str(&format!("\\{b:03o}")),
        }
    }
    out.push(')');
    out
}

/// Generate PDF operators for text insertion
///
/// Creates the text operators (BT, rg, Tf, Td, Tj, ET) that draw `text`
/// with its glyph origin at `(x, y)`, followed by an underline stroke when
/// requested. The coordinates are final PDF-space coordinates; alignment
/// has already been applied by the caller.
///
/// # Arguments
/// * `encoded` - WinAnsi-encoded text
/// * `x` - X coordinate in points (PDF coordinates, from left)
/// * `y` - Y coordinate in points (PDF coordinates, from bottom)
/// * `ctx` - Text rendering context
pub fn generate_text_operators(encoded: &[u8], x: f64, y: f64, ctx: &TextRenderContext) -> Vec<u8> {
    let mut ops = String::new();
    let Color { r, g, b } = ctx.color;

    ops.push_str("BT\n");
    ops.push_str(&format!("{r} {g} {b} rg\n"));
    ops.push_str(&format!("/{} {} Tf\n", ctx.font_name, ctx.font_size));
    ops.push_str(&format!("{x} {y} Td\n"));
    ops.push_str(&format!("{} Tj\n", escape_literal(encoded)));
    ops.push_str("ET\n");

    if let Some((position, thickness)) = ctx.underline {
        let size = f64::from(ctx.font_size);
        let line_y = y + position * size / 1000.0;
        let line_width = thickness * size / 1000.0;
        let end_x = x + ctx.text_width;

        ops.push_str("q\n");
        ops.push_str(&format!("{r} {g} {b} RG\n"));
        ops.push_str(&format!("{line_width} w\n"));
        ops.push_str(&format!("{x} {line_y} m\n{end_x} {line_y} l\nS\n"));
        ops.push_str("Q\n");
    }

    ops.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(underline: Option<(f64, f64)>) -> TextRenderContext {
        TextRenderContext {
            font_name: "CF1".to_string(),
            font_size: 12.0,
            text_width: 100.0,
            color: Color::black(),
            underline,
        }
    }

    #[test]
    fn test_escape_literal() {
        assert_eq!(escape_literal(b"Hello"), "(Hello)");
        assert_eq!(escape_literal(b"a(b)c\\"), "(a\\(b\\)c\\\\)");
        assert_eq!(escape_literal(&[b'Z', b'o', 0xEB]), "(Zo\\353)");
    }

    #[test]
    fn test_generate_text_operators() {
        let ops = generate_text_operators(b"Hello", 100.0, 700.0, &context(None));
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.starts_with("BT\n"));
        assert!(ops_str.contains("0 0 0 rg"));
        assert!(ops_str.contains("/CF1 12 Tf"));
        assert!(ops_str.contains("100 700 Td"));
        assert!(ops_str.contains("(Hello) Tj"));
        assert!(ops_str.ends_with("ET\n"));
        assert!(!ops_str.contains(" l\n"));
    }

    #[test]
    fn test_generate_text_operators_color() {
        let mut ctx = context(None);
        ctx.color = Color::rgb(1.0, 0.5, 0.0);

        let ops = String::from_utf8(generate_text_operators(b"x", 0.0, 0.0, &ctx)).unwrap();
        assert!(ops.contains("1 0.5 0 rg"));
    }

    #[test]
    fn test_generate_underline() {
        let ops = generate_text_operators(b"Hello", 100.0, 700.0, &context(Some((-100.0, 50.0))));
        let ops_str = String::from_utf8(ops).unwrap();

        // 12pt: line 1.2pt below the baseline, 0.6pt thick, 100pt long
        assert!(ops_str.contains("0.6 w"));
        assert!(ops_str.contains("100 698.8 m"));
        assert!(ops_str.contains("200 698.8 l"));
        assert!(ops_str.contains("0 0 0 RG"));
    }
}
