//! Field schema types

use std::fmt;

use pdf_core::{Color, FontFamily, StandardFont};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

/// RGB color with 8-bit channels, written as `"#rrggbb"` in JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `#rgb` (the leading `#` is optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if !digits.is_ascii() {
            return None;
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match digits.len() {
            6 => Some(Self {
                r: channel(&digits[0..2])?,
                g: channel(&digits[2..4])?,
                b: channel(&digits[4..6])?,
            }),
            3 => {
                let short = |i: usize| channel(&digits[i..i + 1]).map(|v| v * 17);
                Some(Self {
                    r: short(0)?,
                    g: short(1)?,
                    b: short(2)?,
                })
            }
            _ => None,
        }
    }

    /// Lowercase `#rrggbb`
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channels normalized to 0..1
    pub fn to_pdf_color(self) -> Color {
        Color::from_rgb(self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Rgb::from_hex(&hex)
            .ok_or_else(|| de::Error::custom(format!("invalid color '{hex}', expected #rrggbb")))
    }
}

/// A point in display space (pixels, origin top-left, Y down)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Manual correction in PDF points, applied only at render time
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Offset {
    #[serde(default)]
    pub dx: f64,
    #[serde(default)]
    pub dy: f64,
}

impl Offset {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

/// Font weight
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// Font slant
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// Horizontal alignment relative to the field position
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl From<TextAlign> for pdf_core::Align {
    fn from(align: TextAlign) -> Self {
        match align {
            TextAlign::Left => pdf_core::Align::Left,
            TextAlign::Center => pdf_core::Align::Center,
            TextAlign::Right => pdf_core::Align::Right,
        }
    }
}

/// Visual style of a field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldStyles {
    /// Requested font family (mapped onto a standard font at render time)
    pub font_family: String,

    /// Font size in points
    pub font_size: f32,

    pub font_weight: FontWeight,

    pub font_style: FontStyle,

    pub underline: bool,

    pub text_align: TextAlign,

    pub color: Rgb,
}

impl Default for FieldStyles {
    fn default() -> Self {
        Self {
            font_family: "Helvetica".to_string(),
            font_size: 12.0,
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            underline: false,
            text_align: TextAlign::Left,
            color: Rgb::BLACK,
        }
    }
}

/// A placeable text field bound to one data column
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Stable identifier derived from the column name
    pub id: String,

    /// Data column this field draws its value from
    pub name: String,

    /// Position in display space
    pub position: Position,

    #[serde(default)]
    pub fine_tune_offset: Offset,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<FieldStyles>,
}

impl Field {
    /// Create an unstyled field for a column at the display origin
    pub fn new(column: &str) -> Self {
        Self {
            id: field_id_for(column),
            name: column.to_string(),
            position: Position::default(),
            fine_tune_offset: Offset::default(),
            styles: None,
        }
    }

    /// The field's styles, or the defaults when none were set
    pub fn effective_styles(&self) -> FieldStyles {
        self.styles.clone().unwrap_or_default()
    }
}

/// Derive the base field id for a column: `field-<slug>`
///
/// The slug is the lowercased column name with every run of
/// non-alphanumeric characters collapsed to a single `-`.
pub fn field_id_for(column: &str) -> String {
    let mut slug = String::with_capacity(column.len());
    for ch in column.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            slug.push(ch);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        "field".to_string()
    } else {
        format!("field-{slug}")
    }
}

/// Id for `column` that is unique among `fields`
///
/// A column that already has a field keeps that field's id. A different
/// column whose slug collides gets a `-<n>` suffix.
pub fn unique_field_id(column: &str, fields: &[Field]) -> String {
    if let Some(existing) = fields.iter().find(|f| f.name == column) {
        return existing.id.clone();
    }

    let base = field_id_for(column);
    let taken = |id: &str| fields.iter().any(|f| f.id == id);
    if !taken(&base) {
        return base;
    }

    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or(base)
}

/// Map requested styles onto one of the standard faces
///
/// Unrecognized families fall back to Helvetica; this never fails.
pub fn resolve_font(styles: &FieldStyles) -> StandardFont {
    let family = FontFamily::from_name(&styles.font_family).unwrap_or_else(|| {
        debug!(requested = %styles.font_family, "unknown font family, using Helvetica");
        FontFamily::Helvetica
    });

    let weight = match styles.font_weight {
        FontWeight::Normal => pdf_core::FontWeight::Regular,
        FontWeight::Bold => pdf_core::FontWeight::Bold,
    };
    let style = match styles.font_style {
        FontStyle::Normal => pdf_core::FontStyle::Normal,
        FontStyle::Italic => pdf_core::FontStyle::Italic,
    };

    StandardFont::new(family, weight, style)
}
