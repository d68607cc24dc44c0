//! Standard (base-14) font handling for PDF documents
//!
//! Only the twelve text faces of the Helvetica, Times and Courier families
//! are supported. They are never embedded: every conforming viewer ships
//! them, so a page only needs a `/Type1` font dictionary naming the face.
//! Text is written with `WinAnsiEncoding`.

use crate::{PdfError, Result};
use lopdf::{dictionary, Dictionary};

/// Font weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

/// Font style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// Supported font families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontFamily {
    /// Sans-serif, the fallback for anything unrecognised
    #[default]
    Helvetica,
    /// Serif
    Times,
    /// Monospace
    Courier,
}

impl FontFamily {
    /// Map a requested family name onto a supported family
    ///
    /// Matching is case-insensitive and ignores quotes, whitespace and a
    /// trailing CSS-style fallback list (`"Georgia", serif` matches on
    /// `Georgia`). Returns `None` when there is no direct mapping.
    pub fn from_name(name: &str) -> Option<Self> {
        let primary = name.split(',').next().unwrap_or_default();
        let key: String = primary
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '"' && *c != '\'')
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "helvetica" | "helveticaneue" | "arial" | "sans-serif" | "sansserif" | "verdana"
            | "tahoma" | "roboto" | "opensans" | "inter" => Some(FontFamily::Helvetica),
            "times" | "timesroman" | "timesnewroman" | "serif" | "georgia" | "garamond"
            | "cambria" | "playfairdisplay" => Some(FontFamily::Times),
            "courier" | "couriernew" | "monospace" | "consolas" | "monaco" => {
                Some(FontFamily::Courier)
            }
            _ => None,
        }
    }
}

/// One of the twelve standard text faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StandardFont {
    #[default]
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

impl StandardFont {
    /// Select the face for a family/weight/style combination
    pub fn new(family: FontFamily, weight: FontWeight, style: FontStyle) -> Self {
        use FontStyle::*;
        use FontWeight::*;

        match (family, weight, style) {
            (FontFamily::Helvetica, Regular, Normal) => StandardFont::Helvetica,
            (FontFamily::Helvetica, Bold, Normal) => StandardFont::HelveticaBold,
            (FontFamily::Helvetica, Regular, Italic) => StandardFont::HelveticaOblique,
            (FontFamily::Helvetica, Bold, Italic) => StandardFont::HelveticaBoldOblique,
            (FontFamily::Times, Regular, Normal) => StandardFont::TimesRoman,
            (FontFamily::Times, Bold, Normal) => StandardFont::TimesBold,
            (FontFamily::Times, Regular, Italic) => StandardFont::TimesItalic,
            (FontFamily::Times, Bold, Italic) => StandardFont::TimesBoldItalic,
            (FontFamily::Courier, Regular, Normal) => StandardFont::Courier,
            (FontFamily::Courier, Bold, Normal) => StandardFont::CourierBold,
            (FontFamily::Courier, Regular, Italic) => StandardFont::CourierOblique,
            (FontFamily::Courier, Bold, Italic) => StandardFont::CourierBoldOblique,
        }
    }

    /// PostScript name written to `/BaseFont`
    pub fn base_font_name(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::HelveticaOblique => "Helvetica-Oblique",
            StandardFont::HelveticaBoldOblique => "Helvetica-BoldOblique",
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::TimesBold => "Times-Bold",
            StandardFont::TimesItalic => "Times-Italic",
            StandardFont::TimesBoldItalic => "Times-BoldItalic",
            StandardFont::Courier => "Courier",
            StandardFont::CourierBold => "Courier-Bold",
            StandardFont::CourierOblique => "Courier-Oblique",
            StandardFont::CourierBoldOblique => "Courier-BoldOblique",
        }
    }

    /// Family this face belongs to
    pub fn family(self) -> FontFamily {
        match self {
            StandardFont::Helvetica
            | StandardFont::HelveticaBold
            | StandardFont::HelveticaOblique
            | StandardFont::HelveticaBoldOblique => FontFamily::Helvetica,
            StandardFont::TimesRoman
            | StandardFont::TimesBold
            | StandardFont::TimesItalic
            | StandardFont::TimesBoldItalic => FontFamily::Times,
            StandardFont::Courier
            | StandardFont::CourierBold
            | StandardFont::CourierOblique
            | StandardFont::CourierBoldOblique => FontFamily::Courier,
        }
    }

    /// Advance widths for WinAnsi codes, `None` for monospace faces
    fn widths(self) -> Option<(&'static [u16; 95], &'static [u16; 128])> {
        match self {
            StandardFont::Helvetica | StandardFont::HelveticaOblique => {
                Some((&HELVETICA_WIDTHS, &HELVETICA_HIGH_WIDTHS))
            }
            StandardFont::HelveticaBold | StandardFont::HelveticaBoldOblique => {
                Some((&HELVETICA_BOLD_WIDTHS, &HELVETICA_BOLD_HIGH_WIDTHS))
            }
            StandardFont::TimesRoman => Some((&TIMES_ROMAN_WIDTHS, &TIMES_ROMAN_HIGH_WIDTHS)),
            StandardFont::TimesBold => Some((&TIMES_BOLD_WIDTHS, &TIMES_BOLD_HIGH_WIDTHS)),
            StandardFont::TimesItalic => Some((&TIMES_ITALIC_WIDTHS, &TIMES_ITALIC_HIGH_WIDTHS)),
            StandardFont::TimesBoldItalic => {
                Some((&TIMES_BOLD_ITALIC_WIDTHS, &TIMES_BOLD_ITALIC_HIGH_WIDTHS))
            }
            _ => None,
        }
    }

    /// Advance width of a character in 1/1000 em
    ///
    /// Returns `None` when the character has no WinAnsi glyph.
    pub fn char_width(self, ch: char) -> Option<u16> {
        let code = win_ansi_code(ch)?;
        let Some((ascii, high)) = self.widths() else {
            return Some(COURIER_WIDTH);
        };

        match code {
            0x20..=0x7E => Some(ascii[usize::from(code - 0x20)]),
            0x80..=0xFF => Some(high[usize::from(code - 0x80)]).filter(|w| *w > 0),
            _ => None,
        }
    }

    /// Width of `text` in points at `size`
    pub fn text_width(self, text: &str, size: f32) -> Result<f64> {
        let mut units = 0u32;
        for ch in text.chars() {
            let w = self.char_width(ch).ok_or(PdfError::UnsupportedGlyph {
                ch,
                font: self.base_font_name(),
            })?;
            units += u32::from(w);
        }
        Ok(f64::from(units) * f64::from(size) / 1000.0)
    }

    /// Underline position and thickness relative to the baseline, in 1/1000 em
    ///
    /// All twelve faces share the same AFM values.
    pub fn underline_metrics(self) -> (f64, f64) {
        (-100.0, 50.0)
    }

    /// Font dictionary for the page `/Resources /Font` entry
    pub(crate) fn to_pdf_dictionary(self) -> Dictionary {
        dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => self.base_font_name(),
            "Encoding" => "WinAnsiEncoding",
        }
    }
}

/// Encode text as WinAnsi bytes
///
/// Accepts printable ASCII, the Latin-1 range from U+00A0 and the
/// typographic characters WinAnsi places at 0x80..=0x9F.
pub fn encode_win_ansi(text: &str, font: StandardFont) -> Result<Vec<u8>> {
    text.chars()
        .map(|ch| {
            win_ansi_code(ch).ok_or(PdfError::UnsupportedGlyph {
                ch,
                font: font.base_font_name(),
            })
        })
        .collect()
}

/// WinAnsi code of a character
fn win_ansi_code(ch: char) -> Option<u8> {
    let code = match ch {
        ' '..='~' | '\u{A0}'..='\u{FF}' => ch as u32 as u8,
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => return None,
    };
    Some(code)
}

const COURIER_WIDTH: u16 = 600;

// AFM advance widths for U+0020..=U+007E.

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    278, 278, 584, 584, 584, 556, 1015,
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    278, 278, 278, 469, 556, 333,
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

#[rustfmt::skip]
const TIMES_ROMAN_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    278, 278, 564, 564, 564, 444, 921,
    722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889,
    722, 722, 556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611,
    333, 278, 333, 469, 500, 333,
    444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778,
    500, 500, 500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444,
    480, 200, 480, 541,
];

#[rustfmt::skip]
const TIMES_BOLD_WIDTHS: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    333, 333, 570, 570, 570, 500, 930,
    722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944,
    722, 778, 611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667,
    333, 278, 333, 581, 500, 333,
    500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833,
    556, 500, 556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444,
    394, 220, 394, 520,
];

#[rustfmt::skip]
const TIMES_ITALIC_WIDTHS: [u16; 95] = [
    250, 333, 420, 500, 500, 833, 778, 214, 333, 333, 500, 675, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    333, 333, 675, 675, 675, 500, 920,
    611, 611, 667, 722, 611, 611, 722, 722, 333, 444, 667, 556, 833,
    667, 722, 611, 722, 611, 500, 556, 722, 611, 833, 611, 556, 556,
    389, 278, 389, 422, 500, 333,
    500, 500, 444, 500, 444, 278, 500, 500, 278, 278, 444, 278, 722,
    500, 500, 500, 500, 389, 389, 278, 500, 444, 667, 444, 444, 389,
    400, 275, 400, 541,
];

#[rustfmt::skip]
const TIMES_BOLD_ITALIC_WIDTHS: [u16; 95] = [
    250, 389, 555, 500, 500, 833, 778, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    333, 333, 570, 570, 570, 500, 832,
    667, 667, 667, 722, 667, 667, 722, 778, 389, 500, 667, 611, 889,
    722, 722, 611, 722, 667, 556, 611, 722, 667, 889, 667, 611, 611,
    333, 278, 333, 570, 500, 333,
    500, 500, 444, 500, 444, 333, 500, 556, 278, 278, 500, 278, 778,
    556, 500, 500, 500, 389, 389, 278, 556, 444, 667, 500, 444, 389,
    348, 220, 348, 570,
];

// AFM advance widths for WinAnsi 0x80..=0xFF, 0 where the code is unassigned.

#[rustfmt::skip]
const HELVETICA_HIGH_WIDTHS: [u16; 128] = [
    556, 0, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0,
    0, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 0, 500, 667,
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];

#[rustfmt::skip]
const HELVETICA_BOLD_HIGH_WIDTHS: [u16; 128] = [
    556, 0, 278, 556, 500, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0,
    0, 278, 278, 500, 500, 350, 556, 1000, 333, 1000, 556, 333, 944, 0, 500, 667,
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278,
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556,
];

#[rustfmt::skip]
const TIMES_ROMAN_HIGH_WIDTHS: [u16; 128] = [
    500, 0, 333, 500, 444, 1000, 500, 500, 333, 1000, 556, 333, 889, 0, 611, 0,
    0, 333, 333, 444, 444, 350, 500, 1000, 333, 980, 389, 333, 722, 0, 444, 722,
    250, 333, 500, 500, 500, 500, 200, 500, 333, 760, 276, 500, 564, 333, 760, 333,
    400, 564, 300, 300, 333, 500, 453, 250, 333, 300, 310, 500, 750, 750, 750, 444,
    722, 722, 722, 722, 722, 722, 889, 667, 611, 611, 611, 611, 333, 333, 333, 333,
    722, 722, 722, 722, 722, 722, 722, 564, 722, 722, 722, 722, 722, 722, 556, 500,
    444, 444, 444, 444, 444, 444, 667, 444, 444, 444, 444, 444, 278, 278, 278, 278,
    500, 500, 500, 500, 500, 500, 500, 564, 500, 500, 500, 500, 500, 500, 500, 500,
];

#[rustfmt::skip]
const TIMES_BOLD_HIGH_WIDTHS: [u16; 128] = [
    500, 0, 333, 500, 500, 1000, 500, 500, 333, 1000, 556, 333, 1000, 0, 667, 0,
    0, 333, 333, 500, 500, 350, 500, 1000, 333, 1000, 389, 333, 722, 0, 444, 722,
    250, 333, 500, 500, 500, 500, 220, 500, 333, 747, 300, 500, 570, 333, 747, 333,
    400, 570, 300, 300, 333, 556, 540, 250, 333, 300, 330, 500, 750, 750, 750, 500,
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 389, 389, 389, 389,
    722, 722, 778, 778, 778, 778, 778, 570, 778, 722, 722, 722, 722, 722, 611, 556,
    500, 500, 500, 500, 500, 500, 722, 444, 444, 444, 444, 444, 278, 278, 278, 278,
    500, 556, 500, 500, 500, 500, 500, 570, 500, 556, 556, 556, 556, 500, 556, 500,
];

#[rustfmt::skip]
const TIMES_ITALIC_HIGH_WIDTHS: [u16; 128] = [
    500, 0, 333, 500, 556, 889, 500, 500, 333, 1000, 500, 333, 944, 0, 556, 0,
    0, 333, 333, 556, 556, 350, 500, 889, 333, 980, 389, 333, 667, 0, 389, 556,
    250, 389, 500, 500, 500, 500, 275, 500, 333, 760, 276, 500, 675, 333, 760, 333,
    400, 675, 300, 300, 333, 500, 523, 250, 333, 300, 310, 500, 750, 750, 750, 500,
    611, 611, 611, 611, 611, 611, 889, 667, 611, 611, 611, 611, 333, 333, 333, 333,
    722, 667, 722, 722, 722, 722, 722, 675, 722, 722, 722, 722, 722, 556, 611, 500,
    500, 500, 500, 500, 500, 500, 667, 444, 444, 444, 444, 444, 278, 278, 278, 278,
    500, 500, 500, 500, 500, 500, 500, 675, 500, 500, 500, 500, 500, 444, 500, 444,
];

#[rustfmt::skip]
const TIMES_BOLD_ITALIC_HIGH_WIDTHS: [u16; 128] = [
    500, 0, 333, 500, 500, 1000, 500, 500, 333, 1000, 556, 333, 944, 0, 611, 0,
    0, 333, 333, 500, 500, 350, 500, 1000, 333, 1000, 389, 333, 722, 0, 389, 611,
    250, 389, 500, 500, 500, 500, 220, 500, 333, 747, 266, 500, 606, 333, 747, 333,
    400, 570, 300, 300, 333, 576, 500, 250, 333, 300, 300, 500, 750, 750, 750, 500,
    667, 667, 667, 667, 667, 667, 944, 667, 667, 667, 667, 667, 389, 389, 389, 389,
    722, 722, 722, 722, 722, 722, 722, 570, 722, 722, 722, 722, 722, 611, 611, 500,
    500, 500, 500, 500, 500, 500, 722, 444, 444, 444, 444, 444, 278, 278, 278, 278,
    500, 556, 500, 500, 500, 500, 500, 570, 500, 556, 556, 556, 556, 444, 500, 444,
];
