//! Layout JSON: a saved field arrangement

use serde::{Deserialize, Serialize};

use crate::schema::{unique_field_id, Field};
use crate::{Result, TemplateError};

/// Current layout document version
pub const LAYOUT_VERSION: &str = "1.0";

/// Saved field arrangement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    /// Schema version
    #[serde(default = "default_version")]
    pub version: String,

    /// Placed fields
    #[serde(default)]
    pub fields: Vec<Field>,

    /// Scale ratio the positions were captured at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_ratio: Option<f64>,
}

fn default_version() -> String {
    LAYOUT_VERSION.to_string()
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            version: default_version(),
            fields: Vec::new(),
            scale_ratio: None,
        }
    }
}

impl Layout {
    pub fn new(fields: Vec<Field>, scale_ratio: Option<f64>) -> Self {
        Self {
            fields,
            scale_ratio,
            ..Default::default()
        }
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Parse a layout from a JSON string
///
/// Field ids are re-derived from the column names and a repeated column
/// keeps only its first field, so ids stay unique and deterministic
/// whatever the document says.
pub fn parse_layout(json: &str) -> Result<Layout> {
    let mut layout: Layout =
        serde_json::from_str(json).map_err(|e| TemplateError::SourceParse(e.to_string()))?;

    let mut fields: Vec<Field> = Vec::with_capacity(layout.fields.len());
    for mut field in layout.fields.drain(..) {
        if fields.iter().any(|f| f.name == field.name) {
            continue;
        }
        field.id = unique_field_id(&field.name, &fields);
        fields.push(field);
    }
    layout.fields = fields;

    Ok(layout)
}
