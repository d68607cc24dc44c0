//! WASM bindings for certforge
//!
//! This crate provides JavaScript-friendly API for:
//! - Uploading a PDF template and a CSV/spreadsheet dataset
//! - Placing, dragging and styling fields on the preview
//! - Saving and reloading a field layout
//! - Generating every certificate into one zip archive
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import init, { CertificateSession } from 'certforge-wasm';
//!
//! await init();
//!
//! const session = new CertificateSession();
//! const info = session.uploadTemplate(pdfBytes);     // { pageCount, pageWidth, pageHeight }
//! const columns = session.uploadData(csvBytes);      // ["Name", "Course", ...]
//! session.setPreviewWidth(canvas.clientWidth);
//!
//! const field = session.addField("Name");
//! session.moveField(field.id, 120, 340);
//! session.setStyles(field.id, { fontSize: 24, textAlign: "center", color: "#1f2937" });
//!
//! const zip = session.generateArchive((done, total) => progress(done / total));
//! ```

use template::{EditingSession, FieldStyles, Offset, Position};
use wasm_bindgen::prelude::*;

// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Certificate editing session
#[wasm_bindgen]
pub struct CertificateSession {
    inner: EditingSession,
}

#[wasm_bindgen]
impl CertificateSession {
    /// Create an empty session
    #[wasm_bindgen(constructor)]
    pub fn new() -> CertificateSession {
        CertificateSession {
            inner: EditingSession::new(),
        }
    }

    /// Load the template PDF
    ///
    /// Clears every placed field.
    ///
    /// @param data - PDF file bytes (Uint8Array)
    /// @returns { pageCount, pageWidth, pageHeight }
    #[wasm_bindgen(js_name = uploadTemplate)]
    pub fn upload_template(&mut self, data: &[u8]) -> Result<JsValue, JsValue> {
        let template = self.inner.upload_template(data.to_vec()).map_err(js_error)?;
        Ok(serde_wasm_bindgen::to_value(&template.info())?)
    }

    /// Load the dataset (CSV, xlsx, xls or ods)
    ///
    /// Clears every placed field.
    ///
    /// @param data - File bytes (Uint8Array)
    /// @returns Array of column names
    #[wasm_bindgen(js_name = uploadData)]
    pub fn upload_data(&mut self, data: &[u8]) -> Result<JsValue, JsValue> {
        let columns = self.inner.upload_dataset(data).map_err(js_error)?;
        Ok(serde_wasm_bindgen::to_value(columns)?)
    }

    /// Number of rows in the dataset
    #[wasm_bindgen(js_name = rowCount)]
    pub fn row_count(&self) -> usize {
        self.inner.dataset().map_or(0, |d| d.len())
    }

    /// Place a field for a column (returns the existing one if already placed)
    ///
    /// @param column - Column name
    /// @returns Field object
    #[wasm_bindgen(js_name = addField)]
    pub fn add_field(&mut self, column: &str) -> Result<JsValue, JsValue> {
        let field = self.inner.add_field(column).map_err(js_error)?;
        Ok(serde_wasm_bindgen::to_value(field)?)
    }

    /// Remove the field for a column
    ///
    /// @returns true if a field was removed
    #[wasm_bindgen(js_name = removeField)]
    pub fn remove_field(&mut self, column: &str) -> bool {
        self.inner.remove_field(column)
    }

    /// Move a field to a display position (preview pixels, unzoomed)
    #[wasm_bindgen(js_name = moveField)]
    pub fn move_field(&mut self, id: &str, x: f64, y: f64) -> Result<(), JsValue> {
        self.inner
            .set_position(id, Position::new(x, y))
            .map_err(js_error)
    }

    /// Move a field by a pointer delta in screen pixels
    ///
    /// @returns New position { x, y }
    #[wasm_bindgen(js_name = dragField)]
    pub fn drag_field(&mut self, id: &str, dx: f64, dy: f64) -> Result<JsValue, JsValue> {
        let position = self.inner.drag_field(id, dx, dy).map_err(js_error)?;
        Ok(serde_wasm_bindgen::to_value(&position)?)
    }

    /// Replace a field's styles
    ///
    /// @param styles - { fontFamily, fontSize, fontWeight, fontStyle,
    ///                   underline, textAlign, color: "#rrggbb" }
    #[wasm_bindgen(js_name = setStyles)]
    pub fn set_styles(&mut self, id: &str, styles: JsValue) -> Result<(), JsValue> {
        let styles: FieldStyles = serde_wasm_bindgen::from_value(styles)?;
        self.inner.set_styles(id, styles).map_err(js_error)
    }

    /// Set a field's render-time correction in PDF points
    #[wasm_bindgen(js_name = setFineTuneOffset)]
    pub fn set_fine_tune_offset(&mut self, id: &str, dx: f64, dy: f64) -> Result<(), JsValue> {
        self.inner
            .set_fine_tune_offset(id, Offset::new(dx, dy))
            .map_err(js_error)
    }

    /// Set the preview zoom (clamped to 0.5 - 2.0)
    ///
    /// @returns Zoom in effect
    #[wasm_bindgen(js_name = setZoom)]
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        self.inner.set_zoom(zoom)
    }

    /// Report the unzoomed preview width in pixels
    ///
    /// @returns Scale ratio (0 until a template is loaded)
    #[wasm_bindgen(js_name = setPreviewWidth)]
    pub fn set_preview_width(&mut self, width: f64) -> f64 {
        self.inner.set_preview_width(width)
    }

    /// All placed fields
    pub fn fields(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(self.inner.fields())?)
    }

    /// Current layout as JSON
    #[wasm_bindgen(js_name = layoutJson)]
    pub fn layout_json(&self) -> Result<String, JsValue> {
        self.inner.layout().to_json().map_err(js_error)
    }

    /// Replace the fields with a saved layout
    ///
    /// @returns Number of fields applied
    #[wasm_bindgen(js_name = loadLayout)]
    pub fn load_layout(&mut self, json: &str) -> Result<usize, JsValue> {
        let layout = template::parse_layout(json).map_err(js_error)?;
        Ok(self.inner.apply_layout(layout))
    }

    /// Render one certificate per row and bundle them into a zip
    ///
    /// Rows that fail are reported in the console and left out of the
    /// archive.
    ///
    /// @param onProgress - Optional callback (done, total)
    /// @returns Zip bytes (Uint8Array)
    #[wasm_bindgen(js_name = generateArchive)]
    pub fn generate_archive(
        &self,
        on_progress: Option<js_sys::Function>,
    ) -> Result<Vec<u8>, JsValue> {
        let run = self.inner.run_batch().map_err(js_error)?;

        let report = run.collect_report_with(|done, total| {
            if let Some(callback) = &on_progress {
                let done = JsValue::from(done as u32);
                let total = JsValue::from(total as u32);
                if let Err(e) = callback.call2(&JsValue::NULL, &done, &total) {
                    web_sys::console::warn_2(&"progress callback failed:".into(), &e);
                }
            }
        });

        for failure in &report.failures {
            web_sys::console::warn_1(
                &format!("{}: {}", failure.file_name, failure.error).into(),
            );
        }

        report.to_archive().map_err(js_error)
    }
}

impl Default for CertificateSession {
    fn default() -> Self {
        Self::new()
    }
}
