//! PDF Document wrapper

use crate::font::encode_win_ansi;
use crate::text::{generate_text_operators, TextRenderContext};
use crate::{Align, PdfError, Result, StandardFont};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Prefix for font resource names added to a page
const FONT_RESOURCE_PREFIX: &str = "CF";

/// Maximum depth followed when resolving inherited page attributes
const MAX_INHERITANCE_DEPTH: usize = 10;

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create color from RGB values (0-255)
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: f32::from(r) / 255.0,
            g: f32::from(g) / 255.0,
            b: f32::from(b) / 255.0,
        }
    }

    /// Black color
    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

/// PDF Document wrapper providing high-level operations
pub struct PdfDocument {
    /// The underlying lopdf document
    inner: Document,
    /// Current font face
    current_font: Option<StandardFont>,
    /// Current font size
    current_font_size: f32,
    /// Current text color
    current_text_color: Color,
    /// Whether inserted text is underlined
    current_underline: bool,
    /// Font dictionaries added to the document (face -> PDF object ID)
    font_objects: HashMap<StandardFont, ObjectId>,
    /// Page font resources (page number -> face -> resource name)
    page_font_resources: HashMap<usize, HashMap<StandardFont, String>>,
    /// Buffered content operators per page (page number -> operators)
    page_content_buffer: HashMap<usize, Vec<u8>>,
}

impl PdfDocument {
    /// Open a PDF document from bytes
    ///
    /// # Arguments
    /// * `data` - PDF file bytes
    pub fn open_from_bytes(data: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(data).map_err(|e| PdfError::OpenError(e.to_string()))?;

        if inner.get_pages().is_empty() {
            return Err(PdfError::OpenError("document has no pages".to_string()));
        }

        Ok(Self {
            inner,
            current_font: None,
            current_font_size: 12.0,
            current_text_color: Color::default(),
            current_underline: false,
            font_objects: HashMap::new(),
            page_font_resources: HashMap::new(),
            page_content_buffer: HashMap::new(),
        })
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// Get the page dimensions in points
    ///
    /// Reads the MediaBox (or CropBox), following the parent chain for
    /// inherited values.
    pub fn page_size(&self, page: usize) -> Result<PageSize> {
        let page_id = self.page_id(page)?;
        let media_box = self.get_inherited_media_box(page_id)?;

        if media_box.len() < 4 {
            return Err(PdfError::ParseError("Invalid MediaBox format".to_string()));
        }

        let mut coords = [0.0f64; 4];
        for (slot, obj) in coords.iter_mut().zip(&media_box) {
            *slot = number(obj)
                .ok_or_else(|| PdfError::ParseError("Invalid MediaBox entry".to_string()))?;
        }

        Ok(PageSize {
            width: (coords[2] - coords[0]).abs(),
            height: (coords[3] - coords[1]).abs(),
        })
    }

    /// Set current font and size for subsequent text insertions
    pub fn set_font(&mut self, font: StandardFont, size: f32) {
        self.current_font = Some(font);
        self.current_font_size = size;
    }

    /// Get the current font face
    pub fn current_font(&self) -> Option<StandardFont> {
        self.current_font
    }

    /// Set text color for subsequent text insertions
    pub fn set_text_color(&mut self, color: Color) {
        self.current_text_color = color;
    }

    /// Enable or disable underlining for subsequent text insertions
    pub fn set_underline(&mut self, underline: bool) {
        self.current_underline = underline;
    }

    /// Get current font's text width for a string
    ///
    /// # Returns
    /// Width in points
    pub fn text_width(&self, text: &str) -> Result<f64> {
        let font = self.current_font.ok_or(PdfError::FontNotSet)?;
        font.text_width(text, self.current_font_size)
    }

    /// Insert text at a specific position
    ///
    /// The text is validated against the current font before anything is
    /// added to the page, so a failed insert leaves the document unchanged.
    ///
    /// # Arguments
    /// * `text` - Text to insert
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points (from left)
    /// * `y` - Y coordinate of the baseline in points (from bottom)
    /// * `align` - Text alignment relative to `x`
    pub fn insert_text(
        &mut self,
        text: &str,
        page: usize,
        x: f64,
        y: f64,
        align: Align,
    ) -> Result<()> {
        let page_count = self.page_count();
        if page == 0 || page > page_count {
            return Err(PdfError::InvalidPage(page, page_count));
        }

        // Skip empty text - nothing to render
        if text.is_empty() {
            return Ok(());
        }

        let font = self.current_font.ok_or(PdfError::FontNotSet)?;
        let encoded = encode_win_ansi(text, font)?;
        let text_width = font.text_width(text, self.current_font_size)?;

        let font_resource_name = self.get_or_create_font_ref(font, page)?;

        let ctx = TextRenderContext {
            font_name: font_resource_name,
            font_size: self.current_font_size,
            text_width,
            color: self.current_text_color,
            underline: self.current_underline.then(|| font.underline_metrics()),
        };

        let start_x = x + align.offset(text_width);
        let operators = generate_text_operators(&encoded, start_x, y, &ctx);
        self.buffer_content(page, &operators);

        Ok(())
    }

    /// Save the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.flush_content_buffers()?;
        self.finalize_page_font_resources()?;

        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;

        Ok(buffer)
    }

    /// Get a reference to the underlying lopdf document
    pub fn inner(&self) -> &Document {
        &self.inner
    }

    /// Get or create a font reference for a specific page
    ///
    /// Returns the resource name (e.g., "CF1") for use in content streams.
    /// Names already present in the page's own font resources are skipped.
    fn get_or_create_font_ref(&mut self, font: StandardFont, page: usize) -> Result<String> {
        if let Some(name) = self
            .page_font_resources
            .get(&page)
            .and_then(|fonts| fonts.get(&font))
        {
            return Ok(name.clone());
        }

        let page_id = self.page_id(page)?;
        let existing = self.font_dictionary(&self.resolved_resources(page_id)?)?;

        let assigned = self.page_font_resources.entry(page).or_default();
        let mut n = assigned.len() + 1;
        let resource_name = loop {
            let candidate = format!("{FONT_RESOURCE_PREFIX}{n}");
            let taken = existing.has(candidate.as_bytes())
                || assigned.values().any(|name| *name == candidate);
            if !taken {
                break candidate;
            }
            n += 1;
        };

        if !self.font_objects.contains_key(&font) {
            let id = self.inner.add_object(font.to_pdf_dictionary());
            self.font_objects.insert(font, id);
        }

        debug!(
            font = font.base_font_name(),
            resource = %resource_name,
            page,
            "registered font resource"
        );
        assigned.insert(font, resource_name.clone());

        Ok(resource_name)
    }

    /// Add registered font references to each page's Resources dictionary
    fn finalize_page_font_resources(&mut self) -> Result<()> {
        let pages: Vec<(usize, Vec<(StandardFont, String)>)> = self
            .page_font_resources
            .drain()
            .map(|(page, fonts)| (page, fonts.into_iter().collect()))
            .collect();

        for (page, fonts) in pages {
            if !fonts.is_empty() {
                self.add_fonts_to_page_resources(page, &fonts)?;
            }
        }

        Ok(())
    }

    /// Add multiple fonts to a page's Resources dictionary in a single operation
    ///
    /// Inherited or referenced resources are copied onto the page so the
    /// template's own fonts, images and graphics states stay reachable.
    fn add_fonts_to_page_resources(
        &mut self,
        page: usize,
        fonts: &[(StandardFont, String)],
    ) -> Result<()> {
        let page_id = self.page_id(page)?;

        let mut resources_dict = self.resolved_resources(page_id)?;
        let mut font_dict = self.font_dictionary(&resources_dict)?;

        for (font, resource_name) in fonts {
            let font_ref = self
                .font_objects
                .get(font)
                .ok_or_else(|| PdfError::SaveError(format!("{} not added", font.base_font_name())))?;
            font_dict.set(resource_name.as_bytes(), Object::Reference(*font_ref));
        }

        resources_dict.set("Font", Object::Dictionary(font_dict));

        let mut page_dict = self.page_dictionary(page_id)?;
        page_dict.set("Resources", Object::Dictionary(resources_dict));
        self.inner.objects.insert(page_id, page_dict.into());

        Ok(())
    }

    /// Resolve a page's Resources dictionary, following references and the
    /// parent chain. Returns an empty dictionary when none is present.
    fn resolved_resources(&self, page_id: ObjectId) -> Result<Dictionary> {
        let mut current_id = page_id;

        for _ in 0..MAX_INHERITANCE_DEPTH {
            let dict = self.page_dictionary(current_id)?;

            if let Ok(resources) = dict.get(b"Resources") {
                return self.deref_dictionary(resources);
            }

            match dict.get(b"Parent") {
                Ok(Object::Reference(parent_id)) => current_id = *parent_id,
                _ => break,
            }
        }

        Ok(Dictionary::new())
    }

    /// Get the Font sub-dictionary of a Resources dictionary
    fn font_dictionary(&self, resources: &Dictionary) -> Result<Dictionary> {
        match resources.get(b"Font") {
            Ok(font) => self.deref_dictionary(font),
            Err(_) => Ok(Dictionary::new()),
        }
    }

    /// Clone a dictionary that may be stored inline or behind a reference
    fn deref_dictionary(&self, obj: &Object) -> Result<Dictionary> {
        match obj {
            Object::Dictionary(dict) => Ok(dict.clone()),
            Object::Reference(id) => match self.inner.get_object(*id)? {
                Object::Dictionary(dict) => Ok(dict.clone()),
                _ => Err(PdfError::ParseError(
                    "Referenced object is not a dictionary".to_string(),
                )),
            },
            _ => Err(PdfError::ParseError("Object is not a dictionary".to_string())),
        }
    }

    fn page_id(&self, page: usize) -> Result<ObjectId> {
        let pages: BTreeMap<u32, ObjectId> = self.inner.get_pages();
        u32::try_from(page)
            .ok()
            .and_then(|number| pages.get(&number).copied())
            .ok_or(PdfError::InvalidPage(page, pages.len()))
    }

    fn page_dictionary(&self, id: ObjectId) -> Result<Dictionary> {
        self.inner
            .get_object(id)?
            .as_dict()
            .cloned()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))
    }

    /// Get MediaBox, following parent inheritance chain if needed
    ///
    /// CropBox is used only when no MediaBox is found anywhere in the chain.
    fn get_inherited_media_box(&self, page_id: ObjectId) -> Result<Vec<Object>> {
        if let Some(media_box) = self.inherited_box(page_id, b"MediaBox")? {
            return Ok(media_box);
        }
        if let Some(crop_box) = self.inherited_box(page_id, b"CropBox")? {
            return Ok(crop_box);
        }

        // Fallback: assume A4 page size
        Ok(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(595.28),
            Object::Real(841.89),
        ])
    }

    /// Find a page box entry on the page or its nearest ancestor
    fn inherited_box(&self, page_id: ObjectId, key: &[u8]) -> Result<Option<Vec<Object>>> {
        let mut current_id = page_id;

        for _ in 0..MAX_INHERITANCE_DEPTH {
            let dict = self.page_dictionary(current_id)?;

            if let Ok(page_box) = dict.get(key) {
                let name = String::from_utf8_lossy(key);
                return match page_box {
                    Object::Array(arr) => Ok(Some(arr.clone())),
                    Object::Reference(ref_id) => self
                        .inner
                        .get_object(*ref_id)?
                        .as_array()
                        .cloned()
                        .map(Some)
                        .map_err(|_| {
                            PdfError::ParseError(format!("{name} reference is not an array"))
                        }),
                    _ => Err(PdfError::ParseError(format!("{name} is not an array"))),
                };
            }

            match dict.get(b"Parent") {
                Ok(Object::Reference(parent_id)) => current_id = *parent_id,
                _ => break,
            }
        }

        Ok(None)
    }

    /// Buffer content operators for a page (written at save time)
    fn buffer_content(&mut self, page: usize, content: &[u8]) {
        self.page_content_buffer
            .entry(page)
            .or_default()
            .extend_from_slice(content);
    }

    /// Flush all buffered content to page streams
    fn flush_content_buffers(&mut self) -> Result<()> {
        let buffers: Vec<(usize, Vec<u8>)> = self.page_content_buffer.drain().collect();

        for (page, content) in buffers {
            if !content.is_empty() {
                self.append_to_content_stream(page, &content)?;
            }
        }

        Ok(())
    }

    /// Append content to a page's content stream
    ///
    /// The existing content is wrapped in `q ... Q` so any transformation
    /// it leaves behind does not apply to the appended operators. Content
    /// that cannot be decoded is kept by reference and bracketed by new
    /// streams instead of being rewritten.
    fn append_to_content_stream(&mut self, page: usize, content: &[u8]) -> Result<()> {
        let page_id = self.page_id(page)?;
        let mut page_dict = self.page_dictionary(page_id)?;
        let contents = page_dict.get(b"Contents").ok().cloned();

        let new_contents = match contents {
            None => Object::Reference(self.add_content_stream(content.to_vec())),
            Some(original) => match self.stream_content(&original) {
                Some(existing) => {
                    let mut new_content =
                        Vec::with_capacity(existing.len() + content.len() + 8);
                    if !existing.is_empty() {
                        new_content.extend_from_slice(b"q\n");
                        new_content.extend_from_slice(&existing);
                        new_content.extend_from_slice(b"\nQ\n");
                    }
                    new_content.extend_from_slice(content);
                    Object::Reference(self.add_content_stream(new_content))
                }
                None => {
                    warn!(page, "page content could not be decoded, keeping it as is");
                    let mut closing = b"\nQ\n".to_vec();
                    closing.extend_from_slice(content);

                    let opening = self.add_content_stream(b"q\n".to_vec());
                    let mut parts = vec![Object::Reference(opening)];
                    parts.extend(self.content_parts(original));
                    parts.push(Object::Reference(self.add_content_stream(closing)));
                    Object::Array(parts)
                }
            },
        };

        page_dict.set("Contents", new_contents);
        self.inner.objects.insert(page_id, page_dict.into());

        Ok(())
    }

    fn add_content_stream(&mut self, content: Vec<u8>) -> ObjectId {
        self.inner.add_object(Stream::new(Dictionary::new(), content))
    }

    /// Contents entry as a list of stream references
    fn content_parts(&mut self, contents: Object) -> Vec<Object> {
        match contents {
            Object::Reference(id) => match self.inner.get_object(id) {
                Ok(Object::Array(arr)) => arr.clone(),
                _ => vec![Object::Reference(id)],
            },
            Object::Array(arr) => arr,
            Object::Stream(stream) => vec![Object::Reference(self.inner.add_object(stream))],
            _ => Vec::new(),
        }
    }

    /// Decoded bytes of a Contents entry (stream, reference, or array)
    ///
    /// `None` when any part uses a filter that cannot be decoded.
    fn stream_content(&self, contents: &Object) -> Option<Vec<u8>> {
        match contents {
            Object::Stream(stream) => decoded(stream),
            Object::Reference(id) => match self.inner.get_object(*id) {
                Ok(Object::Stream(stream)) => decoded(stream),
                Ok(Object::Array(arr)) => self.concat_streams(arr),
                _ => Some(Vec::new()),
            },
            Object::Array(arr) => self.concat_streams(arr),
            _ => Some(Vec::new()),
        }
    }

    fn concat_streams(&self, parts: &[Object]) -> Option<Vec<u8>> {
        let mut combined = Vec::new();
        for part in parts {
            let data = match part {
                Object::Stream(stream) => decoded(stream)?,
                Object::Reference(id) => match self.inner.get_object(*id) {
                    Ok(Object::Stream(stream)) => decoded(stream)?,
                    _ => continue,
                },
                _ => continue,
            };
            combined.extend_from_slice(&data);
            combined.push(b'\n');
        }
        Some(combined)
    }
}

/// Unfiltered or decoded stream bytes, `None` when decoding fails
///
/// A filtered stream that decodes to nothing counts as a failure: lopdf
/// reports some corrupt data as empty output rather than an error.
fn decoded(stream: &Stream) -> Option<Vec<u8>> {
    if stream.dict.get(b"Filter").is_err() {
        return Some(stream.content.clone());
    }
    match stream.decompressed_content() {
        Ok(data) if !data.is_empty() || stream.content.is_empty() => Some(data),
        _ => None,
    }
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}
