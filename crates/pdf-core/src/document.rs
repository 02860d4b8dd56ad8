//! PDF Document wrapper

use crate::font::{FontData, PdfFont, StandardFont};
use crate::image::{generate_image_operators, EmbeddedImage, ImageFormat, ImageXObject};
use crate::text::{generate_rect_operators, generate_text_operators, TextRenderContext};
use crate::{Align, PdfError, Result, A4_SIZE};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};

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

    /// Black color
    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    /// White color
    pub fn white() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// PDF Document wrapper providing high-level operations
///
/// Drawing is buffered per page and written out by `to_bytes`, which appends
/// a single content stream to each touched page.
pub struct PdfDocument {
    /// The underlying lopdf document
    inner: Document,
    /// Registered fonts (name -> font)
    fonts: HashMap<String, PdfFont>,
    /// Current font name
    current_font: Option<String>,
    /// Current font size
    current_font_size: f32,
    /// Current text color
    current_text_color: Color,
    /// Embedded fonts (font name -> PDF object ID)
    embedded_fonts: HashMap<String, ObjectId>,
    /// Page font resources (page number -> font name -> resource name)
    page_font_resources: BTreeMap<usize, BTreeMap<String, String>>,
    /// Next font resource number
    next_font_resource: u32,
    /// Embedded images (data hash -> image)
    embedded_images: HashMap<u64, EmbeddedImage>,
    /// Page image resources (page number -> object ID -> resource name)
    page_image_resources: HashMap<usize, HashMap<ObjectId, String>>,
    /// Next image resource number
    next_image_resource: u32,
    /// Buffered content operators per page (page number -> operators)
    page_content_buffer: BTreeMap<usize, Vec<u8>>,
}

impl PdfDocument {
    /// Open a PDF document from bytes
    ///
    /// # Arguments
    /// * `data` - PDF file bytes
    pub fn open_from_bytes(data: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(data).map_err(|e| PdfError::OpenError(e.to_string()))?;

        Ok(Self {
            inner,
            fonts: HashMap::new(),
            current_font: None,
            current_font_size: 12.0,
            current_text_color: Color::default(),
            embedded_fonts: HashMap::new(),
            page_font_resources: BTreeMap::new(),
            next_font_resource: 1,
            embedded_images: HashMap::new(),
            page_image_resources: HashMap::new(),
            next_image_resource: 1,
            page_content_buffer: BTreeMap::new(),
        })
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// Add a TrueType font to the document
    ///
    /// # Arguments
    /// * `name` - Font identifier (used in set_font)
    /// * `ttf_data` - TrueType font file bytes
    pub fn add_font(&mut self, name: &str, ttf_data: &[u8]) -> Result<()> {
        if self.fonts.contains_key(name) {
            return Err(PdfError::FontAlreadyExists(name.to_string()));
        }

        let font_data = FontData::from_ttf(name, ttf_data)?;
        self.fonts
            .insert(name.to_string(), PdfFont::TrueType(font_data));

        Ok(())
    }

    /// Register one of the standard Type1 fonts under a name
    ///
    /// Standard fonts are not embedded; only a font dictionary is written.
    pub fn add_standard_font(&mut self, name: &str, font: StandardFont) -> Result<()> {
        if self.fonts.contains_key(name) {
            return Err(PdfError::FontAlreadyExists(name.to_string()));
        }

        self.fonts.insert(name.to_string(), PdfFont::Standard(font));
        Ok(())
    }

    /// Set the current font and size
    ///
    /// # Arguments
    /// * `name` - Font identifier registered with `add_font` or `add_standard_font`
    /// * `size` - Font size in points
    pub fn set_font(&mut self, name: &str, size: f32) -> Result<()> {
        if !self.fonts.contains_key(name) {
            return Err(PdfError::FontNotFound(name.to_string()));
        }

        self.current_font = Some(name.to_string());
        self.current_font_size = size;

        Ok(())
    }

    /// Set the text color
    pub fn set_text_color(&mut self, color: Color) {
        self.current_text_color = color;
    }

    fn current_font(&self) -> Result<(&str, &PdfFont)> {
        let name = self
            .current_font
            .as_deref()
            .ok_or_else(|| PdfError::FontNotFound("No font set".to_string()))?;
        let font = self
            .fonts
            .get(name)
            .ok_or_else(|| PdfError::FontNotFound(name.to_string()))?;
        Ok((name, font))
    }

    /// Insert text at a specific position
    ///
    /// # Arguments
    /// * `text` - Text to insert
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points
    /// * `y` - Baseline Y coordinate in points (from bottom)
    /// * `align` - Which point of the text run `x` refers to
    pub fn insert_text(
        &mut self,
        text: &str,
        page: usize,
        x: f64,
        y: f64,
        align: Align,
    ) -> Result<()> {
        self.check_page(page)?;

        // Nothing to render
        if text.is_empty() {
            return Ok(());
        }

        let font_name = self.current_font()?.0.to_string();
        let font_size = self.current_font_size;

        let (text_width, operand) = {
            let font = self
                .fonts
                .get_mut(&font_name)
                .ok_or_else(|| PdfError::FontNotFound(font_name.clone()))?;
            font.add_chars(text);
            (
                font.text_width_points(text, font_size) as f64,
                font.encode_text(text),
            )
        };

        let font_resource_name = self.get_or_create_font_ref(&font_name, page)?;

        let ctx = TextRenderContext {
            font_name: font_resource_name,
            font_size,
            text_width,
            color: self.current_text_color,
        };
        let operators = generate_text_operators(&operand, x, y, align, &ctx);
        self.buffer_content(page, &operators);

        Ok(())
    }

    /// Paint a filled rectangle
    ///
    /// `(x, y)` is the bottom-left corner in PDF coordinates.
    pub fn insert_rect(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
    ) -> Result<()> {
        self.check_page(page)?;
        let operators = generate_rect_operators(x, y, width, height, color);
        self.buffer_content(page, &operators);
        Ok(())
    }

    /// Add an image to the document without drawing it
    ///
    /// Identical data is embedded once; later calls return the same object.
    pub fn embed_image(&mut self, data: &[u8], format: ImageFormat) -> Result<EmbeddedImage> {
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        format.hash(&mut hasher);
        let data_hash = hasher.finish();

        if let Some(image) = self.embedded_images.get(&data_hash) {
            return Ok(*image);
        }

        let xobject = ImageXObject::from_format(data, format)?;
        let object_id = self.inner.add_object(xobject.to_pdf_stream());

        let image = EmbeddedImage {
            object_id,
            width: xobject.width,
            height: xobject.height,
        };
        self.embedded_images.insert(data_hash, image);

        Ok(image)
    }

    /// Draw an embedded image
    ///
    /// # Arguments
    /// * `image` - Image returned by `embed_image`
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate of the bottom-left corner in points
    /// * `y` - Y coordinate of the bottom-left corner in points (from bottom)
    /// * `width` - Image width in points
    /// * `height` - Image height in points
    pub fn insert_image(
        &mut self,
        image: &EmbeddedImage,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()> {
        self.check_page(page)?;

        let image_resource_name = self.get_or_create_image_ref(image.object_id, page)?;
        let operators = generate_image_operators(&image_resource_name, x, y, width, height);
        self.buffer_content(page, &operators);

        Ok(())
    }

    /// Save the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.flush_content_buffers()?;
        self.embed_fonts()?;

        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;

        Ok(buffer)
    }

    /// Get page size in points (width, height)
    ///
    /// Uses the MediaBox (or CropBox), following inheritance from parent Pages nodes.
    pub fn page_size(&self, page: usize) -> Result<(f64, f64)> {
        let page_id = self.page_id(page)?;
        let media_box = self.get_inherited_media_box(page_id)?;

        if media_box.len() < 4 {
            return Err(PdfError::ParseError("Invalid MediaBox format".to_string()));
        }

        let coord = |i: usize| -> Result<f64> {
            number(&media_box[i])
                .ok_or_else(|| PdfError::ParseError(format!("Invalid MediaBox entry {i}")))
        };
        let (x1, y1, x2, y2) = (coord(0)?, coord(1)?, coord(2)?, coord(3)?);

        Ok(((x2 - x1).abs(), (y2 - y1).abs()))
    }

    fn check_page(&self, page: usize) -> Result<()> {
        let page_count = self.page_count();
        if page == 0 || page > page_count {
            return Err(PdfError::InvalidPage(page, page_count));
        }
        Ok(())
    }

    fn page_id(&self, page: usize) -> Result<ObjectId> {
        let pages = self.inner.get_pages();
        pages
            .get(&(page as u32))
            .copied()
            .ok_or(PdfError::InvalidPage(page, pages.len()))
    }

    /// Get MediaBox, following parent inheritance chain if needed
    fn get_inherited_media_box(&self, page_id: ObjectId) -> Result<Vec<Object>> {
        let mut current_id = page_id;

        // Follow parent chain up to 10 levels
        for _ in 0..10 {
            let dict = self.dict_at(current_id)?;

            if let Ok(media_box) = dict.get(b"MediaBox").or_else(|_| dict.get(b"CropBox")) {
                let media_box_array = match media_box {
                    Object::Array(arr) => arr.clone(),
                    Object::Reference(ref_id) => self
                        .inner
                        .get_object(*ref_id)?
                        .as_array()
                        .map_err(|_| {
                            PdfError::ParseError("MediaBox reference is not an array".to_string())
                        })?
                        .clone(),
                    _ => return Err(PdfError::ParseError("MediaBox is not an array".to_string())),
                };
                return Ok(media_box_array);
            }

            match dict.get(b"Parent") {
                Ok(Object::Reference(parent_id)) => current_id = *parent_id,
                _ => break,
            }
        }

        // Fallback: assume A4 page size
        Ok(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(A4_SIZE.0 as f32),
            Object::Real(A4_SIZE.1 as f32),
        ])
    }

    /// Get the Resources dictionary in effect for a page
    ///
    /// Resources may be inherited from a parent Pages node and may be indirect.
    fn get_inherited_resources(&self, page_id: ObjectId) -> Result<Dictionary> {
        let mut current_id = page_id;

        for _ in 0..10 {
            let dict = self.dict_at(current_id)?;

            if let Ok(resources) = dict.get(b"Resources") {
                return Ok(self.resolve_dict(resources).unwrap_or_else(Dictionary::new));
            }

            match dict.get(b"Parent") {
                Ok(Object::Reference(parent_id)) => current_id = *parent_id,
                _ => break,
            }
        }

        Ok(Dictionary::new())
    }

    fn dict_at(&self, id: ObjectId) -> Result<&Dictionary> {
        self.inner
            .get_object(id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Object is not a dictionary".to_string()))
    }

    fn resolve_dict(&self, obj: &Object) -> Option<Dictionary> {
        match obj {
            Object::Dictionary(dict) => Some(dict.clone()),
            Object::Reference(id) => self
                .inner
                .get_object(*id)
                .ok()
                .and_then(|o| o.as_dict().ok())
                .cloned(),
            _ => None,
        }
    }

    /// Pick a resource name that the page does not already use
    fn free_resource_name(
        &self,
        page: usize,
        category: &[u8],
        prefix: &str,
        mut counter: u32,
    ) -> Result<(String, u32)> {
        let resources = self.get_inherited_resources(self.page_id(page)?)?;
        let existing = resources
            .get(category)
            .ok()
            .and_then(|obj| self.resolve_dict(obj))
            .unwrap_or_else(Dictionary::new);

        loop {
            let name = format!("{prefix}{counter}");
            counter += 1;
            if !existing.has(name.as_bytes()) {
                return Ok((name, counter));
            }
        }
    }

    /// Register objects under a resource category of a page's Resources
    ///
    /// Inherited or indirect resources are copied inline into the page so
    /// the template's own resources stay reachable.
    fn add_page_resources(
        &mut self,
        page: usize,
        category: &[u8],
        entries: &[(String, ObjectId)],
    ) -> Result<()> {
        let page_id = self.page_id(page)?;
        let mut resources = self.get_inherited_resources(page_id)?;

        let mut category_dict = resources
            .get(category)
            .ok()
            .and_then(|obj| self.resolve_dict(obj))
            .unwrap_or_else(Dictionary::new);
        for (name, object_id) in entries {
            category_dict.set(name.as_bytes(), Object::Reference(*object_id));
        }
        resources.set(category, Object::Dictionary(category_dict));

        let mut page_dict = self.dict_at(page_id)?.clone();
        page_dict.set("Resources", Object::Dictionary(resources));
        self.inner.objects.insert(page_id, page_dict.into());

        Ok(())
    }

    /// Get or create a font reference for a specific page
    ///
    /// Returns the resource name (e.g., "F1", "F2") for use in content streams.
    /// The font itself is embedded at save time.
    fn get_or_create_font_ref(&mut self, font_name: &str, page: usize) -> Result<String> {
        if let Some(resource_name) = self
            .page_font_resources
            .get(&page)
            .and_then(|fonts| fonts.get(font_name))
        {
            return Ok(resource_name.clone());
        }

        let (resource_name, next) =
            self.free_resource_name(page, b"Font", "F", self.next_font_resource)?;
        self.next_font_resource = next;

        self.page_font_resources
            .entry(page)
            .or_default()
            .insert(font_name.to_string(), resource_name.clone());

        Ok(resource_name)
    }

    /// Get or create an image reference for a specific page
    ///
    /// Returns the resource name (e.g., "Im1", "Im2").
    fn get_or_create_image_ref(&mut self, object_id: ObjectId, page: usize) -> Result<String> {
        if let Some(name) = self
            .page_image_resources
            .get(&page)
            .and_then(|images| images.get(&object_id))
        {
            return Ok(name.clone());
        }

        let (resource_name, next) =
            self.free_resource_name(page, b"XObject", "Im", self.next_image_resource)?;
        self.next_image_resource = next;

        self.page_image_resources
            .entry(page)
            .or_default()
            .insert(object_id, resource_name.clone());
        self.add_page_resources(page, b"XObject", &[(resource_name.clone(), object_id)])?;

        Ok(resource_name)
    }

    /// Embed all used fonts and register them with their pages
    fn embed_fonts(&mut self) -> Result<()> {
        self.embedded_fonts.clear();

        let mut font_names: Vec<String> = self
            .page_font_resources
            .values()
            .flat_map(|fonts| fonts.keys().cloned())
            .collect();
        font_names.sort();
        font_names.dedup();

        for font_name in font_names {
            let font_id = self.embed_font_object(&font_name)?;
            self.embedded_fonts.insert(font_name, font_id);
        }

        let page_resources: Vec<(usize, Vec<(String, ObjectId)>)> = self
            .page_font_resources
            .iter()
            .map(|(&page, fonts)| {
                let entries = fonts
                    .iter()
                    .filter_map(|(font_name, resource_name)| {
                        self.embedded_fonts
                            .get(font_name)
                            .map(|id| (resource_name.clone(), *id))
                    })
                    .collect();
                (page, entries)
            })
            .collect();

        for (page, entries) in page_resources {
            if !entries.is_empty() {
                self.add_page_resources(page, b"Font", &entries)?;
            }
        }

        Ok(())
    }

    /// Embed a single font object into the PDF
    fn embed_font_object(&mut self, font_name: &str) -> Result<ObjectId> {
        let font = self
            .fonts
            .get(font_name)
            .ok_or_else(|| PdfError::FontNotFound(font_name.to_string()))?;

        let font_data = match font {
            PdfFont::Standard(standard) => {
                let dict = standard.to_pdf_dictionary();
                return Ok(self.inner.add_object(dict));
            }
            PdfFont::TrueType(font_data) => font_data,
        };

        let font_objects = font_data.to_pdf_objects()?;

        let font_file_id = self.inner.add_object(font_objects.font_file_stream);

        let mut font_descriptor = font_objects.font_descriptor;
        font_descriptor.set("FontFile2", Object::Reference(font_file_id));
        let font_descriptor_id = self.inner.add_object(font_descriptor);

        let mut cid_font = font_objects.cid_font;
        cid_font.set("FontDescriptor", Object::Reference(font_descriptor_id));
        let cid_font_id = self.inner.add_object(cid_font);

        let mut type0_font = font_objects.type0_font;
        type0_font.set(
            "DescendantFonts",
            Object::Array(vec![Object::Reference(cid_font_id)]),
        );

        let tounicode_id = self.inner.add_object(font_objects.tounicode_stream);
        type0_font.set("ToUnicode", Object::Reference(tounicode_id));

        Ok(self.inner.add_object(type0_font))
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
        let buffers = std::mem::take(&mut self.page_content_buffer);

        for (page, content) in buffers {
            if !content.is_empty() {
                self.append_to_content_stream(page, &content)?;
            }
        }

        Ok(())
    }

    /// Append content to a page's content streams
    ///
    /// The template's streams are referenced as they are, never decoded or
    /// rewritten. They are bracketed by a `q` stream and a stream starting
    /// with `Q`, so graphics state they leave behind does not leak into the
    /// appended operators.
    fn append_to_content_stream(&mut self, page: usize, content: &[u8]) -> Result<()> {
        let page_id = self.page_id(page)?;
        let mut page_dict = self.dict_at(page_id)?.clone();

        let existing = match page_dict.get(b"Contents") {
            Ok(Object::Array(arr)) => arr.clone(),
            Ok(Object::Reference(id)) => match self.inner.get_object(*id) {
                Ok(Object::Array(arr)) => arr.clone(),
                _ => vec![Object::Reference(*id)],
            },
            Ok(Object::Null) | Err(_) => Vec::new(),
            Ok(contents) => vec![contents.clone()],
        };

        let mut streams = Vec::with_capacity(existing.len() + 2);
        streams.push(Object::Reference(
            self.inner
                .add_object(Stream::new(Dictionary::new(), b"q\n".to_vec())),
        ));
        for obj in existing {
            match obj {
                Object::Reference(_) => streams.push(obj),
                // Content streams must be indirect
                Object::Stream(stream) => {
                    streams.push(Object::Reference(self.inner.add_object(stream)))
                }
                _ => {
                    return Err(PdfError::ParseError(
                        "Page Contents is not a stream".to_string(),
                    ))
                }
            }
        }

        let mut new_content = Vec::with_capacity(content.len() + 3);
        new_content.extend_from_slice(b"\nQ\n");
        new_content.extend_from_slice(content);
        streams.push(Object::Reference(
            self.inner
                .add_object(Stream::new(Dictionary::new(), new_content)),
        ));

        page_dict.set("Contents", Object::Array(streams));
        self.inner.objects.insert(page_id, page_dict.into());

        Ok(())
    }
}

/// Read a numeric PDF object as f64
fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}
