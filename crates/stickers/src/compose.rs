//! Sticker sheet composition

use crate::fit::fit_font_size;
use crate::layout::SheetLayout;
use crate::source::QrImage;
use crate::{Result, StickerError};
use pdf_core::{mm_to_pt, Align, Color, FontData, PdfDocument, PdfFont, StandardFont, A4_SIZE};
use std::sync::Arc;
use tracing::debug;

/// Page of the template that receives the stickers
const PAGE: usize = 1;

/// Allowed deviation from A4 per dimension, in points
const A4_TOLERANCE_PT: f64 = 2.0;

/// Name the label font is registered under in the output document
const LABEL_FONT: &str = "label";

/// Font used for the label under each QR code
#[derive(Debug, Clone)]
pub enum LabelFont {
    /// One of the built-in PDF fonts, not embedded
    Standard(StandardFont),
    /// A TrueType font embedded into every sheet
    TrueType { name: String, data: Arc<[u8]> },
}

impl Default for LabelFont {
    fn default() -> Self {
        LabelFont::Standard(StandardFont::HelveticaBold)
    }
}

impl LabelFont {
    /// Load and validate a TrueType font
    pub fn truetype(name: &str, data: impl Into<Arc<[u8]>>) -> Result<Self> {
        let data = data.into();
        FontData::from_ttf(name, &data)?;
        Ok(LabelFont::TrueType {
            name: name.to_string(),
            data,
        })
    }

    fn to_pdf_font(&self) -> Result<PdfFont> {
        Ok(match self {
            LabelFont::Standard(font) => PdfFont::Standard(*font),
            LabelFont::TrueType { name, data } => PdfFont::TrueType(FontData::from_ttf(name, data)?),
        })
    }

    fn register(&self, doc: &mut PdfDocument) -> Result<()> {
        match self {
            LabelFont::Standard(font) => doc.add_standard_font(LABEL_FONT, *font)?,
            LabelFont::TrueType { data, .. } => doc.add_font(LABEL_FONT, data)?,
        }
        Ok(())
    }
}

/// Stamps a QR image and its label onto every slot of a template
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    layout: SheetLayout,
    font: LabelFont,
}

impl Compositor {
    pub fn new(layout: SheetLayout, font: LabelFont) -> Self {
        Self { layout, font }
    }

    pub fn with_font(mut self, font: LabelFont) -> Self {
        self.font = font;
        self
    }

    pub fn layout(&self) -> &SheetLayout {
        &self.layout
    }

    /// Label font size for `label`, shared by all slots
    pub fn label_font_size(&self, label: &str) -> Result<f32> {
        let measure = self.font.to_pdf_font()?;
        Ok(self.fit_label(&measure, label))
    }

    fn fit_label(&self, font: &PdfFont, label: &str) -> f32 {
        let layout = &self.layout;
        fit_font_size(
            |size| font.text_width_points(label, size) as f64,
            mm_to_pt(layout.max_text_width),
            layout.font_ceiling,
            layout.font_floor,
            layout.font_step,
        )
    }

    /// Produce a sticker sheet PDF
    ///
    /// The template bytes are only read; the returned document is new.
    pub fn compose(&self, template: &[u8], qr: &QrImage, label: &str) -> Result<Vec<u8>> {
        let layout = &self.layout;

        let mut doc = PdfDocument::open_from_bytes(template)
            .map_err(|e| StickerError::TemplateUnavailable(e.to_string()))?;
        if doc.page_count() == 0 {
            return Err(StickerError::TemplateUnavailable(
                "Template PDF has no pages".to_string(),
            ));
        }

        let (width, height) = doc.page_size(PAGE)?;
        if (width - A4_SIZE.0).abs() > A4_TOLERANCE_PT || (height - A4_SIZE.1).abs() > A4_TOLERANCE_PT
        {
            return Err(StickerError::TemplateMismatch { width, height });
        }

        let image = doc.embed_image(&qr.bytes, qr.format)?;
        debug!(
            format = ?qr.format,
            width = image.width,
            height = image.height,
            "embedded QR image"
        );

        let qr_size = mm_to_pt(layout.qr_size);
        for anchor in &layout.qr_positions {
            let x = mm_to_pt(anchor.x);
            let y = height - mm_to_pt(anchor.y) - qr_size;
            // Opaque backing so template artwork never shows through the code
            doc.insert_rect(PAGE, x, y, qr_size, qr_size, Color::white())?;
            doc.insert_image(&image, PAGE, x, y, qr_size, qr_size)?;
        }

        let measure = self.font.to_pdf_font()?;
        let font_size = self.fit_label(&measure, label);
        debug!(font_size, label_len = label.chars().count(), "fitted label font");

        self.font.register(&mut doc)?;
        doc.set_font(LABEL_FONT, font_size)?;
        doc.set_text_color(Color::black());

        for (slot, anchor) in layout.label_positions.iter().enumerate() {
            let center_x = mm_to_pt(layout.label_center_mm(slot));
            let y = height - mm_to_pt(anchor.y) - font_size as f64 * layout.baseline_factor;
            doc.insert_text(label, PAGE, center_x, y, Align::Center)?;
        }

        let bytes = doc.to_bytes()?;
        debug!(size = bytes.len(), "serialized sticker sheet");

        Ok(bytes)
    }
}

/// Compose with the stock layout and Helvetica-Bold labels
pub fn compose(template: &[u8], qr: &QrImage, label: &str) -> Result<Vec<u8>> {
    Compositor::default().compose(template, qr, label)
}
