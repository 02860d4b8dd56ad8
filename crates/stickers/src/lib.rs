//! Stickers - QR sticker sheet compositor
//!
//! Stamps one QR image and one label onto the twelve slots of an A4
//! sticker template:
//! - Fixed slot layout in millimeters (`SheetLayout::REFERENCE`)
//! - Single label font size for the whole sheet, shrunk until the label fits
//! - QR sources: uploaded data URIs, fetched images, or locally generated codes
//!
//! # Example
//!
//! ```ignore
//! use stickers::{compose, QrImage, generate_qr_png, ImageFormat};
//!
//! let qr = QrImage::new(generate_qr_png("https://example.com", 500)?, ImageFormat::Png);
//! let pdf = compose(&template_bytes, &qr, "https://example.com")?;
//! ```

pub mod compose;
pub mod filename;
pub mod fit;
pub mod layout;
pub mod qr;
pub mod source;
pub mod store;

pub use compose::{compose, Compositor, LabelFont};
pub use filename::sticker_filename;
pub use fit::fit_font_size;
pub use layout::{MmPoint, SheetLayout, SLOT_COUNT};
pub use qr::generate_qr_png;
pub use source::{classify_url, label_from_qr_url, parse_http_url, ImageFormat, QrImage, UrlKind};
pub use store::{FileTemplateStore, MemoryTemplateStore, TemplateStore};

use pdf_core::PdfError;
use thiserror::Error;

/// Errors that can occur while producing a sticker sheet
#[derive(Debug, Error)]
pub enum StickerError {
    #[error("Template PDF not found")]
    TemplateUnavailable(String),

    #[error("Template page must be A4, got {width:.2} x {height:.2} pt")]
    TemplateMismatch { width: f64, height: f64 },

    #[error("Failed to embed QR image: {0}")]
    ImageDecode(String),

    #[error("{0}")]
    Composition(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    UpstreamFetch(String),
}

impl From<PdfError> for StickerError {
    fn from(err: PdfError) -> Self {
        match err {
            PdfError::ImageError(msg) => StickerError::ImageDecode(msg),
            other => StickerError::Composition(other.to_string()),
        }
    }
}

/// Result type for sticker operations
pub type Result<T> = std::result::Result<T, StickerError>;
