//! PDF Core - Low-level PDF manipulation
//!
//! This crate provides functionality for:
//! - Opening a template PDF from bytes and saving the result
//! - Standard Type1 fonts (with built-in metrics) and embedded TrueType fonts
//! - Inserting text, filled rectangles and images (JPEG, PNG)
//!
//! All drawing coordinates are PDF user space: points, origin at the
//! bottom-left corner of the page.
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{Align, ImageFormat, PdfDocument, StandardFont};
//!
//! let mut doc = PdfDocument::open_from_bytes(&template_bytes)?;
//! doc.add_standard_font("label", StandardFont::HelveticaBold)?;
//! doc.set_font("label", 9.0)?;
//! let qr = doc.embed_image(&png_bytes, ImageFormat::Png)?;
//! doc.insert_image(&qr, 1, 100.0, 700.0, 40.0, 40.0)?;
//! doc.insert_text("https://example.com", 1, 120.0, 680.0, Align::Center)?;
//! let bytes = doc.to_bytes()?;
//! ```

mod document;
mod font;
mod image;
mod text;

pub use document::{Color, PdfDocument};
pub use font::{FontData, PdfFont, StandardFont};
pub use image::{EmbeddedImage, ImageFormat};

use thiserror::Error;

/// A4 page size in points (width, height)
pub const A4_SIZE: (f64, f64) = (595.28, 841.89);

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Font not found: {0}")]
    FontNotFound(String),

    #[error("Font already exists: {0}")]
    FontAlreadyExists(String),

    #[error("Failed to parse font: {0}")]
    FontParseError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Text alignment relative to the x coordinate passed to `insert_text`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Convert millimeters to PDF points (1 in = 25.4 mm = 72 pt)
pub fn mm_to_pt(mm: f64) -> f64 {
    mm * 72.0 / 25.4
}
