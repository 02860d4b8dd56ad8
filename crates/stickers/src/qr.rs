//! Local QR code generation

use crate::{Result, StickerError};
use image::{DynamicImage, Luma};
use qrcode::{EcLevel, QrCode};
use std::io::Cursor;

/// Render `data` as a QR code PNG at least `size_px` pixels square
///
/// The standard four-module quiet zone is kept so the code scans once
/// printed next to other artwork.
pub fn generate_qr_png(data: &str, size_px: u32) -> Result<Vec<u8>> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::M)
        .map_err(|e| StickerError::InvalidInput(format!("Cannot encode QR code: {e}")))?;

    let image = code
        .render::<Luma<u8>>()
        .min_dimensions(size_px, size_px)
        .build();

    let mut bytes: Vec<u8> = Vec::new();
    DynamicImage::ImageLuma8(image)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|e| StickerError::Composition(e.to_string()))?;

    Ok(bytes)
}
