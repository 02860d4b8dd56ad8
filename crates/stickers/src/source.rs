//! QR image sources and URL helpers

use crate::{Result, StickerError};
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

pub use pdf_core::ImageFormat;

/// `data:<mime>;base64,<payload>`
static DATA_URI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:([A-Za-z+/-]+);base64,(.+)$").expect("valid data URI pattern"));

/// Image file extension at the end of the path or before the query
static IMAGE_EXTENSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\.(png|jpg|jpeg|gif|svg|webp)(\?|$)").expect("valid extension pattern")
});

/// Standard alphabet, padding optional
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Image bytes plus their declared format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl QrImage {
    pub fn new(bytes: Vec<u8>, format: ImageFormat) -> Self {
        Self { bytes, format }
    }

    /// Decode an uploaded `data:` URI
    ///
    /// The MIME type picks the format (JPEG if it mentions jpeg/jpg, PNG
    /// otherwise); the payload is not sniffed.
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let invalid = || StickerError::InvalidInput("Invalid base64 image format".to_string());

        let captures = DATA_URI.captures(uri).ok_or_else(invalid)?;
        let mime = &captures[1];
        let bytes = BASE64.decode(&captures[2]).map_err(|_| invalid())?;

        Ok(Self {
            bytes,
            format: ImageFormat::from_mime(mime),
        })
    }
}

/// What a user-supplied URL points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
    /// Already a QR code image, e.g. from a QR generator API
    QrImage,
    /// Any other page; a QR code has to be generated for it
    Website,
}

/// Guess whether a URL is a QR code image or a website
pub fn classify_url(url: &str) -> UrlKind {
    let lower = url.to_lowercase();
    let qr_api = lower.contains("qrserver.com")
        || lower.contains("qrcode")
        || lower.contains("api.qr")
        || (lower.contains("chart.googleapis.com/chart?") && lower.contains("qr"));

    if qr_api || IMAGE_EXTENSION.is_match(url) {
        UrlKind::QrImage
    } else {
        UrlKind::Website
    }
}

/// Parse an absolute http(s) URL
pub fn parse_http_url(input: &str) -> Option<Url> {
    Url::parse(input)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

/// Label encoded in a QR generator URL (its `data` query parameter)
pub fn label_from_qr_url(url: &Url) -> String {
    url.query_pairs()
        .find(|(key, _)| key == "data")
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}
