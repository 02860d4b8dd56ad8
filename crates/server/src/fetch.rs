//! Download of remote QR images

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use stickers::{ImageFormat, QrImage, StickerError};
use tracing::{debug, warn};
use url::Url;

/// Largest QR image body accepted by default
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Fetches QR images over HTTP with a shared client
#[derive(Debug, Clone)]
pub struct QrFetcher {
    client: Client,
    max_bytes: usize,
}

impl QrFetcher {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("stickersheet/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            max_bytes: DEFAULT_MAX_IMAGE_BYTES,
        })
    }

    /// Reject image bodies larger than `max_bytes`
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// GET `url` and return the body as a QR image
    ///
    /// The response must be 2xx with a content type mentioning `image`;
    /// the content type also picks JPEG or PNG decoding.
    pub async fn fetch(&self, url: &Url) -> stickers::Result<QrImage> {
        let mut response = self.client.get(url.clone()).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "QR image request failed");
            StickerError::UpstreamFetch(format!("Failed to fetch QR image: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, %status, "QR image upstream error");
            return Err(StickerError::UpstreamFetch(format!(
                "Failed to fetch QR image: {}",
                status.as_u16()
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.contains("image") {
            warn!(url = %url, content_type = %content_type, "QR URL is not an image");
            return Err(StickerError::UpstreamFetch(format!(
                "URL did not return an image. Content-Type: {content_type}"
            )));
        }

        if response
            .content_length()
            .is_some_and(|len| len > self.max_bytes as u64)
        {
            warn!(url = %url, limit = self.max_bytes, "QR image too large");
            return Err(self.too_large());
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| {
            StickerError::UpstreamFetch(format!("Failed to fetch QR image: {e}"))
        })? {
            if bytes.len() + chunk.len() > self.max_bytes {
                warn!(url = %url, limit = self.max_bytes, "QR image too large");
                return Err(self.too_large());
            }
            bytes.extend_from_slice(&chunk);
        }
        debug!(url = %url, content_type = %content_type, size = bytes.len(), "fetched QR image");

        Ok(QrImage::new(bytes, ImageFormat::from_mime(&content_type)))
    }

    fn too_large(&self) -> StickerError {
        StickerError::UpstreamFetch(format!(
            "Failed to fetch QR image: larger than {} bytes",
            self.max_bytes
        ))
    }
}
