//! Image handling for PDF documents

use crate::{PdfError, Result};
use image::{DynamicImage, ImageDecoder, ImageReader};
use lopdf::{Dictionary, ObjectId, Stream};
use std::io::Cursor;

impl From<image::ImageError> for PdfError {
    fn from(err: image::ImageError) -> Self {
        PdfError::ImageError(err.to_string())
    }
}

/// Declared image format
///
/// Only JPEG is passed through untouched; everything else goes through the
/// PNG decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// Infer the format from a MIME type such as `image/jpeg`
    pub fn from_mime(mime: &str) -> Self {
        let mime = mime.to_ascii_lowercase();
        if mime.contains("jpeg") || mime.contains("jpg") {
            ImageFormat::Jpeg
        } else {
            ImageFormat::Png
        }
    }

    /// Infer the format from a file extension (without the dot)
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => ImageFormat::Jpeg,
            _ => ImageFormat::Png,
        }
    }

    /// MIME type for this format
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }
}

/// An image XObject that has been added to the document
///
/// Returned by `PdfDocument::embed_image` and passed to `insert_image` as
/// many times as needed; every placement references the same object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedImage {
    /// PDF object id of the image stream
    pub object_id: ObjectId,
    /// Pixel width
    pub width: u32,
    /// Pixel height
    pub height: u32,
}

/// JPEG info including dimensions and color components
#[derive(Debug, Clone, Copy)]
struct JpegInfo {
    width: u32,
    height: u32,
    num_components: u8,
}

/// Image XObject for PDF embedding
#[derive(Debug, Clone)]
pub struct ImageXObject {
    /// Image width
    pub width: u32,
    /// Image height
    pub height: u32,
    /// Color space ("DeviceRGB", "DeviceGray", "DeviceCMYK")
    pub color_space: String,
    /// Bits per component
    pub bits_per_component: u8,
    /// PDF filter ("DCTDecode" for JPEG, "FlateDecode" for PNG)
    pub filter: String,
    /// Raw image data (compressed)
    pub data: Vec<u8>,
}

/// Get JPEG info including dimensions and color components
fn get_jpeg_info(data: &[u8]) -> Result<JpegInfo> {
    if data.len() < 4 || data[0] != 0xFF || data[1] != 0xD8 {
        return Err(PdfError::ImageError("Not a JPEG file".to_string()));
    }

    // SOF segment: marker (2), length (2), precision (1), height (2), width (2), components (1)
    let mut i = 2;
    while i + 10 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }

        let marker = data[i + 1];

        if (0xC0..=0xCF).contains(&marker) && marker != 0xC4 && marker != 0xC8 && marker != 0xCC {
            let height = u16::from_be_bytes([data[i + 5], data[i + 6]]) as u32;
            let width = u16::from_be_bytes([data[i + 7], data[i + 8]]) as u32;
            let num_components = data[i + 9];
            if width == 0 || height == 0 {
                break;
            }
            return Ok(JpegInfo {
                width,
                height,
                num_components,
            });
        }

        let length = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        if length < 2 {
            break;
        }
        i += 2 + length;
    }

    Err(PdfError::ImageError(
        "Could not parse JPEG info".to_string(),
    ))
}

/// Blend a color channel with a white background
fn over_white(channel: u8, alpha: u8) -> u8 {
    let alpha = alpha as f32 / 255.0;
    (channel as f32 * alpha + 255.0 * (1.0 - alpha)) as u8
}

impl ImageXObject {
    /// Create an XObject for the declared format
    pub fn from_format(data: &[u8], format: ImageFormat) -> Result<Self> {
        match format {
            ImageFormat::Jpeg => Self::from_jpeg(data),
            ImageFormat::Png => Self::from_png(data),
        }
    }

    /// Create XObject from JPEG data
    ///
    /// JPEG images can be embedded directly with DCTDecode filter.
    pub fn from_jpeg(data: &[u8]) -> Result<Self> {
        let info = get_jpeg_info(data)?;

        let color_space = match info.num_components {
            1 => "DeviceGray",
            4 => "DeviceCMYK",
            _ => "DeviceRGB",
        };

        Ok(Self {
            width: info.width,
            height: info.height,
            color_space: color_space.to_string(),
            bits_per_component: 8,
            filter: "DCTDecode".to_string(),
            data: data.to_vec(),
        })
    }

    /// Create XObject from PNG data
    ///
    /// PNG images are decoded and re-encoded with FlateDecode.
    /// Alpha channels are blended with a white background.
    pub fn from_png(data: &[u8]) -> Result<Self> {
        let reader = ImageReader::with_format(Cursor::new(data), image::ImageFormat::Png);
        let decoder = reader.into_decoder()?;

        let dims = decoder.dimensions();
        let color_type = decoder.color_type();

        let image = DynamicImage::from_decoder(decoder)?;

        let (raw_data, color_space) = match color_type {
            image::ColorType::L8 | image::ColorType::L16 => {
                let gray = image.to_luma8();
                (gray.into_raw(), "DeviceGray")
            }
            image::ColorType::La8 | image::ColorType::La16 => {
                let la = image.to_luma_alpha8();
                let gray_data = la.pixels().map(|p| over_white(p[0], p[1])).collect();
                (gray_data, "DeviceGray")
            }
            image::ColorType::Rgba8 | image::ColorType::Rgba16 => {
                let rgba = image.to_rgba8();
                let mut rgb_data = Vec::with_capacity((dims.0 * dims.1 * 3) as usize);
                for pixel in rgba.pixels() {
                    rgb_data.push(over_white(pixel[0], pixel[3]));
                    rgb_data.push(over_white(pixel[1], pixel[3]));
                    rgb_data.push(over_white(pixel[2], pixel[3]));
                }
                (rgb_data, "DeviceRGB")
            }
            _ => {
                let rgb = image.to_rgb8();
                (rgb.into_raw(), "DeviceRGB")
            }
        };

        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        std::io::Write::write_all(&mut encoder, &raw_data)?;
        let data = encoder.finish()?;

        Ok(Self {
            width: dims.0,
            height: dims.1,
            color_space: color_space.to_string(),
            bits_per_component: 8,
            filter: "FlateDecode".to_string(),
            data,
        })
    }

    /// Convert to lopdf Stream object
    pub fn to_pdf_stream(&self) -> Stream {
        let mut dict = Dictionary::new();

        dict.set("Type", lopdf::Object::Name(b"XObject".to_vec()));
        dict.set("Subtype", lopdf::Object::Name(b"Image".to_vec()));
        dict.set("Width", self.width as i64);
        dict.set("Height", self.height as i64);
        dict.set(
            "ColorSpace",
            lopdf::Object::Name(self.color_space.as_bytes().to_vec()),
        );
        dict.set("BitsPerComponent", self.bits_per_component as i64);
        dict.set(
            "Filter",
            lopdf::Object::Name(self.filter.as_bytes().to_vec()),
        );
        dict.set("Length", self.data.len() as i64);

        // Already compressed, lopdf must not compress again
        Stream::new(dict, self.data.clone()).with_compression(false)
    }
}

/// Generate operators to draw image at position
///
/// # Arguments
/// * `image_name` - Image resource name (e.g., "Im1")
/// * `x` - X coordinate in points
/// * `y` - Y coordinate in points (from bottom, PDF coordinates)
/// * `width` - Image width in points
/// * `height` - Image height in points
pub fn generate_image_operators(
    image_name: &str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> Vec<u8> {
    format!("q\n{width} 0 0 {height} {x} {y} cm\n/{image_name} Do\nQ\n").into_bytes()
}
