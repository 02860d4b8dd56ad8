//! Sticker sheet generation endpoint

use crate::error::ApiError;
use crate::AppState;
use actix_web::http::header::{CACHE_CONTROL, CONTENT_DISPOSITION};
use actix_web::web::{self, post, scope};
use actix_web::{HttpResponse, Scope};
use serde::Deserialize;
use stickers::{
    classify_url, generate_qr_png, label_from_qr_url, parse_http_url, sticker_filename, ImageFormat,
    QrImage, StickerError, UrlKind,
};
use tracing::{error, info};
use url::Url;

const API_PATH: &str = "/api";

/// Pixel size of QR codes generated for website URLs
const WEBSITE_QR_PX: u32 = 500;

/// Routes under `/api`
///
/// * **`POST /generate-stickers`**: JSON body with one of `qrImageUrl`,
///   `qrImageBase64` or `websiteUrl` (checked in that order) and an optional
///   `labelText`. Responds with the PDF inline.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/generate-stickers", post().to(process))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub qr_image_url: Option<String>,
    pub qr_image_base64: Option<String>,
    pub website_url: Option<String>,
    pub label_text: Option<String>,
}

/// A generated sheet ready to send
struct Sheet {
    filename: String,
    pdf: Vec<u8>,
}

async fn process(
    state: web::Data<AppState>,
    body: web::Json<GenerateRequest>,
) -> Result<HttpResponse, ApiError> {
    match generate(state, body.into_inner()).await {
        Ok(sheet) => {
            info!(filename = %sheet.filename, size = sheet.pdf.len(), "generated sticker sheet");
            Ok(HttpResponse::Ok()
                .content_type("application/pdf")
                .insert_header((
                    CONTENT_DISPOSITION,
                    format!("inline; filename=\"{}\"", sheet.filename),
                ))
                .insert_header((CACHE_CONTROL, "no-cache"))
                .body(sheet.pdf))
        }
        Err(e) => {
            error!(error = %e, detail = ?e, "sticker sheet generation failed");
            Err(e)
        }
    }
}

async fn generate(state: web::Data<AppState>, request: GenerateRequest) -> Result<Sheet, ApiError> {
    let (qr, default_label) = resolve_source(&state, &request).await?;
    let label = request
        .label_text
        .filter(|text| !text.is_empty())
        .unwrap_or(default_label);

    let template = state.templates.load()?;
    let filename = sticker_filename(&label);

    let pdf = web::block(move || state.compositor.compose(&template, &qr, &label))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(Sheet { filename, pdf })
}

/// Pick the QR image and the label to use when none is given
async fn resolve_source(
    state: &AppState,
    request: &GenerateRequest,
) -> Result<(QrImage, String), StickerError> {
    if let Some(raw) = present(&request.qr_image_url) {
        let url = parse_http_url(raw)
            .ok_or_else(|| StickerError::InvalidInput("Invalid QR image URL".to_string()))?;
        return fetch_qr_url(state, &url).await;
    }

    if let Some(data_uri) = present(&request.qr_image_base64) {
        return Ok((QrImage::from_data_uri(data_uri)?, String::new()));
    }

    if let Some(raw) = present(&request.website_url) {
        let url = parse_http_url(raw)
            .ok_or_else(|| StickerError::InvalidInput("Invalid website URL".to_string()))?;
        // Links straight to a QR generator or image are used as-is
        if classify_url(url.as_str()) == UrlKind::QrImage {
            return fetch_qr_url(state, &url).await;
        }
        let png = generate_qr_png(raw, WEBSITE_QR_PX)?;
        return Ok((QrImage::new(png, ImageFormat::Png), raw.to_string()));
    }

    Err(StickerError::InvalidInput(
        "Please provide a QR image URL or upload an image".to_string(),
    ))
}

async fn fetch_qr_url(state: &AppState, url: &Url) -> Result<(QrImage, String), StickerError> {
    let qr = state.fetcher.fetch(url).await?;
    Ok((qr, label_from_qr_url(url)))
}

fn present(field: &Option<String>) -> Option<&str> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
