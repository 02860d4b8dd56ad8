//! API error responses

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use stickers::StickerError;
use thiserror::Error;

/// Errors returned by API handlers, rendered as `{"error": "..."}`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Sticker(#[from] StickerError),

    /// Request body that could not be read as JSON
    #[error("{0}")]
    BadRequest(String),

    /// Anything without a more specific message
    #[error("Failed to generate sticker sheet")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Sticker(StickerError::InvalidInput(_)) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
