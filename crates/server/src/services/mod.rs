//! HTTP routes
//!
//! - `stickers`: `POST /api/generate-stickers`, builds a sticker sheet PDF
//! - `health`: `GET /health`, liveness check

pub mod health;
pub mod stickers;
