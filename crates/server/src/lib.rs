//! HTTP front end for stickersheet
//!
//! Exposes sticker sheet generation as a JSON API on top of the
//! [`stickers`] compositor. The `stickersheet` binary wires this into an
//! actix-web server and adds offline subcommands.

pub mod config;
pub mod error;
pub mod fetch;
pub mod services;

pub use config::ServerConfig;
pub use error::ApiError;
pub use fetch::QrFetcher;

use actix_web::web;
use anyhow::Context;
use std::sync::Arc;
use stickers::{Compositor, FileTemplateStore, LabelFont, MemoryTemplateStore, TemplateStore};
use tracing::info;

/// Shared, read-only state of the API
pub struct AppState {
    pub templates: Arc<dyn TemplateStore>,
    pub compositor: Compositor,
    pub fetcher: QrFetcher,
}

impl AppState {
    pub fn new(templates: Arc<dyn TemplateStore>, compositor: Compositor, fetcher: QrFetcher) -> Self {
        Self {
            templates,
            compositor,
            fetcher,
        }
    }

    /// Build the state described by `config`
    ///
    /// Fails when the label font cannot be read, or when the template is
    /// preloaded and missing.
    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let file_store = FileTemplateStore::new(config.template.clone());
        let templates: Arc<dyn TemplateStore> = if config.preload_template {
            let store = MemoryTemplateStore::preload(&file_store).with_context(|| {
                format!("Failed to preload template {}", config.template.display())
            })?;
            info!(path = %config.template.display(), "preloaded template");
            Arc::new(store)
        } else {
            Arc::new(file_store)
        };

        let font = match &config.font {
            Some(path) => load_label_font(path)?,
            None => LabelFont::default(),
        };

        let fetcher = QrFetcher::new(config.fetch_timeout())
            .context("Failed to build HTTP client")?
            .with_max_bytes(config.max_body_bytes());

        Ok(Self::new(
            templates,
            Compositor::default().with_font(font),
            fetcher,
        ))
    }
}

/// Read a TrueType label font, named after its file stem
pub fn load_label_font(path: &std::path::Path) -> anyhow::Result<LabelFont> {
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read font {}", path.display()))?;
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("label");
    let font = LabelFont::truetype(name, data)
        .with_context(|| format!("Invalid font {}", path.display()))?;
    info!(path = %path.display(), "loaded label font");
    Ok(font)
}

/// Register state, body limits and routes on an app
pub fn configure(
    state: web::Data<AppState>,
    max_body_bytes: usize,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let json = web::JsonConfig::default()
            .limit(max_body_bytes)
            .error_handler(|err, _req| {
                ApiError::BadRequest(format!("Invalid request body: {err}")).into()
            });

        cfg.app_data(state)
            .app_data(json)
            .service(services::stickers::configure_routes())
            .service(services::health::configure_routes());
    }
}
