//! Server settings

use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

/// Settings for `stickersheet serve`
#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "STICKERS_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "STICKERS_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Sticker template PDF
    #[arg(long, env = "STICKERS_TEMPLATE", default_value = "uploads/template.pdf")]
    pub template: PathBuf,

    /// Timeout for fetching remote QR images, in seconds
    #[arg(long, env = "STICKERS_FETCH_TIMEOUT_SECS", default_value_t = 10)]
    pub fetch_timeout_secs: u64,

    /// Read the template once at startup instead of on every request
    #[arg(long)]
    pub preload_template: bool,

    /// Largest accepted JSON body, in megabytes
    #[arg(long, default_value_t = 10)]
    pub max_body_mb: usize,

    /// TrueType font for labels (Helvetica-Bold if omitted)
    #[arg(long, env = "STICKERS_FONT")]
    pub font: Option<PathBuf>,
}

impl ServerConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            template: PathBuf::from("uploads/template.pdf"),
            fetch_timeout_secs: 10,
            preload_template: false,
            max_body_mb: 10,
            font: None,
        }
    }
}
