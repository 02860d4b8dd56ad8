//! `stickersheet` - QR sticker sheet server and tools

use std::path::PathBuf;

use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use stickers::{generate_qr_png, Compositor, FileTemplateStore, ImageFormat, LabelFont, QrImage, TemplateStore};
use stickers_server::{configure, load_label_font, AppState, ServerConfig};

#[derive(Parser)]
#[command(name = "stickersheet")]
#[command(about = "Print twelve QR stickers on an A4 template")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve(ServerConfig),

    /// Compose a sticker sheet from local files
    Compose {
        /// Sticker template PDF
        #[arg(long, default_value = "uploads/template.pdf")]
        template: PathBuf,

        /// QR image (PNG or JPEG, by extension)
        #[arg(long)]
        image: PathBuf,

        /// Text printed under each code
        #[arg(long, default_value = "")]
        label: String,

        /// TrueType font for labels
        #[arg(long)]
        font: Option<PathBuf>,

        /// Output PDF
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write a QR code PNG
    Qr {
        /// Text to encode
        #[arg(long)]
        data: String,

        /// Minimum image width in pixels
        #[arg(long, default_value_t = 500)]
        size: u32,

        /// Output PNG
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[actix_web::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(config) => serve(config).await,
        Commands::Compose {
            template,
            image,
            label,
            font,
            output,
        } => compose_file(template, image, &label, font, output),
        Commands::Qr { data, size, output } => {
            let png = generate_qr_png(&data, size)?;
            std::fs::write(&output, png)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!(output = %output.display(), "wrote QR code");
            Ok(())
        }
    }
}

async fn serve(config: ServerConfig) -> Result<()> {
    let state = web::Data::new(AppState::from_config(&config)?);
    let max_body = config.max_body_bytes();

    info!(
        host = %config.host,
        port = config.port,
        template = %config.template.display(),
        "stickersheet listening"
    );

    HttpServer::new(move || App::new().configure(configure(state.clone(), max_body)))
        .bind((config.host.as_str(), config.port))
        .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?
        .run()
        .await?;

    Ok(())
}

fn compose_file(
    template: PathBuf,
    image: PathBuf,
    label: &str,
    font: Option<PathBuf>,
    output: PathBuf,
) -> Result<()> {
    let template = FileTemplateStore::new(template).load()?;

    let bytes =
        std::fs::read(&image).with_context(|| format!("Failed to read {}", image.display()))?;
    let format = image
        .extension()
        .and_then(|ext| ext.to_str())
        .map(ImageFormat::from_extension)
        .unwrap_or(ImageFormat::Png);

    let font = match font {
        Some(path) => load_label_font(&path)?,
        None => LabelFont::default(),
    };

    let pdf = Compositor::default()
        .with_font(font)
        .compose(&template, &QrImage::new(bytes, format), label)?;
    std::fs::write(&output, &pdf)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!(output = %output.display(), size = pdf.len(), "wrote sticker sheet");
    Ok(())
}
