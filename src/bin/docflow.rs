//! CLI binary for docflow.
//!
//! Maps flags (and `DOCFLOW_*` variables, optionally from `.env`) to a
//! `ServiceConfig` and serves the HTTP API until Ctrl-C.

use anyhow::{Context, Result};
use clap::Parser;
use docflow::{create_router, AppState, DocumentController, ServiceConfig};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve on localhost:8000 with scratch files in ./temp
  docflow

  # Serve the browser front end and listen on all interfaces
  docflow --host 0.0.0.0 --static-dir static

  # Bigger thumbnails, longer OCR timeout
  docflow --thumbnail-scale 0.8 --api-timeout 300

ENVIRONMENT VARIABLES:
  MISTRAL_API_KEY         Mistral API key, read on every OCR request
  PDFIUM_LIB_PATH         libpdfium file or the directory holding it
  DOCFLOW_*               Fallback for every flag below (e.g. DOCFLOW_PORT)
  RUST_LOG                Overrides -v / -q

A .env file in the working directory is loaded before anything else.
"#;

/// Upload, preview, OCR and export documents from a browser.
#[derive(Parser, Debug)]
#[command(
    name = "docflow",
    version,
    about = "Local document OCR service: upload, preview, split, OCR, export",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Address to bind.
    #[arg(long, env = "DOCFLOW_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on.
    #[arg(short, long, env = "DOCFLOW_PORT", default_value_t = 8000)]
    port: u16,

    /// Directory for uploads, split files and exports.
    #[arg(long, env = "DOCFLOW_SCRATCH_DIR", default_value = "temp")]
    scratch_dir: PathBuf,

    /// Serve static files (the browser front end) from this directory.
    #[arg(long, env = "DOCFLOW_STATIC_DIR")]
    static_dir: Option<PathBuf>,

    /// Thumbnail render scale (0 < scale ≤ 4).
    #[arg(long, env = "DOCFLOW_THUMBNAIL_SCALE", default_value_t = docflow::config::DEFAULT_THUMBNAIL_SCALE)]
    thumbnail_scale: f32,

    /// Mistral OCR model ID.
    #[arg(long, env = "DOCFLOW_OCR_MODEL", default_value = docflow::config::DEFAULT_OCR_MODEL)]
    ocr_model: String,

    /// OCR endpoint URL.
    #[arg(long, env = "DOCFLOW_OCR_ENDPOINT", default_value = docflow::config::DEFAULT_OCR_ENDPOINT)]
    ocr_endpoint: String,

    /// OCR request timeout in seconds.
    #[arg(long, env = "DOCFLOW_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// libpdfium file or directory. Falls back to ./ then the system library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib_path: Option<PathBuf>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCFLOW_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOCFLOW_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Before parsing, so .env values feed the `env = ...` fallbacks.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Configuration ────────────────────────────────────────────────────
    let mut builder = ServiceConfig::builder()
        .scratch_dir(&cli.scratch_dir)
        .thumbnail_scale(cli.thumbnail_scale)
        .ocr_model(&cli.ocr_model)
        .ocr_endpoint(&cli.ocr_endpoint)
        .api_timeout_secs(cli.api_timeout);
    if let Some(path) = &cli.pdfium_lib_path {
        builder = builder.pdfium_lib_path(path);
    }
    let config = builder.build().context("Invalid configuration")?;
    tracing::debug!("{:?}", config);

    if std::env::var(&config.api_key_env).map_or(true, |k| k.trim().is_empty()) {
        tracing::warn!(
            "{} is not set; uploads and previews work, OCR requests will fail",
            config.api_key_env
        );
    }

    let controller = DocumentController::from_config(config)
        .await
        .context("Failed to initialise document controller")?;

    if let Some(dir) = &cli.static_dir {
        if !dir.is_dir() {
            anyhow::bail!("Static directory '{}' does not exist", dir.display());
        }
    }
    let app = create_router(AppState::new(controller), cli.static_dir.as_deref());

    // ── Serve ────────────────────────────────────────────────────────────
    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", cli.host, cli.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
