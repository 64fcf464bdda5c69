//! # docflow
//!
//! A local web service for a single user: upload a PDF or image, preview
//! its pages, pick page ranges, OCR them with the Mistral OCR API, and
//! download the result as Markdown or plain text.
//!
//! ## Lifecycle
//!
//! ```text
//! upload ─▶ Registered ─┬─▶ thumbnail (repeatable, PDFs only render)
//!                       └─▶ run_ocr ─▶ Processed ─┬─▶ download md / txt
//!                                                 └─▶ run_ocr (replaces result)
//! ```
//!
//! 1. **Upload**  extension and size checks, stored under the scratch dir
//! 2. **Preview** pdfium renders a PNG thumbnail (CPU-bound, `spawn_blocking`)
//! 3. **Split**   selected ranges copied into a temporary PDF, in request order
//! 4. **OCR**     one base64 data URI sent to Mistral, one result per document
//! 5. **Export**  `## Page N` Markdown or heading-free text as an attachment
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docflow::{create_router, AppState, DocumentController, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // MISTRAL_API_KEY is read when OCR runs, not at startup.
//!     let config = ServiceConfig::builder().scratch_dir("temp").build()?;
//!     let controller = DocumentController::from_config(config).await?;
//!     let app = create_router(AppState::new(controller), None);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docflow` binary (clap + anyhow + dotenvy + tracing-subscriber) |
//!
//! ## Engines
//!
//! PDF handling and OCR sit behind [`PdfEngine`] and [`OcrEngine`]. The
//! defaults are [`PdfiumEngine`] and [`MistralOcrClient`]; tests swap in
//! fakes through [`DocumentController::with_memory_stores`].

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod controller;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod server;
pub mod store;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExportFormat, PageRange, ServiceConfig, ServiceConfigBuilder, MAX_UPLOAD_BYTES};
pub use controller::DocumentController;
pub use error::{DocFlowError, ErrorKind};
pub use output::{DocumentDescriptor, DocumentId, ExportFile, OcrResult, StoredDocument, Thumbnail};
pub use pipeline::ocr::{MistralOcrClient, OcrEngine, OcrPage, OcrRequest};
pub use pipeline::render::{PdfEngine, PdfiumEngine};
pub use server::{create_router, AppState};
pub use store::{DocumentStore, MemoryDocumentStore, MemoryResultStore, ResultStore};
