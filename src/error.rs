//! Error types for the docflow library.
//!
//! Every fallible operation returns [`DocFlowError`]. Callers that need to
//! decide *how* to surface a failure (HTTP status, exit code, retry or not)
//! look at [`DocFlowError::kind`] instead of matching on individual variants:
//!
//! * [`ErrorKind::Validation`] — the caller sent something we refuse
//!   (bad extension, oversized file, empty page selection, bad format,
//!   out-of-range page).
//! * [`ErrorKind::NotFound`] — unknown document, or no OCR result yet. The
//!   two are separate variants with separate messages.
//! * [`ErrorKind::Upstream`] — pdfium or the OCR provider failed, including a
//!   missing API key. Never retried.
//! * [`ErrorKind::Internal`] — local I/O and bookkeeping failures.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`DocFlowError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Upstream,
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable code, used in HTTP error bodies.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation_error",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Upstream => "upstream_error",
            ErrorKind::Internal => "internal_error",
        }
    }
}

/// All errors returned by the docflow library.
#[derive(Debug, Error)]
pub enum DocFlowError {
    // ── Validation errors ─────────────────────────────────────────────────
    /// Upload extension is not one of pdf, jpg, jpeg, png.
    #[error("Unsupported file type '{filename}'. Supported formats: PDF, JPG, JPEG, PNG")]
    UnsupportedFileType { filename: String },

    /// Upload exceeds the fixed size ceiling.
    #[error("File exceeds {limit_mb} MB limit ({size} bytes received)")]
    FileTooLarge { size: usize, limit_mb: usize },

    /// Multipart body carried no file field.
    #[error("No file uploaded")]
    MissingUpload,

    /// Multipart body could not be read.
    #[error("Failed to read upload: {detail}")]
    MalformedUpload { detail: String },

    /// Path parameters or JSON body could not be parsed.
    #[error("Invalid request: {detail}")]
    MalformedRequest { detail: String },

    /// OCR requested on a PDF without any page range.
    #[error("No page ranges specified")]
    NoPageRanges,

    /// Export format other than md / txt.
    #[error("Format must be 'md' or 'txt', got '{format}'")]
    InvalidExportFormat { format: String },

    /// Thumbnail page outside 1..=total.
    #[error("Page {page} is out of range (valid pages: 1-{total})")]
    PageOutOfRange { page: i64, total: usize },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Lookup errors ─────────────────────────────────────────────────────
    /// No document registered under this identifier.
    #[error("Document not found: {doc_id}")]
    DocumentNotFound { doc_id: String },

    /// The document exists but OCR has not produced a result for it yet.
    #[error("No OCR result for document {doc_id}, run OCR first")]
    ResultNotFound { doc_id: String },

    // ── PDF engine errors ─────────────────────────────────────────────────
    /// pdfium could not open the file.
    #[error("PDF '{path}' could not be opened: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// pdfium failed while rendering a page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// pdfium failed while building or saving the derived document.
    #[error("Failed to split '{path}': {detail}")]
    SplitFailed { path: PathBuf, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH (or --pdfium-lib-path) to the directory holding libpdfium."
    )]
    PdfiumBindingFailed(String),

    // ── OCR provider errors ───────────────────────────────────────────────
    /// The OCR credential is absent from the environment.
    #[error("OCR provider is not configured: {env_var} is not set")]
    OcrNotConfigured { env_var: String },

    /// The OCR call failed (transport, non-2xx status, undecodable body).
    #[error("OCR API error: {message}")]
    OcrApiError { message: String },

    // ── Local I/O ─────────────────────────────────────────────────────────
    /// The scratch directory could not be created.
    #[error("Cannot prepare scratch directory '{path}': {source}")]
    ScratchDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading or writing a scratch file failed.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DocFlowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DocFlowError::UnsupportedFileType { .. }
            | DocFlowError::FileTooLarge { .. }
            | DocFlowError::MissingUpload
            | DocFlowError::MalformedUpload { .. }
            | DocFlowError::MalformedRequest { .. }
            | DocFlowError::NoPageRanges
            | DocFlowError::InvalidExportFormat { .. }
            | DocFlowError::PageOutOfRange { .. }
            | DocFlowError::InvalidConfig(_) => ErrorKind::Validation,

            DocFlowError::DocumentNotFound { .. } | DocFlowError::ResultNotFound { .. } => {
                ErrorKind::NotFound
            }

            DocFlowError::CorruptPdf { .. }
            | DocFlowError::RasterisationFailed { .. }
            | DocFlowError::SplitFailed { .. }
            | DocFlowError::PdfiumBindingFailed(_)
            | DocFlowError::OcrNotConfigured { .. }
            | DocFlowError::OcrApiError { .. } => ErrorKind::Upstream,

            DocFlowError::ScratchDir { .. } | DocFlowError::Io { .. } | DocFlowError::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DocFlowError::Io {
            path: path.into(),
            source,
        }
    }
}
