//! Payload encoding: file bytes → base64 data URI in the OCR request shape.
//!
//! The OCR API takes the whole input inline. Images go in an `image_url`
//! payload with their own mime type; anything else is sent as a PDF in a
//! `document_url` payload.

use crate::error::DocFlowError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// The `document` field of an OCR request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OcrDocument {
    DocumentUrl { document_url: String },
    ImageUrl { image_url: String },
}

impl OcrDocument {
    pub fn is_image(&self) -> bool {
        matches!(self, OcrDocument::ImageUrl { .. })
    }

    /// The data URI carried by either variant.
    pub fn url(&self) -> &str {
        match self {
            OcrDocument::DocumentUrl { document_url } => document_url,
            OcrDocument::ImageUrl { image_url } => image_url,
        }
    }
}

/// Image mime type for OCR, keyed on the lowercase extension.
fn ocr_image_mime(extension: &str) -> Option<&'static str> {
    match extension {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "avif" => Some("image/avif"),
        _ => None,
    }
}

/// Encode in-memory bytes, choosing the payload shape from `extension`.
pub fn encode_bytes(bytes: &[u8], extension: &str) -> OcrDocument {
    let b64 = STANDARD.encode(bytes);
    debug!("Encoded {} bytes → {} bytes base64", bytes.len(), b64.len());

    match ocr_image_mime(&extension.to_ascii_lowercase()) {
        Some(mime) => OcrDocument::ImageUrl {
            image_url: format!("data:{mime};base64,{b64}"),
        },
        None => OcrDocument::DocumentUrl {
            document_url: format!("data:application/pdf;base64,{b64}"),
        },
    }
}

/// Read `path` and encode it for the OCR request.
pub async fn encode_file(path: &Path) -> Result<OcrDocument, DocFlowError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| DocFlowError::io(path, e))?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    Ok(encode_bytes(&bytes, extension))
}
