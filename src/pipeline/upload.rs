//! Upload validation and scratch persistence.
//!
//! Validation is purely name- and size-based: the extension decides whether
//! the upload is an image (always one page) or a PDF (page count comes from
//! pdfium later). Content sniffing is left to pdfium and the OCR provider,
//! which reject garbage with an upstream error.

use crate::config::MAX_UPLOAD_BYTES;
use crate::error::DocFlowError;
use crate::output::DocumentId;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extensions accepted by [`validate`], lowercase.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png"];

/// Subset of [`SUPPORTED_EXTENSIONS`] treated as single-page images.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// An upload that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUpload {
    /// Lowercase extension without the dot.
    pub extension: String,
    pub is_image: bool,
}

/// Lowercase extension of `filename`, if any.
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Check extension first, then size against [`MAX_UPLOAD_BYTES`].
pub fn validate(filename: &str, size: usize) -> Result<ValidatedUpload, DocFlowError> {
    let extension = extension_of(filename)
        .filter(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .ok_or_else(|| DocFlowError::UnsupportedFileType {
            filename: filename.to_string(),
        })?;

    if size > MAX_UPLOAD_BYTES {
        return Err(DocFlowError::FileTooLarge {
            size,
            limit_mb: MAX_UPLOAD_BYTES / (1024 * 1024),
        });
    }

    let is_image = IMAGE_EXTENSIONS.contains(&extension.as_str());
    Ok(ValidatedUpload {
        extension,
        is_image,
    })
}

/// Write the raw upload to `<scratch_dir>/<id>.<extension>`.
pub async fn persist(
    scratch_dir: &Path,
    id: &DocumentId,
    extension: &str,
    bytes: &[u8],
) -> Result<PathBuf, DocFlowError> {
    let path = scratch_dir.join(format!("{id}.{extension}"));
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| DocFlowError::io(&path, e))?;
    debug!("Stored upload {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}

/// Mime type for serving an image upload back verbatim.
pub fn image_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "image/png",
    }
}
