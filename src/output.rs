//! Value types produced by the document lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque identifier assigned to a document at upload time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for DocumentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A registered upload. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub id: DocumentId,
    /// Location of the original bytes in the scratch directory.
    pub path: PathBuf,
    /// Filename as supplied by the client.
    pub filename: String,
    /// Always 1 for images.
    pub total_pages: usize,
    pub is_image: bool,
}

impl StoredDocument {
    pub fn descriptor(&self) -> DocumentDescriptor {
        DocumentDescriptor {
            doc_id: self.id,
            filename: self.filename.clone(),
            total_pages: self.total_pages,
            is_image: self.is_image,
        }
    }

    /// Original filename without its extension, used to name exports.
    pub fn base_name(&self) -> &str {
        match self.filename.rfind('.') {
            Some(0) | None => &self.filename,
            Some(dot) => &self.filename[..dot],
        }
    }
}

/// Upload response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDescriptor {
    pub doc_id: DocumentId,
    pub filename: String,
    pub total_pages: usize,
    pub is_image: bool,
}

/// Text recognised by one OCR run over a document (or its selected pages).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrResult {
    /// Page-delimited Markdown.
    pub markdown: String,
    /// Same content with heading markers removed.
    pub txt: String,
    pub pages_processed: usize,
}

/// A rendered (or passed-through) page preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
}

/// A prepared download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub content: Vec<u8>,
    /// Suggested filename: original base name plus the format extension.
    pub filename: String,
    pub content_type: &'static str,
    /// Scratch copy written for this download.
    pub path: PathBuf,
}
