//! Process-wide document and result tables.
//!
//! The controller only talks to the [`DocumentStore`] and [`ResultStore`]
//! traits, so a persistent or sharded store can replace the in-memory ones
//! without touching lifecycle logic. The in-memory stores live for as long
//! as the process does.
//!
//! There is no per-document serialisation: two OCR runs racing on the same
//! id both [`ResultStore::upsert`], and the later write wins.

use crate::output::{DocumentId, OcrResult, StoredDocument};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Registry of uploaded documents.
pub trait DocumentStore: Send + Sync {
    fn insert(&self, document: StoredDocument);
    fn get(&self, id: &DocumentId) -> Option<StoredDocument>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Latest OCR result per document.
pub trait ResultStore: Send + Sync {
    /// Insert or replace the result for `id`, returning the replaced one.
    fn upsert(&self, id: DocumentId, result: OcrResult) -> Option<OcrResult>;
    fn get(&self, id: &DocumentId) -> Option<OcrResult>;
}

#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<DocumentId, StoredDocument>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn insert(&self, document: StoredDocument) {
        self.documents.write().insert(document.id, document);
    }

    fn get(&self, id: &DocumentId) -> Option<StoredDocument> {
        self.documents.read().get(id).cloned()
    }

    fn len(&self) -> usize {
        self.documents.read().len()
    }
}

#[derive(Debug, Default)]
pub struct MemoryResultStore {
    results: RwLock<HashMap<DocumentId, OcrResult>>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultStore for MemoryResultStore {
    fn upsert(&self, id: DocumentId, result: OcrResult) -> Option<OcrResult> {
        self.results.write().insert(id, result)
    }

    fn get(&self, id: &DocumentId) -> Option<OcrResult> {
        self.results.read().get(id).cloned()
    }
}
