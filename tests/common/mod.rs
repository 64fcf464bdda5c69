//! Fakes shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use docflow::pipeline::encode::OcrDocument;
use docflow::{
    DocFlowError, DocumentController, MemoryDocumentStore, MemoryResultStore, OcrEngine, OcrPage,
    OcrRequest, PageRange, PdfEngine, ServiceConfig,
};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Minimal bytes that pass as a PDF upload; the fake engine never parses them.
pub const PDF_BYTES: &[u8] = b"%PDF-1.7\n%fake\n";

/// [`PdfEngine`] that reports a fixed page count and records split calls.
#[derive(Default)]
pub struct FakePdf {
    pub pages: usize,
    pub fail_split: bool,
    pub count_calls: Mutex<usize>,
    pub splits: Mutex<Vec<Vec<PageRange>>>,
    pub split_outputs: Mutex<Vec<PathBuf>>,
}

impl FakePdf {
    pub fn with_pages(pages: usize) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }

    pub fn failing_split(pages: usize) -> Self {
        Self {
            pages,
            fail_split: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl PdfEngine for FakePdf {
    async fn page_count(&self, _path: &Path) -> Result<usize, DocFlowError> {
        *self.count_calls.lock() += 1;
        Ok(self.pages)
    }

    async fn render_thumbnail(
        &self,
        _path: &Path,
        page_index: usize,
        _scale: f32,
    ) -> Result<Vec<u8>, DocFlowError> {
        Ok(format!("png:{page_index}").into_bytes())
    }

    async fn split(
        &self,
        _path: &Path,
        ranges: &[PageRange],
        output: &Path,
    ) -> Result<usize, DocFlowError> {
        self.splits.lock().push(ranges.to_vec());
        self.split_outputs.lock().push(output.to_path_buf());
        assert!(output.exists(), "split target should be pre-created");
        std::fs::write(output, PDF_BYTES).map_err(|e| DocFlowError::Internal(e.to_string()))?;

        if self.fail_split {
            return Err(DocFlowError::SplitFailed {
                path: output.to_path_buf(),
                detail: "fake failure".into(),
            });
        }
        Ok(PageRange::expand(ranges, self.pages).len())
    }
}

/// [`OcrEngine`] returning canned pages, or failing on demand.
#[derive(Default)]
pub struct FakeOcr {
    pub pages: Mutex<Vec<String>>,
    pub fail: Mutex<bool>,
    pub requests: Mutex<Vec<OcrRequest>>,
}

impl FakeOcr {
    pub fn returning(pages: &[&str]) -> Self {
        let ocr = Self::default();
        ocr.set_pages(pages);
        ocr
    }

    pub fn set_pages(&self, pages: &[&str]) {
        *self.pages.lock() = pages.iter().map(|p| p.to_string()).collect();
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock() = fail;
    }

    pub fn last_document(&self) -> Option<OcrDocument> {
        self.requests.lock().last().map(|r| r.document.clone())
    }
}

#[async_trait]
impl OcrEngine for FakeOcr {
    async fn process(&self, request: &OcrRequest) -> Result<Vec<OcrPage>, DocFlowError> {
        self.requests.lock().push(request.clone());
        if *self.fail.lock() {
            return Err(DocFlowError::OcrApiError {
                message: "HTTP 500 Internal Server Error: boom".into(),
            });
        }
        Ok(self
            .pages
            .lock()
            .iter()
            .enumerate()
            .map(|(index, markdown)| OcrPage {
                index,
                markdown: markdown.clone(),
            })
            .collect())
    }
}

/// A controller over fakes, with handles on everything a test inspects.
pub struct Harness {
    pub dir: TempDir,
    pub pdf: Arc<FakePdf>,
    pub ocr: Arc<FakeOcr>,
    pub documents: Arc<MemoryDocumentStore>,
    pub results: Arc<MemoryResultStore>,
    pub controller: DocumentController,
}

impl Harness {
    pub async fn new(pdf: FakePdf, ocr: FakeOcr) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = ServiceConfig::builder()
            .scratch_dir(dir.path().join("scratch"))
            .build()
            .unwrap();

        let pdf = Arc::new(pdf);
        let ocr = Arc::new(ocr);
        let documents = Arc::new(MemoryDocumentStore::new());
        let results = Arc::new(MemoryResultStore::new());
        let controller = DocumentController::new(
            config,
            pdf.clone(),
            ocr.clone(),
            documents.clone(),
            results.clone(),
        )
        .await
        .unwrap();

        Self {
            dir,
            pdf,
            ocr,
            documents,
            results,
            controller,
        }
    }

    /// File names currently in the scratch directory.
    pub fn scratch_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.controller.scratch_dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}
