//! Document lifecycle controller.
//!
//! The only component with sequencing logic:
//!
//! ```text
//! upload ──▶ thumbnail (any number of times)
//!    │
//!    └──▶ run_ocr (split selected pages → OCR → upsert result) ──▶ download
//! ```
//!
//! The controller owns no state of its own beyond configuration; documents
//! and results live in the injected [`DocumentStore`] and [`ResultStore`].

use crate::config::{ExportFormat, PageRange, ServiceConfig};
use crate::error::DocFlowError;
use crate::output::{
    DocumentDescriptor, DocumentId, ExportFile, OcrResult, StoredDocument, Thumbnail,
};
use crate::pipeline::ocr::{self, MistralOcrClient, OcrEngine};
use crate::pipeline::render::{PdfEngine, PdfiumEngine};
use crate::pipeline::upload;
use crate::store::{DocumentStore, MemoryDocumentStore, MemoryResultStore, ResultStore};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Content type of every export download.
pub const EXPORT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Orchestrates upload, preview, OCR and export for every document.
pub struct DocumentController {
    config: ServiceConfig,
    pdf: Arc<dyn PdfEngine>,
    ocr: Arc<dyn OcrEngine>,
    documents: Arc<dyn DocumentStore>,
    results: Arc<dyn ResultStore>,
}

impl DocumentController {
    /// Assemble a controller and make sure the scratch directory exists.
    pub async fn new(
        config: ServiceConfig,
        pdf: Arc<dyn PdfEngine>,
        ocr: Arc<dyn OcrEngine>,
        documents: Arc<dyn DocumentStore>,
        results: Arc<dyn ResultStore>,
    ) -> Result<Self, DocFlowError> {
        tokio::fs::create_dir_all(&config.scratch_dir)
            .await
            .map_err(|e| DocFlowError::ScratchDir {
                path: config.scratch_dir.clone(),
                source: e,
            })?;
        info!("Scratch directory: {}", config.scratch_dir.display());

        Ok(Self {
            config,
            pdf,
            ocr,
            documents,
            results,
        })
    }

    /// Controller with fresh in-memory stores.
    pub async fn with_memory_stores(
        config: ServiceConfig,
        pdf: Arc<dyn PdfEngine>,
        ocr: Arc<dyn OcrEngine>,
    ) -> Result<Self, DocFlowError> {
        Self::new(
            config,
            pdf,
            ocr,
            Arc::new(MemoryDocumentStore::new()),
            Arc::new(MemoryResultStore::new()),
        )
        .await
    }

    /// Production wiring: pdfium, Mistral OCR, in-memory stores.
    pub async fn from_config(config: ServiceConfig) -> Result<Self, DocFlowError> {
        let pdf = Arc::new(PdfiumEngine::new(config.pdfium_lib_path.clone()));
        let ocr = Arc::new(MistralOcrClient::new(&config)?);
        Self::with_memory_stores(config, pdf, ocr).await
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.config.scratch_dir
    }

    /// Look up a registered document.
    pub fn document(&self, id: &DocumentId) -> Result<StoredDocument, DocFlowError> {
        self.documents
            .get(id)
            .ok_or_else(|| DocFlowError::DocumentNotFound {
                doc_id: id.to_string(),
            })
    }

    /// Latest OCR result for a document, if any.
    pub fn result(&self, id: &DocumentId) -> Option<OcrResult> {
        self.results.get(id)
    }

    /// Validate, persist and register an upload.
    ///
    /// Nothing is registered when validation or page counting fails.
    pub async fn upload(
        &self,
        bytes: &[u8],
        filename: &str,
    ) -> Result<DocumentDescriptor, DocFlowError> {
        let validated = upload::validate(filename, bytes.len()).inspect_err(|e| {
            warn!("Rejected upload '{}': {}", filename, e);
        })?;

        let id = DocumentId::new();
        let path =
            upload::persist(&self.config.scratch_dir, &id, &validated.extension, bytes).await?;

        let total_pages = if validated.is_image {
            1
        } else {
            self.pdf.page_count(&path).await?
        };

        let document = StoredDocument {
            id,
            path,
            filename: filename.to_string(),
            total_pages,
            is_image: validated.is_image,
        };
        let descriptor = document.descriptor();
        self.documents.insert(document);

        info!(
            "Registered document {} '{}' ({} pages, image={})",
            id, filename, total_pages, validated.is_image
        );
        Ok(descriptor)
    }

    /// Preview one page (1-indexed). Images are returned verbatim and the
    /// page number is ignored.
    pub async fn thumbnail(
        &self,
        id: &DocumentId,
        page_num: i64,
    ) -> Result<Thumbnail, DocFlowError> {
        let document = self.document(id)?;

        if document.is_image {
            let bytes = tokio::fs::read(&document.path)
                .await
                .map_err(|e| DocFlowError::io(&document.path, e))?;
            return Ok(Thumbnail {
                bytes,
                mime: upload::image_mime(&document.path),
            });
        }

        if page_num < 1 || page_num as usize > document.total_pages {
            return Err(DocFlowError::PageOutOfRange {
                page: page_num,
                total: document.total_pages,
            });
        }

        let bytes = self
            .pdf
            .render_thumbnail(
                &document.path,
                (page_num - 1) as usize,
                self.config.thumbnail_scale,
            )
            .await?;
        debug!("Thumbnail {} page {}: {} bytes", id, page_num, bytes.len());

        Ok(Thumbnail {
            bytes,
            mime: "image/png",
        })
    }

    /// OCR a document and store the result, replacing any earlier one.
    ///
    /// PDFs need at least one page range; the selected pages are split into
    /// a temporary PDF that is removed once OCR finishes, whatever the
    /// outcome. Images ignore `ranges` and are sent as they are.
    pub async fn run_ocr(
        &self,
        id: &DocumentId,
        ranges: &[PageRange],
    ) -> Result<OcrResult, DocFlowError> {
        let document = self.document(id)?;

        let result = if document.is_image {
            ocr::run_ocr(&*self.ocr, &self.config.ocr_model, &document.path).await?
        } else {
            if ranges.is_empty() {
                return Err(DocFlowError::NoPageRanges);
            }
            self.ocr_selected_pages(&document, ranges).await?
        };

        if self.results.upsert(*id, result.clone()).is_some() {
            debug!("Replaced previous OCR result for {}", id);
        }
        Ok(result)
    }

    async fn ocr_selected_pages(
        &self,
        document: &StoredDocument,
        ranges: &[PageRange],
    ) -> Result<OcrResult, DocFlowError> {
        let scratch = &self.config.scratch_dir;

        // Removed on drop, so every early return below cleans up too.
        let split_path = tempfile::Builder::new()
            .prefix(&format!("{}_split_", document.id))
            .suffix(".pdf")
            .tempfile_in(scratch)
            .map_err(|e| DocFlowError::io(scratch, e))?
            .into_temp_path();

        let written = self.pdf.split(&document.path, ranges, &split_path).await?;
        info!(
            "OCR on {} selected pages of {} ({} ranges)",
            written,
            document.id,
            ranges.len()
        );

        let outcome = ocr::run_ocr(&*self.ocr, &self.config.ocr_model, &split_path).await;

        let shown = split_path.to_path_buf();
        if let Err(e) = split_path.close() {
            warn!("Could not remove {}: {}", shown.display(), e);
        }

        outcome
    }

    /// Prepare a download of the latest result as `md` or `txt`.
    ///
    /// The format is checked before anything else.
    pub async fn download(
        &self,
        id: &DocumentId,
        format: &str,
    ) -> Result<ExportFile, DocFlowError> {
        let format: ExportFormat = format.parse()?;

        let result = self
            .results
            .get(id)
            .ok_or_else(|| DocFlowError::ResultNotFound {
                doc_id: id.to_string(),
            })?;
        let document = self.document(id)?;

        let content = match format {
            ExportFormat::Md => result.markdown,
            ExportFormat::Txt => result.txt,
        };

        let path = self
            .config
            .scratch_dir
            .join(format!("{id}_output.{format}"));
        tokio::fs::write(&path, &content)
            .await
            .map_err(|e| DocFlowError::io(&path, e))?;

        info!("Exported {} as {} ({} bytes)", id, format, content.len());
        Ok(ExportFile {
            content: content.into_bytes(),
            filename: format!("{}.{format}", document.base_name()),
            content_type: EXPORT_CONTENT_TYPE,
            path,
        })
    }
}
