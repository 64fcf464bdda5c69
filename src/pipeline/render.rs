//! PDF engine: page counting, thumbnail rendering and page-range splitting.
//!
//! The controller only sees the [`PdfEngine`] trait. [`PdfiumEngine`] is the
//! production implementation on top of `pdfium-render`.
//!
//! ## Why spawn_blocking?
//!
//! pdfium is a C++ library with thread-local state and CPU-heavy calls; it
//! is not safe to drive from async contexts. Every operation binds pdfium,
//! does its work and drops the binding inside `tokio::task::spawn_blocking`,
//! so Tokio worker threads never stall on rendering.

use crate::config::PageRange;
use crate::error::DocFlowError;
use async_trait::async_trait;
use image::ImageFormat;
use pdfium_render::prelude::*;
use std::io::Cursor;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The three PDF operations the lifecycle needs.
#[async_trait]
pub trait PdfEngine: Send + Sync {
    /// Open the document and count its pages.
    async fn page_count(&self, path: &Path) -> Result<usize, DocFlowError>;

    /// Render one page (0-indexed) scaled by `scale`, PNG-encoded.
    async fn render_thumbnail(
        &self,
        path: &Path,
        page_index: usize,
        scale: f32,
    ) -> Result<Vec<u8>, DocFlowError>;

    /// Write a new PDF at `output` holding the pages selected by `ranges`,
    /// in caller order, each range clamped to the source bounds.
    ///
    /// Returns the number of pages written.
    async fn split(
        &self,
        path: &Path,
        ranges: &[PageRange],
        output: &Path,
    ) -> Result<usize, DocFlowError>;
}

/// [`PdfEngine`] backed by pdfium.
#[derive(Debug, Clone, Default)]
pub struct PdfiumEngine {
    lib_path: Option<PathBuf>,
}

impl PdfiumEngine {
    /// `lib_path` may name the library file itself or the directory holding it.
    pub fn new(lib_path: Option<PathBuf>) -> Self {
        Self { lib_path }
    }
}

#[async_trait]
impl PdfEngine for PdfiumEngine {
    async fn page_count(&self, path: &Path) -> Result<usize, DocFlowError> {
        let lib = self.lib_path.clone();
        let path = path.to_path_buf();
        run_blocking("page count", move || {
            page_count_blocking(lib.as_deref(), &path)
        })
        .await
    }

    async fn render_thumbnail(
        &self,
        path: &Path,
        page_index: usize,
        scale: f32,
    ) -> Result<Vec<u8>, DocFlowError> {
        let lib = self.lib_path.clone();
        let path = path.to_path_buf();
        run_blocking("thumbnail", move || {
            render_thumbnail_blocking(lib.as_deref(), &path, page_index, scale)
        })
        .await
    }

    async fn split(
        &self,
        path: &Path,
        ranges: &[PageRange],
        output: &Path,
    ) -> Result<usize, DocFlowError> {
        let lib = self.lib_path.clone();
        let path = path.to_path_buf();
        let ranges = ranges.to_vec();
        let output = output.to_path_buf();
        run_blocking("split", move || {
            split_blocking(lib.as_deref(), &path, &ranges, &output)
        })
        .await
    }
}

async fn run_blocking<T, F>(what: &'static str, f: F) -> Result<T, DocFlowError>
where
    F: FnOnce() -> Result<T, DocFlowError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| DocFlowError::Internal(format!("{what} task panicked: {e}")))?
}

/// Bind pdfium from an explicit location, else `./`, else the system path.
fn bind_pdfium(lib_path: Option<&Path>) -> Result<Pdfium, DocFlowError> {
    let bindings = match lib_path {
        Some(p) if p.is_file() => Pdfium::bind_to_library(p),
        Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)),
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| DocFlowError::PdfiumBindingFailed(format!("{e:?}")))?;

    Ok(Pdfium::new(bindings))
}

fn open<'a>(pdfium: &'a Pdfium, path: &Path) -> Result<PdfDocument<'a>, DocFlowError> {
    pdfium
        .load_pdf_from_file(path, None)
        .map_err(|e| DocFlowError::CorruptPdf {
            path: path.to_path_buf(),
            detail: format!("{e:?}"),
        })
}

fn page_count_blocking(lib: Option<&Path>, path: &Path) -> Result<usize, DocFlowError> {
    let pdfium = bind_pdfium(lib)?;
    let document = open(&pdfium, path)?;
    let total = document.pages().len() as usize;
    info!("PDF loaded: {} pages ({})", total, path.display());
    Ok(total)
}

fn render_thumbnail_blocking(
    lib: Option<&Path>,
    path: &Path,
    page_index: usize,
    scale: f32,
) -> Result<Vec<u8>, DocFlowError> {
    let pdfium = bind_pdfium(lib)?;
    let document = open(&pdfium, path)?;
    let pages = document.pages();
    let total = pages.len() as usize;

    if page_index >= total {
        return Err(DocFlowError::PageOutOfRange {
            page: page_index as i64 + 1,
            total,
        });
    }

    let page = pages
        .get(page_index as PdfPageIndex)
        .map_err(|e| DocFlowError::RasterisationFailed {
            page: page_index + 1,
            detail: format!("{e:?}"),
        })?;

    let render_config = PdfRenderConfig::new().scale_page_by_factor(scale);
    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| DocFlowError::RasterisationFailed {
            page: page_index + 1,
            detail: format!("{e:?}"),
        })?;

    let image = bitmap.as_image();
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| DocFlowError::RasterisationFailed {
            page: page_index + 1,
            detail: format!("PNG encoding failed: {e}"),
        })?;

    debug!(
        "Rendered page {} → {}x{} px, {} bytes",
        page_index + 1,
        image.width(),
        image.height(),
        png.len()
    );
    Ok(png)
}

fn split_blocking(
    lib: Option<&Path>,
    path: &Path,
    ranges: &[PageRange],
    output: &Path,
) -> Result<usize, DocFlowError> {
    let split_err = |detail: String| DocFlowError::SplitFailed {
        path: path.to_path_buf(),
        detail,
    };

    let pdfium = bind_pdfium(lib)?;
    let source = open(&pdfium, path)?;
    let indices = PageRange::expand(ranges, source.pages().len() as usize);

    let mut derived = pdfium
        .create_new_pdf()
        .map_err(|e| split_err(format!("{e:?}")))?;

    for run in ascending_runs(&indices) {
        let destination = derived.pages().len();
        derived
            .pages_mut()
            .copy_page_range_from_document(
                &source,
                (*run.start() as PdfPageIndex)..=(*run.end() as PdfPageIndex),
                destination,
            )
            .map_err(|e| split_err(format!("copying pages {run:?}: {e:?}")))?;
    }

    derived
        .save_to_file(output)
        .map_err(|e| split_err(format!("saving {}: {e:?}", output.display())))?;

    info!(
        "Split {} → {} pages into {}",
        path.display(),
        indices.len(),
        output.display()
    );
    Ok(indices.len())
}

/// Group an ordered index list into maximal runs of consecutive ascending
/// pages, so each run is a single pdfium copy call.
pub fn ascending_runs(indices: &[usize]) -> Vec<RangeInclusive<usize>> {
    let mut runs: Vec<RangeInclusive<usize>> = Vec::new();
    for &idx in indices {
        if let Some(run) = runs.last_mut() {
            if *run.end() + 1 == idx {
                *run = *run.start()..=idx;
                continue;
            }
        }
        runs.push(idx..=idx);
    }
    runs
}
