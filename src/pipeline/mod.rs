//! Pipeline stages of the document lifecycle.
//!
//! Each submodule implements exactly one step, so each is independently
//! testable and the two external engines can be swapped or faked.
//!
//! ## Data Flow
//!
//! ```text
//! upload ──▶ render ──▶ encode ──▶ ocr ──▶ postprocess
//! (validate,  (pdfium:    (base64   (Mistral  (Page N sections,
//!  persist)    count/     data URI)  OCR)      heading strip)
//!              thumb/split)
//! ```
//!
//! 1. [`upload`] — extension and size checks, raw bytes into scratch storage
//! 2. [`render`] — the [`render::PdfEngine`] trait and its pdfium
//!    implementation; runs in `spawn_blocking`
//! 3. [`encode`] — file bytes to the `image_url` / `document_url` payload
//! 4. [`ocr`] — the [`ocr::OcrEngine`] trait, the Mistral client, and
//!    [`ocr::run_ocr`] which drives one OCR pass over a file
//! 5. [`postprocess`] — Markdown and plain-text assembly

pub mod encode;
pub mod ocr;
pub mod postprocess;
pub mod render;
pub mod upload;
