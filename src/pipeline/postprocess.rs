//! Post-processing: assemble per-page OCR text into the two export forms.
//!
//! * **Markdown** — every page becomes a section headed by a `## Page N`
//!   banner between horizontal rules, followed by the page's Markdown
//!   verbatim. Sections are joined by a blank line.
//! * **Plain text** — the same page text with heading markers removed from
//!   the start of every line and surrounding whitespace trimmed. Pages are
//!   joined by a blank line, without banners.

use crate::output::OcrResult;
use once_cell::sync::Lazy;
use regex::Regex;

/// Separator between page sections in both outputs.
pub const PAGE_JOIN: &str = "\n\n";

/// Markdown section for one page (1-indexed).
pub fn page_section(page_num: usize, markdown: &str) -> String {
    format!("---\n## Page {page_num}\n---\n\n{markdown}")
}

// Longest run first: "### x" must lose all three markers, and a marker left
// behind by stripping ("# # x") is stripped too.
static RE_HEADING_MARKERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(?:#+[ \t]+)+").unwrap());

/// Remove leading heading markers from every line, then trim.
pub fn strip_headings(markdown: &str) -> String {
    RE_HEADING_MARKERS
        .replace_all(markdown, "")
        .trim()
        .to_string()
}

/// Build the final result from the engine's pages, in engine order.
pub fn assemble<S: AsRef<str>>(pages: &[S]) -> OcrResult {
    let markdown = pages
        .iter()
        .enumerate()
        .map(|(i, page)| page_section(i + 1, page.as_ref()))
        .collect::<Vec<_>>()
        .join(PAGE_JOIN);

    let txt = pages
        .iter()
        .map(|page| strip_headings(page.as_ref()))
        .collect::<Vec<_>>()
        .join(PAGE_JOIN);

    OcrResult {
        markdown,
        txt,
        pages_processed: pages.len(),
    }
}
