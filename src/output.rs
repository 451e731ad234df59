//! Output types returned by the conversion entry points.

use serde::{Deserialize, Serialize};

/// Result of the Markdown → HTML transformation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HtmlOutput {
    /// Resolved document title (first `h1`, uppercased, or the fallback).
    pub title: String,
    /// The complete styled HTML document.
    pub html: String,
    /// Counters from the structural passes.
    pub stats: TransformStats,
}

/// What the structural passes did to the tree. Useful for logging and for
/// spotting digests that silently stopped matching the section conventions
/// (a digest with zero wrapped sections usually means the numbering broke).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TransformStats {
    /// Tables replaced by gridtable structures.
    pub tables_reshaped: usize,
    /// Section headings wrapped into colorboxes.
    pub sections_wrapped: usize,
    /// Level-2 headings tagged as topic titles.
    pub topics_tagged: usize,
    /// Wall-clock time of the whole transformation in milliseconds.
    pub duration_ms: u64,
}

/// Result of a combined HTML + PDF conversion.
#[derive(Debug, Clone)]
pub struct PdfOutput {
    /// The HTML stage output (always produced first).
    pub html: HtmlOutput,
    /// The rendered A4 PDF.
    pub pdf: Vec<u8>,
}
