//! Error types for the mdpress library.
//!
//! The Markdown-to-HTML transformation is total: malformed input degrades
//! gracefully (lenient parsing, conservative classification) and always
//! produces a document, so nothing in the transformation path returns an
//! error. Everything that *can* fail sits at the edges:
//!
//! * configuration validation,
//! * reading input / writing output files,
//! * the PDF export stage.
//!
//! PDF failures are split in two so callers can react differently:
//! [`MdPressError::BrowserUnavailable`] means the rendering engine itself is
//! missing (an installation problem), while [`MdPressError::PdfRenderFailed`]
//! means the engine ran but navigation or export broke. Either way the caller
//! still holds the HTML output — PDF export is always a separate step.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the mdpress library.
#[derive(Debug, Error)]
pub enum MdPressError {
    // ── I/O errors ────────────────────────────────────────────────────────
    /// Input file could not be read.
    #[error("Failed to read input file '{path}': {source}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Rendering-engine errors ───────────────────────────────────────────
    /// No Chrome/Chromium could be found or launched.
    #[error(
        "PDF engine unavailable: {0}\n\n\
Rendering PDFs requires a Chrome or Chromium installation.\n\
  • Install Chromium (e.g. `apt install chromium` or `brew install chromium`).\n\
  • Or point mdpress at an existing binary with --chrome-path.\n\
The HTML output does not need a browser and is still available."
    )]
    BrowserUnavailable(String),

    /// The browser launched but navigation or PDF export failed.
    #[error("PDF rendering failed: {detail}")]
    PdfRenderFailed { detail: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MdPressError {
    /// Whether this error came from the PDF stage rather than configuration
    /// or I/O — callers can keep the HTML output when it did.
    pub fn is_pdf_error(&self) -> bool {
        matches!(
            self,
            MdPressError::BrowserUnavailable(_) | MdPressError::PdfRenderFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn browser_unavailable_names_the_fix() {
        let e = MdPressError::BrowserUnavailable("no executable found".into());
        let msg = e.to_string();
        assert!(msg.contains("--chrome-path"));
        assert!(msg.contains("no executable found"));
        assert!(e.is_pdf_error());
    }

    #[test]
    fn render_failure_distinct_from_unavailability() {
        let e = MdPressError::PdfRenderFailed {
            detail: "navigation timed out".into(),
        };
        assert!(e.is_pdf_error());
        assert!(!e.to_string().contains("chrome-path"));
    }

    #[test]
    fn config_error_is_not_a_pdf_error() {
        assert!(!MdPressError::InvalidConfig("x".into()).is_pdf_error());
    }
}
