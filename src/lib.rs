//! # mdpress
//!
//! Convert daily current-affairs digests written in Markdown into a styled,
//! print-ready HTML document, and optionally into an A4 PDF.
//!
//! The input is ordinary Markdown following two light conventions:
//!
//! * topic titles are level-2 headings,
//! * each topic's material is organised under numbered headings
//!   (`1.` syllabus, `2.` context, `4.` beyond the news, `5.` prelims,
//!   `6.` mains — `3.` static content stays flat).
//!
//! The converter normalizes the text, renders it to HTML, then restructures
//! the tree: Markdown tables become splittable `div` grids that survive
//! column and page breaks, and each recognised numbered section is wrapped
//! in a coloured container. Everything is assembled into a standalone
//! document with the stylesheet embedded, so the output file has no
//! external dependencies.
//!
//! ```text
//! Markdown ─ normalize ─ parse ─ reshape tables ─ wrap sections ─ HTML ─ (PDF)
//! ```
//!
//! ## Quick start
//!
//! ```rust
//! use mdpress::{convert_to_html, ConvertConfig};
//!
//! let config = ConvertConfig::default();
//! let out = convert_to_html("# Daily CA\n\n### 1. Syllabus\n\nGS2 Polity.\n", &config);
//! assert_eq!(out.title, "DAILY CA");
//! assert!(out.html.contains("colorbox syllabus"));
//! ```
//!
//! PDF export needs a local Chrome or Chromium and is async:
//!
//! ```rust,no_run
//! # async fn run() -> Result<(), mdpress::MdPressError> {
//! use mdpress::{convert_to_pdf, ConvertConfig};
//!
//! let out = convert_to_pdf("# Daily CA\n", &ConvertConfig::default()).await?;
//! std::fs::write("digest_press.pdf", &out.pdf).unwrap();
//! # Ok(())
//! # }
//! ```
//!
//! The HTML path is total — it cannot fail — so a missing browser never
//! costs you the document.

pub mod config;
pub mod convert;
pub mod dom;
pub mod error;
pub mod output;
pub mod pipeline;

pub use config::{ConvertConfig, ConvertConfigBuilder, MarginPolicy};
pub use convert::{
    convert_bytes_to_html, convert_to_html, convert_to_pdf, html_to_pdf, write_output,
};
pub use error::MdPressError;
pub use output::{HtmlOutput, PdfOutput, TransformStats};
