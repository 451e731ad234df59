//! High-level conversion entry points.
//!
//! [`convert_to_html`] is the heart of the crate and is total: any input
//! string, however mangled, yields a complete HTML document. The PDF entry
//! points add the only fallible stage on top of it.

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use crate::config::ConvertConfig;
use crate::dom::Dom;
use crate::error::MdPressError;
use crate::output::{HtmlOutput, PdfOutput, TransformStats};
use crate::pipeline;

/// Convert digest Markdown into a complete styled HTML document.
///
/// Never fails: malformed Markdown parses leniently, unrecognised structure
/// passes through unchanged, and the classification passes simply match
/// nothing when the numbering conventions are absent.
pub fn convert_to_html(markdown: &str, config: &ConvertConfig) -> HtmlOutput {
    let started = Instant::now();

    let normalized = pipeline::normalize::normalize_markdown(markdown);
    let fragment = pipeline::parse::markdown_to_fragment(&normalized);
    debug!(bytes = fragment.len(), "markdown rendered to fragment");

    let (mut dom, body) = Dom::parse_fragment(&fragment);

    let tables_reshaped = pipeline::grid::reshape_tables(&mut dom, body);
    let topics_tagged = pipeline::sections::tag_topic_titles(&mut dom, body);
    let sections_wrapped = pipeline::sections::wrap_sections(&mut dom, body);

    let (title, html) = pipeline::assemble::assemble_document(&dom, body, config);

    let stats = TransformStats {
        tables_reshaped,
        sections_wrapped,
        topics_tagged,
        duration_ms: started.elapsed().as_millis() as u64,
    };
    info!(
        %title,
        tables = stats.tables_reshaped,
        sections = stats.sections_wrapped,
        topics = stats.topics_tagged,
        ms = stats.duration_ms,
        "digest converted"
    );

    HtmlOutput { title, html, stats }
}

/// Convert raw input bytes, decoding as UTF-8 with replacement for any
/// invalid sequences and stripping a leading BOM. Digest sources are
/// occasionally exported with stray bytes; losing a character beats
/// refusing the file.
pub fn convert_bytes_to_html(bytes: &[u8], config: &ConvertConfig) -> HtmlOutput {
    let (text, _, had_errors) = encoding_rs::UTF_8.decode(bytes);
    if had_errors {
        debug!("input contained invalid UTF-8; decoded with replacement");
    }
    convert_to_html(&text, config)
}

/// Render a complete HTML document to A4 PDF bytes.
pub async fn html_to_pdf(html: &str, config: &ConvertConfig) -> Result<Vec<u8>, MdPressError> {
    pipeline::pdf::render_pdf(html, config).await
}

/// Convert digest Markdown straight to a PDF, returning the intermediate
/// HTML alongside the bytes. The HTML stage cannot fail; any error here is
/// from the PDF engine.
pub async fn convert_to_pdf(
    markdown: &str,
    config: &ConvertConfig,
) -> Result<PdfOutput, MdPressError> {
    let html = convert_to_html(markdown, config);
    let pdf = html_to_pdf(&html.html, config).await?;
    Ok(PdfOutput { html, pdf })
}

/// Write output bytes atomically: stage into a temporary file in the target
/// directory, then rename over the destination. A crash mid-write never
/// leaves a truncated digest behind.
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<(), MdPressError> {
    use std::io::Write as _;

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = match dir {
        Some(dir) => tempfile::NamedTempFile::new_in(dir),
        None => tempfile::NamedTempFile::new(),
    }
    .map_err(|source| MdPressError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    })?;

    tmp.write_all(bytes)
        .map_err(|source| MdPressError::OutputWriteFailed {
            path: path.to_path_buf(),
            source,
        })?;

    tmp.persist(path)
        .map_err(|e| MdPressError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e.error,
        })?;
    Ok(())
}
