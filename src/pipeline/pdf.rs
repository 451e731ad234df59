//! PDF export through a headless Chromium instance.
//!
//! The browser does the actual layout work (two-column flow, page breaks,
//! `box-decoration-break` cloning), so the export is exactly what the HTML
//! file looks like when printed. The CDP session is synchronous and not
//! async-safe, so the whole export runs inside `spawn_blocking` with a
//! timeout wrapped around it. Only this stage gets a timeout: it is the
//! only part of the pipeline that talks to another process.
//!
//! Engine failures are reported in two classes. If no browser can be found
//! or launched, that is [`MdPressError::BrowserUnavailable`] (an install
//! problem, fixable with `--chrome-path`). Anything after a successful
//! launch is [`MdPressError::PdfRenderFailed`].

use std::ffi::OsStr;
use std::fs;
use std::time::Duration;

use headless_chrome::protocol::cdp::Emulation;
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions};
use tracing::{debug, info};

use crate::config::ConvertConfig;
use crate::error::MdPressError;

// A4 in inches, as the CDP print call expects.
const A4_WIDTH_IN: f64 = 8.27;
const A4_HEIGHT_IN: f64 = 11.69;

/// Render a complete HTML document to A4 PDF bytes.
///
/// The document is written to a temporary file and loaded over `file://` so
/// the browser applies normal document semantics (a data URL would hit size
/// limits on large digests). Honours `config.pdf_timeout_secs`.
pub async fn render_pdf(html: &str, config: &ConvertConfig) -> Result<Vec<u8>, MdPressError> {
    let html = html.to_owned();
    let config = config.clone();
    let timeout_secs = config.pdf_timeout_secs;
    let timeout = Duration::from_secs(timeout_secs);

    let task = tokio::task::spawn_blocking(move || render_pdf_blocking(&html, &config));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(MdPressError::Internal(format!(
            "PDF export task panicked: {join_err}"
        ))),
        Err(_) => Err(MdPressError::PdfRenderFailed {
            detail: format!(
                "browser did not finish within {}s (raise the timeout for very large digests)",
                timeout_secs
            ),
        }),
    }
}

fn render_pdf_blocking(html: &str, config: &ConvertConfig) -> Result<Vec<u8>, MdPressError> {
    // file:// navigation needs the document on disk.
    let dir = tempfile::tempdir().map_err(|e| MdPressError::Internal(format!(
        "could not create temporary directory for PDF export: {e}"
    )))?;
    let html_path = dir.path().join("digest.html");
    fs::write(&html_path, html).map_err(|e| MdPressError::Internal(format!(
        "could not stage HTML for PDF export: {e}"
    )))?;

    let launch = LaunchOptions::default_builder()
        .headless(true)
        .path(config.chrome_path.clone())
        .args(vec![OsStr::new("--force-color-profile=srgb")])
        .build()
        .map_err(|e| MdPressError::BrowserUnavailable(e.to_string()))?;

    let browser =
        Browser::new(launch).map_err(|e| MdPressError::BrowserUnavailable(e.to_string()))?;
    debug!("browser launched for PDF export");

    let tab = browser.new_tab().map_err(render_failed)?;

    let url = format!("file://{}", html_path.display());
    tab.navigate_to(&url).map_err(render_failed)?;
    tab.wait_until_navigated().map_err(render_failed)?;

    // Print styles, not screen styles.
    tab.call_method(Emulation::SetEmulatedMedia {
        media: Some("print".to_string()),
        features: None,
    })
    .map_err(render_failed)?;

    let (top, bottom, left, right) = config.margin_policy.export_margins_in();
    let pdf = tab
        .print_to_pdf(Some(PrintToPdfOptions {
            print_background: Some(true),
            prefer_css_page_size: Some(true),
            paper_width: Some(A4_WIDTH_IN),
            paper_height: Some(A4_HEIGHT_IN),
            margin_top: Some(top),
            margin_bottom: Some(bottom),
            margin_left: Some(left),
            margin_right: Some(right),
            ..Default::default()
        }))
        .map_err(render_failed)?;

    info!(bytes = pdf.len(), "PDF export complete");
    Ok(pdf)
}

fn render_failed<E: std::fmt::Display>(e: E) -> MdPressError {
    MdPressError::PdfRenderFailed {
        detail: e.to_string(),
    }
}
