//! CLI binary for mdpress.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConvertConfig`, writes the output files, and prints a summary.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use mdpress::{
    convert_bytes_to_html, html_to_pdf, write_output, ConvertConfig, MarginPolicy, MdPressError,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a digest to styled HTML next to the input (digest_press.html)
  mdpress digest.md

  # Also render the A4 PDF (digest_press.pdf)
  mdpress digest.md --pdf

  # Explicit output paths
  mdpress digest.md -o out/today.html --pdf --pdf-output out/today.pdf

  # HTML to stdout
  mdpress digest.md -o -

  # Use a specific Chromium binary and a longer export timeout
  mdpress digest.md --pdf --chrome-path /usr/bin/chromium --pdf-timeout 120

  # Margins applied by the export call instead of the page box
  mdpress digest.md --pdf --margin-policy export

  # JSON summary for scripting
  mdpress digest.md --pdf --json

SECTION CONVENTIONS:
  Topic titles are level-2 headings. Numbered headings are wrapped into
  coloured containers: 1. syllabus, 2. context, 4. beyond the news,
  5. prelims pointers, 6. mains angles. Section 3 (static content) and
  unnumbered headings stay flat. Markdown tables become splittable
  two-column grids that survive column and page breaks.

ENVIRONMENT VARIABLES:
  MDPRESS_OUTPUT        Default HTML output path
  MDPRESS_CHROME_PATH   Path to a Chrome/Chromium binary for PDF export
  MDPRESS_PDF_TIMEOUT   PDF export timeout in seconds
  MDPRESS_VERBOSE       Enable DEBUG-level tracing logs
  MDPRESS_QUIET         Suppress all output except errors

PDF export requires a local Chrome or Chromium installation. The HTML
output is self-contained (stylesheet embedded) and needs no browser.
"#;

/// Convert Markdown digests to styled HTML and A4 PDF.
#[derive(Parser, Debug)]
#[command(
    name = "mdpress",
    version,
    about = "Convert Markdown digests to styled, print-ready HTML and A4 PDF",
    long_about = "Convert daily current-affairs digests written in Markdown into a styled \
two-column HTML document, and optionally into an A4 PDF via headless Chromium. \
Numbered section headings are wrapped in coloured boxes and Markdown tables are \
reshaped into grids that split cleanly across columns and pages.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input Markdown file.
    input: PathBuf,

    /// HTML output path ('-' for stdout). Default: <input stem>_press.html.
    #[arg(short, long, env = "MDPRESS_OUTPUT")]
    output: Option<PathBuf>,

    /// Also render an A4 PDF.
    #[arg(long)]
    pdf: bool,

    /// PDF output path. Default: <input stem>_press.pdf. Implies --pdf.
    #[arg(long, env = "MDPRESS_PDF_OUTPUT")]
    pdf_output: Option<PathBuf>,

    /// Title used when the digest has no level-1 heading.
    /// Default: the input file's stem.
    #[arg(long)]
    title: Option<String>,

    /// Replace the built-in stylesheet with this CSS file.
    #[arg(long, env = "MDPRESS_STYLESHEET")]
    stylesheet: Option<PathBuf>,

    /// Where the page margins come from: page-box (padding baked into the
    /// document) or export (margins applied by the browser's PDF call).
    #[arg(long, value_enum, default_value = "page-box")]
    margin_policy: MarginPolicyArg,

    /// Path to a Chrome/Chromium binary for PDF export.
    #[arg(long, env = "MDPRESS_CHROME_PATH")]
    chrome_path: Option<PathBuf>,

    /// PDF export timeout in seconds.
    #[arg(long, env = "MDPRESS_PDF_TIMEOUT", default_value_t = 60)]
    pdf_timeout: u64,

    /// Print a JSON summary (title, stats, output paths) instead of text.
    #[arg(long)]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MDPRESS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MDPRESS_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum MarginPolicyArg {
    PageBox,
    Export,
}

impl From<MarginPolicyArg> for MarginPolicy {
    fn from(v: MarginPolicyArg) -> Self {
        match v {
            MarginPolicyArg::PageBox => MarginPolicy::PageBox,
            MarginPolicyArg::Export => MarginPolicy::ExportMargins,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let stem = cli
        .input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "digest".to_string());

    let mut builder = ConvertConfig::builder()
        .fallback_title(cli.title.clone().unwrap_or_else(|| stem.clone()))
        .margin_policy(cli.margin_policy.into())
        .pdf_timeout_secs(cli.pdf_timeout);

    if let Some(ref path) = cli.stylesheet {
        let css = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read stylesheet {}", path.display()))?;
        builder = builder.stylesheet(css);
    }
    if let Some(ref path) = cli.chrome_path {
        builder = builder.chrome_path(path);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Convert ──────────────────────────────────────────────────────────
    let bytes = std::fs::read(&cli.input).map_err(|source| MdPressError::InputReadFailed {
        path: cli.input.clone(),
        source,
    })?;
    let html = convert_bytes_to_html(&bytes, &config);

    let html_to_stdout = cli.output.as_deref() == Some(Path::new("-"));
    let html_path = if html_to_stdout {
        None
    } else {
        Some(
            cli.output
                .clone()
                .unwrap_or_else(|| sibling(&cli.input, &stem, "_press.html")),
        )
    };

    if let Some(ref path) = html_path {
        write_output(path, html.html.as_bytes())?;
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(html.html.as_bytes())
            .context("Failed to write to stdout")?;
    }

    // ── PDF stage ────────────────────────────────────────────────────────
    let want_pdf = cli.pdf || cli.pdf_output.is_some();
    let pdf_path = want_pdf.then(|| {
        cli.pdf_output
            .clone()
            .unwrap_or_else(|| sibling(&cli.input, &stem, "_press.pdf"))
    });

    if let Some(ref path) = pdf_path {
        let spinner = (!cli.quiet && !cli.json).then(|| {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            bar.set_prefix("Rendering");
            bar.set_message("exporting A4 PDF…");
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        });

        let result = html_to_pdf(&html.html, &config).await;
        if let Some(bar) = spinner {
            bar.finish_and_clear();
        }

        match result {
            Ok(pdf) => write_output(path, &pdf)?,
            Err(e) => {
                // HTML is already on disk; say so before failing.
                if !cli.quiet {
                    if let Some(ref hp) = html_path {
                        eprintln!(
                            "{} HTML written to {} (PDF stage failed)",
                            red("✗"),
                            bold(&hp.display().to_string())
                        );
                    }
                }
                return Err(e).context("PDF export failed");
            }
        }
    }

    // ── Summary ──────────────────────────────────────────────────────────
    if cli.json {
        let summary = serde_json::json!({
            "title": html.title,
            "stats": html.stats,
            "html_output": html_path.as_ref().map(|p| p.display().to_string()),
            "pdf_output": pdf_path.as_ref().map(|p| p.display().to_string()),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
    } else if !cli.quiet {
        if let Some(ref path) = html_path {
            eprintln!(
                "{} {}  {}",
                green("✔"),
                bold(&path.display().to_string()),
                dim(&format!(
                    "{} sections, {} topics, {} tables, {}ms",
                    html.stats.sections_wrapped,
                    html.stats.topics_tagged,
                    html.stats.tables_reshaped,
                    html.stats.duration_ms
                )),
            );
        }
        if let Some(ref path) = pdf_path {
            eprintln!("{} {}", green("✔"), bold(&path.display().to_string()));
        }
    }

    Ok(())
}

/// Output path next to the input: `<stem><suffix>` in the input's directory.
fn sibling(input: &Path, stem: &str, suffix: &str) -> PathBuf {
    input.with_file_name(format!("{stem}{suffix}"))
}
