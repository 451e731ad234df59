//! Configuration types for digest conversion.
//!
//! All conversion behaviour is controlled through [`ConvertConfig`], built via
//! its [`ConvertConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across requests and to diff two runs to understand
//! why their outputs differ.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::MdPressError;

/// Configuration for a Markdown-digest conversion.
///
/// Built via [`ConvertConfig::builder()`] or [`ConvertConfig::default()`].
///
/// # Example
/// ```rust
/// use mdpress::{ConvertConfig, MarginPolicy};
///
/// let config = ConvertConfig::builder()
///     .fallback_title("daily-ca-2026-08-25")
///     .margin_policy(MarginPolicy::PageBox)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Title used when the document has no level-1 heading. Typically the
    /// uploaded file's base name. Uppercased on output either way.
    pub fallback_title: String,

    /// Replacement stylesheet text. `None` uses the embedded digest
    /// stylesheet. The stylesheet is an injected resource: swapping it never
    /// touches transformation logic.
    pub stylesheet: Option<String>,

    /// How the 14 mm / 12 mm page margins are applied during PDF export.
    pub margin_policy: MarginPolicy,

    /// Timeout for the browser navigation/export step in seconds. Default: 60.
    ///
    /// The DOM transformation is CPU-bound and bounded by input size; only
    /// the browser stage can hang, so only the browser stage is timed.
    pub pdf_timeout_secs: u64,

    /// Path to a Chrome/Chromium executable. `None` lets the launcher
    /// auto-detect an installed browser.
    pub chrome_path: Option<PathBuf>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            fallback_title: "digest".to_string(),
            stylesheet: None,
            margin_policy: MarginPolicy::default(),
            pdf_timeout_secs: 60,
            chrome_path: None,
        }
    }
}

impl ConvertConfig {
    /// Create a new builder for `ConvertConfig`.
    pub fn builder() -> ConvertConfigBuilder {
        ConvertConfigBuilder {
            config: Self::default(),
        }
    }

    /// The stylesheet text in effect: caller-supplied or the embedded default.
    pub fn stylesheet_text(&self) -> &str {
        self.stylesheet
            .as_deref()
            .unwrap_or(crate::pipeline::assemble::DIGEST_CSS)
    }
}

/// Builder for [`ConvertConfig`].
#[derive(Debug)]
pub struct ConvertConfigBuilder {
    config: ConvertConfig,
}

impl ConvertConfigBuilder {
    pub fn fallback_title(mut self, title: impl Into<String>) -> Self {
        self.config.fallback_title = title.into();
        self
    }

    pub fn stylesheet(mut self, css: impl Into<String>) -> Self {
        self.config.stylesheet = Some(css.into());
        self
    }

    pub fn margin_policy(mut self, policy: MarginPolicy) -> Self {
        self.config.margin_policy = policy;
        self
    }

    pub fn pdf_timeout_secs(mut self, secs: u64) -> Self {
        self.config.pdf_timeout_secs = secs.max(1);
        self
    }

    pub fn chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.chrome_path = Some(path.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConvertConfig, MdPressError> {
        let c = &self.config;
        if c.pdf_timeout_secs == 0 {
            return Err(MdPressError::InvalidConfig(
                "PDF timeout must be ≥ 1 second".into(),
            ));
        }
        if let Some(css) = &c.stylesheet {
            if css.trim().is_empty() {
                return Err(MdPressError::InvalidConfig(
                    "Replacement stylesheet is empty; omit it to use the built-in one".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Where the A4 page margins (14 mm top/bottom, 12 mm left/right) come from.
///
/// Two strategies exist and they must never be combined, or the margins
/// double up. The page-box strategy keeps the margin inside the document
/// (the `.page` wrapper is padded and the export call uses zero margins), so
/// the HTML file prints identically from a browser and through the export
/// path. The export strategy leaves the document margin-free and passes the
/// margins to the browser's PDF call instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MarginPolicy {
    /// Margins baked into the document's page box; export margins are zero.
    /// (default)
    #[default]
    PageBox,
    /// Document has no page padding; margins applied by the export call.
    ExportMargins,
}

// 14 mm and 12 mm expressed in inches for the CDP print call.
const MARGIN_TB_IN: f64 = 14.0 / 25.4;
const MARGIN_LR_IN: f64 = 12.0 / 25.4;

impl MarginPolicy {
    /// CSS prepended to the stylesheet: page size plus the margin source.
    pub(crate) fn css_prelude(self) -> &'static str {
        match self {
            MarginPolicy::PageBox => {
                "@page { size: A4; margin: 0; }\n.page { padding: 14mm 12mm; }\n"
            }
            MarginPolicy::ExportMargins => {
                // Screen preview still gets padding; print margins come from
                // the export call.
                "@page { size: A4; margin: 0; }\n.page { padding: 0; }\n\
                 @media screen { .page { padding: 14mm 12mm; } }\n"
            }
        }
    }

    /// Export-call margins in inches: (top, bottom, left, right).
    pub(crate) fn export_margins_in(self) -> (f64, f64, f64, f64) {
        match self {
            MarginPolicy::PageBox => (0.0, 0.0, 0.0, 0.0),
            MarginPolicy::ExportMargins => {
                (MARGIN_TB_IN, MARGIN_TB_IN, MARGIN_LR_IN, MARGIN_LR_IN)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ConvertConfig::builder().build().unwrap();
        assert_eq!(config.fallback_title, "digest");
        assert_eq!(config.margin_policy, MarginPolicy::PageBox);
        assert_eq!(config.pdf_timeout_secs, 60);
    }

    #[test]
    fn empty_stylesheet_rejected() {
        let err = ConvertConfig::builder().stylesheet("  \n").build();
        assert!(matches!(err, Err(MdPressError::InvalidConfig(_))));
    }

    #[test]
    fn margin_policies_never_double_up() {
        let (t, b, l, r) = MarginPolicy::PageBox.export_margins_in();
        assert_eq!((t, b, l, r), (0.0, 0.0, 0.0, 0.0));
        assert!(MarginPolicy::PageBox.css_prelude().contains("14mm 12mm"));

        let (t, b, l, r) = MarginPolicy::ExportMargins.export_margins_in();
        assert!(t > 0.54 && t < 0.56 && b == t);
        assert!(l > 0.46 && l < 0.48 && r == l);
        assert!(MarginPolicy::ExportMargins
            .css_prelude()
            .contains(".page { padding: 0; }"));
    }

    #[test]
    fn timeout_clamped_to_minimum() {
        let config = ConvertConfig::builder()
            .pdf_timeout_secs(0)
            .build()
            .unwrap();
        assert_eq!(config.pdf_timeout_secs, 1);
    }
}
