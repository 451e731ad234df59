//! Document assembly: wrap the transformed fragment in a full HTML shell.

use crate::config::ConvertConfig;
use crate::dom::{escape_text, Dom, NodeId};

/// The embedded digest stylesheet: two-column prose, h1 banner, topic-title
/// chip, per-section colorbox palette, gridtable rules. Page size and margins
/// are NOT in here — they are prepended per [`MarginPolicy`].
pub const DIGEST_CSS: &str = include_str!("../../assets/digest.css");

/// Resolve the document title: text of the first level-1 heading if present,
/// otherwise the fallback. Uppercased either way.
pub fn resolve_title(dom: &Dom, body: NodeId, fallback: &str) -> String {
    match dom.find_first(body, "h1") {
        Some(h1) => dom.text_content(h1).to_uppercase(),
        None => fallback.to_uppercase(),
    }
}

/// Produce the complete styled HTML document for a finished fragment.
pub fn assemble_document(dom: &Dom, body: NodeId, config: &ConvertConfig) -> (String, String) {
    let title = resolve_title(dom, body, &config.fallback_title);
    let fragment = dom.serialize_children(body);
    let css_prelude = config.margin_policy.css_prelude();
    let css = config.stylesheet_text();

    let html = format!(
        "<!doctype html>\n\
<html>\n\
<head>\n\
  <meta charset=\"utf-8\"/>\n\
  <meta name=\"viewport\" content=\"width=device-width,initial-scale=1\"/>\n\
  <title>{title}</title>\n\
  <style>\n{css_prelude}{css}</style>\n\
</head>\n\
<body>\n\
  <div class=\"page\">\n\
    <article class=\"book\">\n\
      <div class=\"prose\">\n\
        {fragment}\n\
      </div>\n\
    </article>\n\
  </div>\n\
</body>\n\
</html>\n",
        title = escape_text(&title),
    );

    (title, html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MarginPolicy;

    fn config() -> ConvertConfig {
        ConvertConfig::default()
    }

    #[test]
    fn title_from_first_h1_uppercased() {
        let (dom, body) = Dom::parse_fragment("<h1>Daily CA — 25 Aug</h1><p>x</p>");
        assert_eq!(resolve_title(&dom, body, "fallback"), "DAILY CA — 25 AUG");
    }

    #[test]
    fn title_falls_back_when_no_h1() {
        let (dom, body) = Dom::parse_fragment("<h2>Only a topic</h2>");
        assert_eq!(resolve_title(&dom, body, "daily-ca"), "DAILY-CA");
    }

    #[test]
    fn shell_contains_style_block_and_wrappers() {
        let (dom, body) = Dom::parse_fragment("<h1>T</h1>");
        let (title, html) = assemble_document(&dom, body, &config());
        assert_eq!(title, "T");
        assert_eq!(html.matches("<style>").count(), 1);
        assert!(html.contains("<div class=\"page\">"));
        assert!(html.contains("<article class=\"book\">"));
        assert!(html.contains("<div class=\"prose\">"));
        assert!(html.contains("<h1>T</h1>"));
        assert!(html.contains(".colorbox"), "stylesheet embedded");
    }

    #[test]
    fn title_is_escaped_in_head() {
        let (dom, body) = Dom::parse_fragment("<h1>A &amp; B <em>c</em></h1>");
        let (title, html) = assemble_document(&dom, body, &config());
        assert_eq!(title, "A & B C");
        assert!(html.contains("<title>A &amp; B C</title>"));
    }

    #[test]
    fn custom_stylesheet_substituted() {
        let cfg = ConvertConfig::builder()
            .stylesheet("body { color: red; }")
            .build()
            .unwrap();
        let (dom, body) = Dom::parse_fragment("<p>x</p>");
        let (_, html) = assemble_document(&dom, body, &cfg);
        assert!(html.contains("body { color: red; }"));
        assert!(!html.contains(".colorbox"));
        // Margin prelude still injected.
        assert!(html.contains("@page { size: A4; margin: 0; }"));
    }

    #[test]
    fn export_margin_policy_removes_page_padding() {
        let cfg = ConvertConfig::builder()
            .margin_policy(MarginPolicy::ExportMargins)
            .build()
            .unwrap();
        let (dom, body) = Dom::parse_fragment("<p>x</p>");
        let (_, html) = assemble_document(&dom, body, &cfg);
        assert!(html.contains(".page { padding: 0; }"));
    }
}
