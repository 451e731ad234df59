//! Markdown → HTML fragment via pulldown-cmark.
//!
//! Only the table extension is enabled; digests use plain CommonMark plus
//! GFM tables, and enabling more extensions would let stray punctuation
//! (restored by the normalizer) change meaning.

use once_cell::sync::Lazy;
use pulldown_cmark::{html, Options, Parser};
use regex::Regex;

static RE_RESIDUAL_EMPTY_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<p>\s*#{1,6}\s*</p>\s*").unwrap());

/// Render normalized Markdown to a flat HTML fragment.
///
/// A hash-only line that reached the parser as literal text comes out as a
/// paragraph of `#` characters; sweep those out of the fragment.
pub fn markdown_to_fragment(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES);
    let mut fragment = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut fragment, parser);
    RE_RESIDUAL_EMPTY_HEADING.replace_all(&fragment, "").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_tables() {
        let md = "| Category | Fact / Detail |\n| --- | --- |\n| A | B |\n";
        let html = markdown_to_fragment(md);
        assert!(html.contains("<table>"));
        assert!(html.contains("<thead>"));
        assert!(html.contains("<td>A</td>"));
    }

    #[test]
    fn renders_headings_and_rules() {
        let html = markdown_to_fragment("# Title\n\n---\n\n## Topic\n");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<hr"));
        assert!(html.contains("<h2>Topic</h2>"));
    }

    #[test]
    fn residual_empty_heading_paragraph_swept() {
        let html = markdown_to_fragment("before\n\n\\######\n\nafter\n");
        assert!(!html.contains("######"), "got: {html}");
        assert!(html.contains("<p>before</p>"));
        assert!(html.contains("<p>after</p>"));
    }
}
