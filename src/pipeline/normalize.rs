//! Markdown normalization: deterministic cleanup applied before parsing.
//!
//! Digest exports frequently arrive with artefacts from the editing chain:
//! empty heading lines left behind by templates, punctuation that was
//! backslash-escaped by an exporter, and tables butting directly against the
//! next heading so the table parser swallows the heading as a row.
//!
//! Three cheap string rules fix those up front. Each rule is a pure
//! `&str → String` function with no shared state, applied in a fixed order:
//! empty headings must go before unescaping (an escaped `\#` line is content,
//! not a heading), and the table/heading separator runs on the final line set.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all normalization rules to raw Markdown text.
pub fn normalize_markdown(input: &str) -> String {
    let s = strip_empty_headings(input);
    let s = unescape_punctuation(&s);
    separate_tables_from_headings(&s)
}

// ── Rule 1: Remove empty heading lines ───────────────────────────────────────

static RE_EMPTY_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]*$\n?").unwrap());

/// A line of nothing but 1–6 `#` characters renders as an empty heading;
/// remove the whole line including its newline.
fn strip_empty_headings(input: &str) -> String {
    RE_EMPTY_HEADING.replace_all(input, "").to_string()
}

// ── Rule 2: Unescape Markdown punctuation ────────────────────────────────────

static RE_ESCAPED_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\([\\`*_\{\}\[\]\(\)#\+\-\.!\|>~])").unwrap());

/// Replace `\*`, `\_`, `\#` etc. with the bare character.
fn unescape_punctuation(input: &str) -> String {
    RE_ESCAPED_PUNCT.replace_all(input, "$1").to_string()
}

// ── Rule 3: Blank line between a table row and a following heading ───────────

static RE_TABLE_ROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\|.*\|\s*$").unwrap());
static RE_HEADING_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*#{1,6}\s+\S").unwrap());

/// A heading on the line directly after a pipe-table row would be consumed
/// by the table parser. Insert a single blank line at each such boundary;
/// line content is never altered.
fn separate_tables_from_headings(input: &str) -> String {
    let lines: Vec<&str> = input.lines().collect();
    let mut out: Vec<&str> = Vec::with_capacity(lines.len() + 8);

    for (i, line) in lines.iter().enumerate() {
        out.push(line);
        if RE_TABLE_ROW.is_match(line) {
            if let Some(next) = lines.get(i + 1) {
                if !next.trim().is_empty() && RE_HEADING_LINE.is_match(next) {
                    out.push("");
                }
            }
        }
    }

    let mut result = out.join("\n");
    if input.ends_with('\n') {
        result.push('\n');
    }
    result
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_heading_line_removed() {
        assert_eq!(strip_empty_headings("### \ntext\n"), "text\n");
        assert_eq!(strip_empty_headings("######\n"), "");
        assert_eq!(strip_empty_headings("#\n# Real\n"), "# Real\n");
    }

    #[test]
    fn heading_with_text_kept() {
        assert_eq!(strip_empty_headings("## Topic\n"), "## Topic\n");
    }

    #[test]
    fn escaped_punctuation_unescaped() {
        assert_eq!(unescape_punctuation(r"\*bold\*"), "*bold*");
        assert_eq!(unescape_punctuation(r"a \| b"), "a | b");
        assert_eq!(unescape_punctuation(r"\\"), r"\");
        assert_eq!(unescape_punctuation(r"1\. Syllabus"), "1. Syllabus");
    }

    #[test]
    fn non_punctuation_escape_untouched() {
        assert_eq!(unescape_punctuation(r"\n stays"), r"\n stays");
    }

    #[test]
    fn blank_line_inserted_between_table_and_heading() {
        let input = "| A | B |\n| 1 | 2 |\n## Next\n";
        let result = separate_tables_from_headings(input);
        assert_eq!(result, "| A | B |\n| 1 | 2 |\n\n## Next\n");
    }

    #[test]
    fn separator_inserted_once_per_boundary() {
        let input = "| A | B |\n# H";
        let once = separate_tables_from_headings(input);
        assert_eq!(once, "| A | B |\n\n# H");
        // A second pass finds no offending boundary.
        assert_eq!(separate_tables_from_headings(&once), once);
    }

    #[test]
    fn table_followed_by_blank_line_untouched() {
        let input = "| A | B |\n\n## Next\n";
        assert_eq!(separate_tables_from_headings(input), input);
    }

    #[test]
    fn table_followed_by_prose_untouched() {
        let input = "| A | B |\nplain text\n";
        assert_eq!(separate_tables_from_headings(input), input);
    }

    #[test]
    fn full_pipeline_ordering() {
        // The escaped heading marker must survive rule 1 and be unescaped by
        // rule 2 rather than deleted as an empty heading.
        let input = "\\#\n### \n| a | b |\n## T\n";
        let result = normalize_markdown(input);
        assert_eq!(result, "#\n| a | b |\n\n## T\n");
    }
}
