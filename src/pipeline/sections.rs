//! Section classification and colorbox wrapping.
//!
//! Digest documents carry a fixed rhythm of numbered sections per topic:
//!
//! ```text
//! ## Indo-Pacific Strategy        ← topic title (h2, no leading "N. ")
//! ### 1. Syllabus Mapping         ← section heading → colorbox.syllabus
//! ...content...
//! ### 2. Context                  ← section heading → colorbox.context
//! ...content...
//! ### 3. Static Core              ← number 3: intentionally NOT wrapped
//! ```
//!
//! The Markdown parser produces a flat run of siblings; this module
//! reconstructs the section structure from heading text alone and re-parents
//! each section heading plus its following content into a `div.colorbox`
//! with a per-section modifier class.
//!
//! Classification is pure string work, kept separate from tree mutation so
//! the rules are testable without building a DOM.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::dom::{Dom, NodeId};

/// `"1. Syllabus Mapping"` → captures the section number.
static SECTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*([1-6])\.\s+").unwrap());

// ── Pure classification ──────────────────────────────────────────────────────

/// Section number 1–6 if the heading text starts with `N. `.
pub fn section_number(text: &str) -> Option<u8> {
    SECTION_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Colorbox modifier class for a section number. Section 3 ("static core")
/// and out-of-range numbers map to nothing and are left unwrapped.
pub fn class_for_section(n: u8) -> Option<&'static str> {
    match n {
        1 => Some("syllabus"),
        2 => Some("context"),
        4 => Some("beyond"),
        5 => Some("prelims"),
        6 => Some("mains"),
        _ => None,
    }
}

/// A topic title is a non-empty level-2 heading that is not a section heading.
pub fn is_topic_title(level: u8, text: &str) -> bool {
    level == 2 && !text.is_empty() && section_number(text).is_none()
}

// ── Tree passes ──────────────────────────────────────────────────────────────

/// Tag every qualifying `h2` with the `topic-title` class.
/// Returns the number of headings tagged.
pub fn tag_topic_titles(dom: &mut Dom, root: NodeId) -> usize {
    let mut tagged = 0;
    for h2 in dom.find_all(root, "h2") {
        if is_topic_title(2, &dom.text_content(h2)) {
            dom.add_class(h2, "topic-title");
            tagged += 1;
        }
    }
    tagged
}

/// Wrap each mapped section heading and its following sibling run into a
/// `div.colorbox.<class>`. Returns the number of boxes created.
///
/// Headings already inside a colorbox are skipped, so the pass is idempotent
/// and boxes never nest.
pub fn wrap_sections(dom: &mut Dom, root: NodeId) -> usize {
    let headings: Vec<NodeId> = dom
        .descendants(root)
        .into_iter()
        .filter(|&id| dom.heading_level(id).is_some())
        .collect();

    let mut wrapped = 0;
    for heading in headings {
        if dom.has_ancestor_with_class(heading, "colorbox") {
            continue;
        }
        let text = dom.text_content(heading);
        let Some(number) = section_number(&text) else {
            continue;
        };
        let Some(class) = class_for_section(number) else {
            debug!("Leaving section {} unwrapped: {:?}", number, text);
            continue;
        };

        let container = dom.create_div_with_class(&format!("colorbox {class}"));
        dom.insert_before(heading, container);

        // Move the heading and its run of following siblings into the box.
        // The heading goes in unconditionally; the boundary check applies
        // only to siblings after it.
        let mut cursor = Some(heading);
        let mut is_start = true;
        while let Some(node) = cursor {
            let next = dom.next_sibling(node);
            if !is_start && stops_section_run(dom, node) {
                break;
            }
            dom.append(container, node);
            is_start = false;
            cursor = next;
        }
        wrapped += 1;
    }
    wrapped
}

/// A sibling that terminates an open section run: a horizontal rule, or a
/// heading that is itself a topic title or section heading.
fn stops_section_run(dom: &Dom, node: NodeId) -> bool {
    if dom.tag_name(node) == Some("hr") {
        return true;
    }
    if let Some(level) = dom.heading_level(node) {
        let text = dom.text_content(node);
        return section_number(&text).is_some() || is_topic_title(level, &text);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::parse::markdown_to_fragment;

    fn parse_md(md: &str) -> (Dom, NodeId) {
        Dom::parse_fragment(&markdown_to_fragment(md))
    }

    // ── Classification ───────────────────────────────────────────────────

    #[test]
    fn section_numbers_parse_from_heading_text() {
        assert_eq!(section_number("1. Syllabus Mapping"), Some(1));
        assert_eq!(section_number("  6. Mains Pointers"), Some(6));
        assert_eq!(section_number("3. Something"), Some(3));
        assert_eq!(section_number("7. Out of range"), None);
        assert_eq!(section_number("1.No space"), None);
        assert_eq!(section_number("Indo-Pacific Strategy"), None);
        assert_eq!(section_number(""), None);
    }

    #[test]
    fn section_class_mapping_is_fixed() {
        assert_eq!(class_for_section(1), Some("syllabus"));
        assert_eq!(class_for_section(2), Some("context"));
        assert_eq!(class_for_section(3), None);
        assert_eq!(class_for_section(4), Some("beyond"));
        assert_eq!(class_for_section(5), Some("prelims"));
        assert_eq!(class_for_section(6), Some("mains"));
    }

    #[test]
    fn topic_title_classification() {
        assert!(is_topic_title(2, "Indo-Pacific Strategy"));
        assert!(!is_topic_title(2, "2. Context"));
        assert!(!is_topic_title(2, ""));
        assert!(!is_topic_title(3, "Indo-Pacific Strategy"));
    }

    // ── Wrapping ─────────────────────────────────────────────────────────

    #[test]
    fn section_heading_and_content_wrapped() {
        let (mut dom, body) = parse_md("### 1. Syllabus Mapping\n\nGS-II; IR.\n");
        let n = wrap_sections(&mut dom, body);
        assert_eq!(n, 1);

        let boxed = dom
            .children(body)
            .find(|&c| dom.has_class(c, "colorbox"))
            .expect("colorbox");
        assert!(dom.has_class(boxed, "syllabus"));
        let inner: Vec<_> = dom
            .children(boxed)
            .filter_map(|c| dom.tag_name(c).map(str::to_string))
            .collect();
        assert_eq!(inner, vec!["h3", "p"]);
    }

    #[test]
    fn section_three_left_unwrapped_in_place() {
        let (mut dom, body) = parse_md("### 2. Context\n\nP1\n\n### 3. Static\n\nP2\n");
        wrap_sections(&mut dom, body);

        // Section 2 box exists and stopped before the "3." heading.
        let boxes: Vec<_> = dom
            .children(body)
            .filter(|&c| dom.has_class(c, "colorbox"))
            .collect();
        assert_eq!(boxes.len(), 1);
        assert!(dom.has_class(boxes[0], "context"));

        // Heading 3 and its paragraph remain direct children of the body,
        // after the box.
        let top: Vec<_> = dom
            .children(body)
            .filter_map(|c| dom.tag_name(c).map(str::to_string))
            .collect();
        assert_eq!(top, vec!["div", "h3", "p"]);
    }

    #[test]
    fn run_stops_at_horizontal_rule() {
        let (mut dom, body) = parse_md("### 4. Beyond\n\ncontent\n\n---\n\ntrailing\n");
        wrap_sections(&mut dom, body);
        let boxed = dom
            .children(body)
            .find(|&c| dom.has_class(c, "colorbox"))
            .unwrap();
        let html = dom.serialize_children(boxed);
        assert!(html.contains("content"));
        assert!(!html.contains("trailing"));
        // The rule itself stays outside the box.
        assert!(!html.contains("<hr"));
    }

    #[test]
    fn run_stops_at_topic_title() {
        let (mut dom, body) = parse_md("### 2. Context\n\nP1\n\n## Topic Two\n\nP2\n");
        tag_topic_titles(&mut dom, body);
        wrap_sections(&mut dom, body);

        let boxed = dom
            .children(body)
            .find(|&c| dom.has_class(c, "colorbox"))
            .unwrap();
        let html = dom.serialize_children(boxed);
        assert!(html.contains("P1"));
        assert!(!html.contains("Topic Two"));
    }

    #[test]
    fn plain_subheading_absorbed_into_run() {
        // An h4 with no section number and no topic-title status is content.
        let (mut dom, body) = parse_md("### 5. Prelims\n\n#### Key Facts\n\n- A\n");
        wrap_sections(&mut dom, body);
        let boxed = dom
            .children(body)
            .find(|&c| dom.has_class(c, "colorbox"))
            .unwrap();
        let html = dom.serialize_children(boxed);
        assert!(html.contains("Key Facts"));
        assert!(html.contains("<ul>"));
    }

    #[test]
    fn wrapping_is_idempotent() {
        let (mut dom, body) = parse_md("### 1. Syllabus\n\nX\n\n### 2. Context\n\nY\n");
        assert_eq!(wrap_sections(&mut dom, body), 2);
        let once = dom.serialize_children(body);
        assert_eq!(wrap_sections(&mut dom, body), 0, "second pass wraps nothing");
        assert_eq!(dom.serialize_children(body), once);
    }

    #[test]
    fn topic_titles_tagged_and_never_wrapped() {
        let (mut dom, body) = parse_md("## Indo-Pacific Strategy\n\n### 1. Syllabus\n\nX\n");
        let tagged = tag_topic_titles(&mut dom, body);
        assert_eq!(tagged, 1);
        wrap_sections(&mut dom, body);

        let h2 = dom.find_first(body, "h2").unwrap();
        assert!(dom.has_class(h2, "topic-title"));
        assert!(
            !dom.has_ancestor_with_class(h2, "colorbox"),
            "topic title must stay outside section boxes"
        );
    }

    #[test]
    fn numbered_h2_is_section_not_topic() {
        let (mut dom, body) = parse_md("## 2. Context\n\nbody\n");
        assert_eq!(tag_topic_titles(&mut dom, body), 0);
        assert_eq!(wrap_sections(&mut dom, body), 1);
        let h2 = dom.find_first(body, "h2").unwrap();
        assert!(!dom.has_class(h2, "topic-title"));
        assert!(dom.has_ancestor_with_class(h2, "colorbox"));
    }

    #[test]
    fn tagging_and_wrapping_commute() {
        let md = "## Topic\n\n### 2. Context\n\nP\n";
        let (mut a, body_a) = parse_md(md);
        tag_topic_titles(&mut a, body_a);
        wrap_sections(&mut a, body_a);

        let (mut b, body_b) = parse_md(md);
        wrap_sections(&mut b, body_b);
        tag_topic_titles(&mut b, body_b);

        assert_eq!(a.serialize_children(body_a), b.serialize_children(body_b));
    }
}
