//! Arena-based DOM tree for in-place structural rewriting.
//!
//! The transformation stages (table reshaping, section wrapping) work by
//! reparenting live nodes: a run of siblings is moved into a freshly created
//! container. The arena makes that cheap and safe — nodes live in one `Vec`,
//! links are ids, and every attach operation detaches the node from its
//! current parent first, so a node has exactly one parent at any time.
//!
//! html5ever builds this tree through the [`sink`] module. Parsing is lenient:
//! malformed markup still produces *some* tree, never an error.

pub mod sink;

use std::fmt::Write as _;

use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, ns, LocalName, ParseOpts, QualName};

use sink::DomSink;

/// Index of a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Payload of a node.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Synthetic root produced by the parser.
    Document,
    /// Element with a qualified name and ordered attributes.
    Element { name: QualName, attrs: Vec<Attr> },
    /// Text content (unescaped).
    Text(String),
    /// Comment; carried through but skipped on serialization.
    Comment(String),
}

/// An element attribute.
#[derive(Debug, Clone)]
pub struct Attr {
    pub name: QualName,
    pub value: String,
}

#[derive(Debug)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        }
    }
}

/// The arena DOM. All mutation goes through methods that preserve the
/// single-parent invariant.
pub struct Dom {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    /// Create an empty tree with a document root.
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        dom.root = dom.alloc(Node::new(NodeData::Document));
        dom
    }

    /// Parse an HTML fragment into a tree and return it together with the
    /// id of the `<body>` element holding the fragment content.
    ///
    /// The fragment is wrapped in a minimal document shell first; html5ever's
    /// document parser then applies full browser-grade error recovery.
    pub fn parse_fragment(fragment: &str) -> (Dom, NodeId) {
        let wrapped = format!("<html><head></head><body>{fragment}</body></html>");
        let sink = DomSink::new();
        let dom = parse_document(sink, ParseOpts::default())
            .from_utf8()
            .one(wrapped.as_bytes())
            .into_dom();
        let body = dom
            .descendants(dom.root())
            .into_iter()
            .find(|&id| dom.tag_name(id) == Some("body"))
            .unwrap_or(dom.root);
        (dom, body)
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// The document root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.node(id).data
    }

    pub fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.node_mut(id).data
    }

    // ── Construction ─────────────────────────────────────────────────────

    /// Create a detached element in the HTML namespace.
    pub fn create_element(&mut self, tag: &str, attrs: Vec<Attr>) -> NodeId {
        let name = QualName::new(None, ns!(html), LocalName::from(tag));
        self.create_element_qual(name, attrs)
    }

    /// Create a detached element with an explicit qualified name.
    /// Used by the html5ever sink.
    pub fn create_element_qual(&mut self, name: QualName, attrs: Vec<Attr>) -> NodeId {
        self.alloc(Node::new(NodeData::Element { name, attrs }))
    }

    /// Create a detached `<div>` carrying the given `class` attribute.
    pub fn create_div_with_class(&mut self, class: &str) -> NodeId {
        let attr = Attr {
            name: QualName::new(None, ns!(), LocalName::from("class")),
            value: class.to_string(),
        };
        self.create_element("div", vec![attr])
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(Node::new(NodeData::Text(text.to_string())))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.alloc(Node::new(NodeData::Comment(text.to_string())))
    }

    // ── Links ────────────────────────────────────────────────────────────

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).first_child
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next_sibling
    }

    /// Iterate the children of a node, front to back.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            dom: self,
            next: self.node(id).first_child,
        }
    }

    /// Walk the ancestor chain, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            dom: self,
            next: self.node(id).parent,
        }
    }

    /// All nodes under `id` in document (pre-)order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).collect();
        stack.reverse();
        while let Some(n) = stack.pop() {
            out.push(n);
            let mut kids: Vec<NodeId> = self.children(n).collect();
            kids.reverse();
            stack.append(&mut kids);
        }
        out
    }

    /// All descendant elements with the given tag, in document order.
    pub fn find_all(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&id| self.tag_name(id) == Some(tag))
            .collect()
    }

    /// First descendant element with the given tag, in document order.
    pub fn find_first(&self, root: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|&id| self.tag_name(id) == Some(tag))
    }

    // ── Mutation (detach-then-attach) ────────────────────────────────────

    /// Unlink a node from its parent and siblings. Safe on detached nodes.
    pub fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let n = self.node(id);
            (n.parent, n.prev_sibling, n.next_sibling)
        };

        match prev {
            Some(p) => self.node_mut(p).next_sibling = next,
            None => {
                if let Some(par) = parent {
                    self.node_mut(par).first_child = next;
                }
            }
        }
        match next {
            Some(nx) => self.node_mut(nx).prev_sibling = prev,
            None => {
                if let Some(par) = parent {
                    self.node_mut(par).last_child = prev;
                }
            }
        }

        let n = self.node_mut(id);
        n.parent = None;
        n.prev_sibling = None;
        n.next_sibling = None;
    }

    /// Move `child` to the end of `parent`'s children.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        debug_assert_ne!(parent, child);
        self.detach(child);

        let last = self.node(parent).last_child;
        {
            let c = self.node_mut(child);
            c.parent = Some(parent);
            c.prev_sibling = last;
        }
        if let Some(l) = last {
            self.node_mut(l).next_sibling = Some(child);
        }
        let p = self.node_mut(parent);
        if p.first_child.is_none() {
            p.first_child = Some(child);
        }
        p.last_child = Some(child);
    }

    /// Append text, merging into a trailing text node when one exists.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        if let Some(last) = self.node(parent).last_child {
            if let NodeData::Text(existing) = &mut self.node_mut(last).data {
                existing.push_str(text);
                return;
            }
        }
        let t = self.create_text(text);
        self.append(parent, t);
    }

    /// Move `new` into position immediately before `sibling`.
    pub fn insert_before(&mut self, sibling: NodeId, new: NodeId) {
        debug_assert_ne!(sibling, new);
        self.detach(new);

        let (parent, prev) = {
            let s = self.node(sibling);
            (s.parent, s.prev_sibling)
        };
        {
            let n = self.node_mut(new);
            n.parent = parent;
            n.prev_sibling = prev;
            n.next_sibling = Some(sibling);
        }
        self.node_mut(sibling).prev_sibling = Some(new);
        match prev {
            Some(p) => self.node_mut(p).next_sibling = Some(new),
            None => {
                if let Some(par) = parent {
                    self.node_mut(par).first_child = Some(new);
                }
            }
        }
    }

    /// Move every child of `from` to the end of `to`, preserving order.
    pub fn reparent_children(&mut self, from: NodeId, to: NodeId) {
        let kids: Vec<NodeId> = self.children(from).collect();
        for k in kids {
            self.append(to, k);
        }
    }

    /// Drop leading and trailing whitespace-only text children of a node.
    pub fn trim_edge_whitespace(&mut self, id: NodeId) {
        while let Some(first) = self.node(id).first_child {
            if self.is_blank_text(first) {
                self.detach(first);
            } else {
                break;
            }
        }
        while let Some(last) = self.node(id).last_child {
            if self.is_blank_text(last) {
                self.detach(last);
            } else {
                break;
            }
        }
    }

    fn is_blank_text(&self, id: NodeId) -> bool {
        matches!(&self.node(id).data, NodeData::Text(t) if t.trim().is_empty())
    }

    // ── Element queries ──────────────────────────────────────────────────

    /// Local tag name, if the node is an element.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Element { name, .. } => Some(name.local.as_ref()),
            _ => None,
        }
    }

    /// Heading level 1–6 for `h1`–`h6` elements.
    pub fn heading_level(&self, id: NodeId) -> Option<u8> {
        match self.tag_name(id)? {
            "h1" => Some(1),
            "h2" => Some(2),
            "h3" => Some(3),
            "h4" => Some(4),
            "h5" => Some(5),
            "h6" => Some(6),
            _ => None,
        }
    }

    fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name.local.as_ref() == name)
                .map(|a| a.value.as_str()),
            _ => None,
        }
    }

    /// Whether an element's `class` attribute contains the given class.
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .is_some_and(|v| v.split_whitespace().any(|c| c == class))
    }

    /// Add a class to an element, preserving existing classes.
    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if self.has_class(id, class) {
            return;
        }
        if let NodeData::Element { attrs, .. } = &mut self.node_mut(id).data {
            match attrs.iter_mut().find(|a| a.name.local.as_ref() == "class") {
                Some(a) => {
                    if !a.value.is_empty() {
                        a.value.push(' ');
                    }
                    a.value.push_str(class);
                }
                None => attrs.push(Attr {
                    name: QualName::new(None, ns!(), LocalName::from("class")),
                    value: class.to_string(),
                }),
            }
        }
    }

    /// Whether any ancestor of the node carries the given class.
    pub fn has_ancestor_with_class(&self, id: NodeId, class: &str) -> bool {
        self.ancestors(id).any(|a| self.has_class(a, class))
    }

    /// Concatenated text of the subtree, whitespace-collapsed and trimmed.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut raw = String::new();
        self.collect_text(id, &mut raw);
        let mut out = String::with_capacity(raw.len());
        let mut last_space = true;
        for ch in raw.chars() {
            if ch.is_whitespace() {
                if !last_space {
                    out.push(' ');
                    last_space = true;
                }
            } else {
                out.push(ch);
                last_space = false;
            }
        }
        out.trim_end().to_string()
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        if let NodeData::Text(t) = &self.node(id).data {
            out.push_str(t);
        }
        let mut next = self.node(id).first_child;
        while let Some(c) = next {
            self.collect_text(c, out);
            next = self.node(c).next_sibling;
        }
    }

    // ── Serialization ────────────────────────────────────────────────────

    /// Serialize the children of a node to an HTML fragment string.
    pub fn serialize_children(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(id) {
            self.write_node(child, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match &self.node(id).data {
            NodeData::Document => {
                for child in self.children(id) {
                    self.write_node(child, out);
                }
            }
            NodeData::Text(t) => out.push_str(&escape_text(t)),
            NodeData::Comment(_) => {}
            NodeData::Element { name, attrs } => {
                let tag = name.local.as_ref();
                out.push('<');
                out.push_str(tag);
                for a in attrs {
                    let _ = write!(
                        out,
                        " {}=\"{}\"",
                        a.name.local.as_ref(),
                        escape_attr(&a.value)
                    );
                }
                out.push('>');
                if is_void_element(tag) {
                    return;
                }
                for child in self.children(id) {
                    self.write_node(child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }
}

/// Iterator over a node's children.
pub struct Children<'a> {
    dom: &'a Dom,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.dom.node(id).next_sibling;
        Some(id)
    }
}

/// Iterator over a node's ancestors, nearest first.
pub struct Ancestors<'a> {
    dom: &'a Dom,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.dom.node(id).parent;
        Some(id)
    }
}

/// Escape text node content for HTML output.
pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape an attribute value for double-quoted HTML output.
pub fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_fragment_finds_body_content() {
        let (dom, body) = Dom::parse_fragment("<p>Hello <strong>world</strong></p>");
        let p = dom.find_first(body, "p").expect("p");
        assert_eq!(dom.text_content(p), "Hello world");
    }

    #[test]
    fn parse_is_lenient_on_malformed_markup() {
        let (dom, body) = Dom::parse_fragment("<p>unclosed <em>nested");
        assert!(dom.find_first(body, "p").is_some());
        assert!(dom.find_first(body, "em").is_some());
    }

    #[test]
    fn append_detaches_from_old_parent() {
        let mut dom = Dom::new();
        let a = dom.create_element("div", vec![]);
        let b = dom.create_element("div", vec![]);
        let child = dom.create_element("p", vec![]);
        let root = dom.root();
        dom.append(root, a);
        dom.append(root, b);
        dom.append(a, child);
        assert_eq!(dom.parent(child), Some(a));

        dom.append(b, child);
        assert_eq!(dom.parent(child), Some(b));
        assert_eq!(dom.children(a).count(), 0);
        assert_eq!(dom.children(b).count(), 1);
    }

    #[test]
    fn insert_before_links_siblings() {
        let mut dom = Dom::new();
        let root = dom.root();
        let first = dom.create_element("p", vec![]);
        let second = dom.create_element("p", vec![]);
        dom.append(root, first);
        dom.append(root, second);

        let boxed = dom.create_div_with_class("colorbox");
        dom.insert_before(second, boxed);

        let order: Vec<_> = dom.children(root).collect();
        assert_eq!(order, vec![first, boxed, second]);
        assert_eq!(dom.next_sibling(first), Some(boxed));
        assert_eq!(dom.next_sibling(boxed), Some(second));
    }

    #[test]
    fn text_content_collapses_whitespace() {
        let (dom, body) = Dom::parse_fragment("<h2>  Indo-Pacific\n   Strategy </h2>");
        let h2 = dom.find_first(body, "h2").unwrap();
        assert_eq!(dom.text_content(h2), "Indo-Pacific Strategy");
    }

    #[test]
    fn add_class_preserves_existing() {
        let (mut dom, body) = Dom::parse_fragment(r#"<h2 class="lead">T</h2>"#);
        let h2 = dom.find_first(body, "h2").unwrap();
        dom.add_class(h2, "topic-title");
        assert!(dom.has_class(h2, "lead"));
        assert!(dom.has_class(h2, "topic-title"));
        // Adding again is a no-op.
        dom.add_class(h2, "topic-title");
        let html = dom.serialize_children(body);
        assert_eq!(html.matches("topic-title").count(), 1);
    }

    #[test]
    fn serialize_escapes_text_and_attrs() {
        let mut dom = Dom::new();
        let root = dom.root();
        let div = dom.create_div_with_class("a<b");
        dom.append(root, div);
        dom.append_text(div, "1 < 2 & 3");
        let html = dom.serialize_children(root);
        assert_eq!(html, r#"<div class="a&lt;b">1 &lt; 2 &amp; 3</div>"#);
    }

    #[test]
    fn serialize_void_elements_without_close_tag() {
        let (dom, body) = Dom::parse_fragment("<p>a</p><hr><p>b</p>");
        let html = dom.serialize_children(body);
        assert!(html.contains("<hr>"));
        assert!(!html.contains("</hr>"));
    }

    #[test]
    fn trim_edge_whitespace_keeps_inner_nodes() {
        let (mut dom, body) = Dom::parse_fragment("<td>  <em>x</em> y  </td>");
        // html5ever hoists stray td out of table context; find whatever holds em.
        let em = dom.find_first(body, "em").unwrap();
        let holder = dom.parent(em).unwrap();
        dom.trim_edge_whitespace(holder);
        let first = dom.first_child(holder).unwrap();
        assert_eq!(dom.tag_name(first), Some("em"));
    }
}
