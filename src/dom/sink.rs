//! html5ever `TreeSink` that builds a [`Dom`] arena.

use std::cell::RefCell;

use html5ever::tendril::StrTendril;
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute as Html5Attribute, QualName};

use super::{Attr, Dom, NodeData, NodeId};

/// Handle used by the tree builder to reference arena nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handle(pub Option<NodeId>);

impl Default for Handle {
    fn default() -> Self {
        Handle(None)
    }
}

/// TreeSink implementation over the arena.
///
/// html5ever's trait takes `&self`, so the arena sits behind a `RefCell`.
pub struct DomSink {
    dom: RefCell<Dom>,
    quirks_mode: RefCell<QuirksMode>,
}

impl Default for DomSink {
    fn default() -> Self {
        Self::new()
    }
}

impl DomSink {
    pub fn new() -> Self {
        Self {
            dom: RefCell::new(Dom::new()),
            quirks_mode: RefCell::new(QuirksMode::NoQuirks),
        }
    }

    /// Consume the sink and return the finished tree.
    pub fn into_dom(self) -> Dom {
        self.dom.into_inner()
    }
}

fn convert_attrs(attrs: Vec<Html5Attribute>) -> Vec<Attr> {
    attrs
        .into_iter()
        .map(|a| Attr {
            name: a.name,
            value: a.value.to_string(),
        })
        .collect()
}

impl TreeSink for DomSink {
    type Handle = Handle;
    type Output = Self;
    type ElemName<'a>
        = &'a QualName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self
    }

    fn parse_error(&self, _msg: std::borrow::Cow<'static, str>) {
        // Lenient by contract: recover like a browser, report nothing.
    }

    fn get_document(&self) -> Self::Handle {
        Handle(Some(self.dom.borrow().root()))
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        static EMPTY: QualName = QualName {
            prefix: None,
            ns: html5ever::ns!(),
            local: html5ever::local_name!(""),
        };

        let Some(id) = target.0 else { return &EMPTY };
        let dom = self.dom.borrow();
        match dom.data(id) {
            NodeData::Element { name, .. } => {
                // SAFETY: the QualName lives in the arena, which lives as long
                // as self; the borrow checker cannot see through the RefCell.
                // Names are never removed or mutated once allocated.
                unsafe { std::mem::transmute::<&QualName, &'a QualName>(name) }
            }
            _ => &EMPTY,
        }
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Html5Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        let id = self
            .dom
            .borrow_mut()
            .create_element_qual(name, convert_attrs(attrs));
        Handle(Some(id))
    }

    fn create_comment(&self, text: StrTendril) -> Self::Handle {
        Handle(Some(self.dom.borrow_mut().create_comment(&text)))
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Self::Handle {
        Handle(Some(self.dom.borrow_mut().create_comment("")))
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        let Some(parent) = parent.0 else { return };
        let mut dom = self.dom.borrow_mut();
        match child {
            NodeOrText::AppendNode(node) => {
                if let Some(node) = node.0 {
                    dom.append(parent, node);
                }
            }
            NodeOrText::AppendText(text) => dom.append_text(parent, &text),
        }
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        let parent = element.0.and_then(|id| self.dom.borrow().parent(id));
        if parent.is_some() {
            self.append(&Handle(parent), child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
        // Fragments are re-wrapped in our own shell; the doctype is dropped.
    }

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        *target
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        x.0 == y.0
    }

    fn set_quirks_mode(&self, mode: QuirksMode) {
        *self.quirks_mode.borrow_mut() = mode;
    }

    fn append_before_sibling(&self, sibling: &Self::Handle, new_node: NodeOrText<Self::Handle>) {
        let Some(sibling) = sibling.0 else { return };
        let mut dom = self.dom.borrow_mut();
        match new_node {
            NodeOrText::AppendNode(node) => {
                if let Some(node) = node.0 {
                    dom.insert_before(sibling, node);
                }
            }
            NodeOrText::AppendText(text) => {
                let t = dom.create_text(&text);
                dom.insert_before(sibling, t);
            }
        }
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<Html5Attribute>) {
        let Some(id) = target.0 else { return };
        let mut dom = self.dom.borrow_mut();
        let new_attrs = convert_attrs(attrs);
        if let NodeData::Element { attrs: existing, .. } = dom.data_mut(id) {
            for attr in new_attrs {
                if !existing.iter().any(|a| a.name == attr.name) {
                    existing.push(attr);
                }
            }
        }
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        if let Some(id) = target.0 {
            self.dom.borrow_mut().detach(id);
        }
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        if let (Some(from), Some(to)) = (node.0, new_parent.0) {
            self.dom.borrow_mut().reparent_children(from, to);
        }
    }
}
