//! Arena-based element tree.

use std::fmt::Write;

use crate::parse;

/// Stable handle to a node in a [`Document`].
///
/// Ids are never reused for the lifetime of the document, so side tables
/// keyed by `NodeId` (e.g. the diagram source caches) stay valid even after
/// the node is detached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// Node payload: an element with tag and attributes, or a text run.
#[derive(Debug, Clone)]
pub enum NodeData {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub(crate) fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Mutable element tree the reconcilers run against.
///
/// Detached nodes remain owned by the document (ids stay stable) but are
/// unreachable from the root; [`Document::is_attached`] distinguishes the two.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Document {
    /// Create a document with an `<html>` root element.
    #[must_use]
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        let root = doc.push_node(NodeData::Element {
            tag: "html".to_owned(),
            attrs: Vec::new(),
        });
        doc.root = root;
        doc
    }

    /// The root element.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    fn push_node(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        id
    }

    /// Create a detached element node.
    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        self.push_node(NodeData::Element {
            tag: tag.into(),
            attrs: Vec::new(),
        })
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push_node(NodeData::Text(text.into()))
    }

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Remove a node from its parent. The node and its subtree stay alive but
    /// become unreachable from the root.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
        }
    }

    /// Detach all children of `id`.
    pub fn remove_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
    }

    /// Whether `id` is reachable from the document root.
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.nodes[current.0].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    #[must_use]
    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    /// Element tag name, or `None` for text nodes.
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Element { tag, .. } => Some(tag),
            NodeData::Text(_) => None,
        }
    }

    /// Attribute value on an element node.
    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            NodeData::Text(_) => None,
        }
    }

    /// Set (or replace) an attribute on an element node. No-op on text nodes.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeData::Element { attrs, .. } = &mut self.nodes[id.0].data {
            if let Some(entry) = attrs.iter_mut().find(|(k, _)| k == name) {
                entry.1 = value.to_owned();
            } else {
                attrs.push((name.to_owned(), value.to_owned()));
            }
        }
    }

    /// The `id` attribute.
    #[must_use]
    pub fn element_id(&self, id: NodeId) -> Option<&str> {
        self.attr(id, "id")
    }

    #[must_use]
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .is_some_and(|list| list.split_ascii_whitespace().any(|c| c == class))
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if self.has_class(id, class) {
            return;
        }
        let merged = match self.attr(id, "class") {
            Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
            _ => class.to_owned(),
        };
        self.set_attr(id, "class", &merged);
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        let Some(existing) = self.attr(id, "class") else {
            return;
        };
        let remaining: Vec<&str> = existing
            .split_ascii_whitespace()
            .filter(|c| *c != class)
            .collect();
        let joined = remaining.join(" ");
        self.set_attr(id, "class", &joined);
    }

    /// All elements under `root` (inclusive) carrying `class`, in document
    /// order.
    #[must_use]
    pub fn query_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.walk(root, &mut |doc, id| {
            if doc.has_class(id, class) {
                found.push(id);
            }
        });
        found
    }

    fn walk(&self, id: NodeId, visit: &mut impl FnMut(&Self, NodeId)) {
        visit(self, id);
        for child in self.nodes[id.0].children.clone() {
            self.walk(child, visit);
        }
    }

    /// Concatenated text of the node and all descendants, tags stripped.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].data {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Element { .. } => {
                for child in &self.nodes[id.0].children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    /// Replace the children of `id` with nodes parsed from an HTML fragment.
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) {
        self.remove_children(id);
        let fragment = parse::parse_fragment(self, html);
        for node in fragment {
            self.append_child(id, node);
        }
    }

    /// Serialize the children of `id`.
    #[must_use]
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in &self.nodes[id.0].children {
            self.write_node(*child, &mut out);
        }
        out
    }

    /// Serialize the node itself including its subtree.
    #[must_use]
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].data {
            NodeData::Text(text) => out.push_str(&parse::escape_text(text)),
            NodeData::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    write!(out, r#" {name}="{}""#, parse::escape_attr(value))
                        .expect("string write");
                }
                out.push('>');
                if is_void_element(tag) {
                    return;
                }
                for child in &self.nodes[id.0].children {
                    self.write_node(*child, out);
                }
                write!(out, "</{tag}>").expect("string write");
            }
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_create_and_append() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        let text = doc.create_text("hello");
        doc.append_child(doc.root(), div);
        doc.append_child(div, text);

        assert_eq!(doc.tag(div), Some("div"));
        assert_eq!(doc.text_content(div), "hello");
        assert!(doc.is_attached(text));
    }

    #[test]
    fn test_detach_makes_subtree_unreachable() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        let span = doc.create_element("span");
        doc.append_child(doc.root(), div);
        doc.append_child(div, span);

        doc.detach(div);

        assert!(!doc.is_attached(div));
        assert!(!doc.is_attached(span));
        // Ids keep resolving after detach.
        assert_eq!(doc.tag(span), Some("span"));
    }

    #[test]
    fn test_class_helpers() {
        let mut doc = Document::new();
        let pre = doc.create_element("pre");
        doc.set_attr(pre, "class", "flowchart");

        assert!(doc.has_class(pre, "flowchart"));
        assert!(!doc.has_class(pre, "flowchart-rendered"));

        doc.add_class(pre, "flowchart-rendered");
        assert!(doc.has_class(pre, "flowchart"));
        assert!(doc.has_class(pre, "flowchart-rendered"));

        // Adding twice does not duplicate.
        doc.add_class(pre, "flowchart-rendered");
        assert_eq!(doc.attr(pre, "class"), Some("flowchart flowchart-rendered"));

        doc.remove_class(pre, "flowchart");
        assert_eq!(doc.attr(pre, "class"), Some("flowchart-rendered"));
    }

    #[test]
    fn test_query_class_document_order() {
        let mut doc = Document::new();
        doc.set_inner_html(
            doc.root(),
            r#"<div class="a" id="one"><div class="a" id="two"></div></div><div class="a" id="three"></div>"#,
        );

        let found = doc.query_class(doc.root(), "a");
        let ids: Vec<&str> = found
            .iter()
            .map(|n| doc.element_id(*n).unwrap_or(""))
            .collect();
        assert_eq!(ids, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_set_inner_html_replaces_children() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        doc.append_child(doc.root(), div);

        doc.set_inner_html(div, "<p>first</p>");
        let first = doc.children(div)[0];
        doc.set_inner_html(div, "<p>second</p>");

        assert!(!doc.is_attached(first));
        assert_eq!(doc.text_content(div), "second");
    }

    #[test]
    fn test_text_content_strips_tags() {
        let mut doc = Document::new();
        let pre = doc.create_element("pre");
        doc.append_child(doc.root(), pre);
        doc.set_inner_html(pre, r#"<code><span class="kw">fn</span> main()</code>"#);

        assert_eq!(doc.text_content(pre), "fn main()");
    }

    #[test]
    fn test_roundtrip_serialization() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        doc.append_child(doc.root(), div);
        let html = r#"<pre class="flowchart" id="flowchart-abc123xyz">st=&gt;start: Go</pre>"#;
        doc.set_inner_html(div, html);

        assert_eq!(doc.inner_html(div), html);
    }

    #[test]
    fn test_void_elements_serialize_without_close() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        doc.append_child(doc.root(), div);
        doc.set_inner_html(div, "line<br>break");

        assert_eq!(doc.inner_html(div), "line<br>break");
        assert_eq!(doc.text_content(div), "linebreak");
    }

    #[test]
    fn test_escaped_text_roundtrip() {
        let mut doc = Document::new();
        let pre = doc.create_element("pre");
        doc.append_child(doc.root(), pre);
        doc.set_inner_html(pre, "A-&gt;B: &quot;Yes&quot; &amp; No");

        assert_eq!(doc.text_content(pre), r#"A->B: "Yes" & No"#);
        assert_eq!(doc.inner_html(pre), "A-&gt;B: &quot;Yes&quot; &amp; No");
    }
}
