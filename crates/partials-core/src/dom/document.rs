//! Arena-backed page document.

use super::parser::{Attribute, Token, is_void_element, tokenize};

/// Handle to a node in a [`Document`].
///
/// Handles stay valid for the lifetime of the document. A node removed by
/// [`Document::set_inner_html`] keeps its handle but is detached, so queries
/// starting from the root no longer reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Root,
    Element(ElementData),
    Text(String),
    Comment(String),
    Doctype(String),
}

#[derive(Debug, Clone)]
struct ElementData {
    tag: String,
    attributes: Vec<Attribute>,
    self_closing: bool,
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An HTML document held as a node arena.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self { nodes: vec![Node { kind: NodeKind::Root, parent: None, children: Vec::new() }] }
    }

    /// Parse a full page or fragment.
    pub fn parse(html: &str) -> Self {
        let mut document = Self::new();
        let root = document.root();
        document.parse_into(root, html);
        document
    }

    /// The document root. It has no tag and is never serialized itself.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Serialize the whole document.
    pub fn to_html(&self) -> String {
        self.inner_html(self.root())
    }

    // ---- queries ----

    /// Find the attached element whose `id` attribute equals `id`.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root()).find(|&node| self.attr(node, "id") == Some(id))
    }

    /// All attached elements carrying `class`, in document order.
    pub fn elements_by_class(&self, class: &str) -> Vec<NodeId> {
        self.descendants_by_class(self.root(), class)
    }

    /// The first attached element carrying `class`.
    pub fn first_by_class(&self, class: &str) -> Option<NodeId> {
        self.descendants(self.root()).find(|&node| self.has_class(node, class))
    }

    /// Descendants of `scope` carrying `class`, in document order.
    pub fn descendants_by_class(&self, scope: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(scope).filter(|&node| self.has_class(node, class)).collect()
    }

    /// The first descendant of `scope` with tag name `tag`.
    pub fn first_descendant_by_tag(&self, scope: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(scope).find(|&node| self.tag_name(node) == Some(tag))
    }

    /// All attached elements with tag name `tag`, in document order.
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.descendants(self.root()).filter(|&node| self.tag_name(node) == Some(tag)).collect()
    }

    /// The `<head>` element, if the document has one.
    pub fn head(&self) -> Option<NodeId> {
        self.first_descendant_by_tag(self.root(), "head")
    }

    /// The `<body>` element, if the document has one.
    pub fn body(&self) -> Option<NodeId> {
        self.first_descendant_by_tag(self.root(), "body")
    }

    /// Lowercased tag name, `None` for non-element nodes.
    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Element(element) => Some(element.tag.as_str()),
            _ => None,
        }
    }

    /// Attribute value. Boolean attributes read as the empty string.
    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?
            .attributes
            .iter()
            .find(|attribute| attribute.name == name)
            .map(|attribute| attribute.value.as_deref().unwrap_or(""))
    }

    /// Whether the element's class list contains `class`.
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attr(node, "class").is_some_and(|list| list.split_whitespace().any(|c| c == class))
    }

    /// Child handles of `node`.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// Whether `node` has any child nodes, including text and comments.
    pub fn has_child_nodes(&self, node: NodeId) -> bool {
        !self.nodes[node.0].children.is_empty()
    }

    /// Parent handle, `None` for the root and detached nodes.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut text = String::new();
        for descendant in self.descendants(node) {
            if let NodeKind::Text(value) = &self.nodes[descendant.0].kind {
                text.push_str(value);
            }
        }
        text
    }

    /// Serialize the children of `node`.
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for &child in &self.nodes[node.0].children {
            self.write_node(child, &mut out);
        }
        out
    }

    /// Serialize `node` including its own tag.
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_node(node, &mut out);
        out
    }

    // ---- mutations ----

    /// Replace the children of `node` with the parsed `html`.
    pub fn set_inner_html(&mut self, node: NodeId, html: &str) {
        self.detach_children(node);
        self.parse_into(node, html);
    }

    /// Replace the children of `node` with a single escaped text node.
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        self.detach_children(node);
        let child = self.push_node(NodeKind::Text(escape_text(text)));
        self.append_child(node, child);
    }

    /// Set or replace an attribute.
    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(element) = self.element_mut(node) else {
            return;
        };
        let name = name.to_ascii_lowercase();
        match element.attributes.iter_mut().find(|attribute| attribute.name == name) {
            Some(attribute) => attribute.value = Some(value.to_string()),
            None => element.attributes.push(Attribute::new(name, value)),
        }
    }

    /// Add `class` to the element's class list. Returns false if already present.
    pub fn add_class(&mut self, node: NodeId, class: &str) -> bool {
        if self.tag_name(node).is_none() || self.has_class(node, class) {
            return false;
        }
        let list = match self.attr(node, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
            _ => class.to_string(),
        };
        self.set_attr(node, "class", &list);
        true
    }

    /// Remove `class` from the element's class list. Returns false if absent.
    pub fn remove_class(&mut self, node: NodeId, class: &str) -> bool {
        if !self.has_class(node, class) {
            return false;
        }
        let list = self
            .attr(node, "class")
            .unwrap_or_default()
            .split_whitespace()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr(node, "class", &list);
        true
    }

    /// Flip `class`. Returns whether the class is present afterwards.
    pub fn toggle_class(&mut self, node: NodeId, class: &str) -> bool {
        if self.remove_class(node, class) {
            false
        } else {
            self.add_class(node, class)
        }
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str, attributes: &[(&str, &str)]) -> NodeId {
        let tag = tag.to_ascii_lowercase();
        let self_closing = is_void_element(&tag);
        self.push_node(NodeKind::Element(ElementData {
            tag,
            attributes: attributes.iter().map(|(name, value)| Attribute::new(*name, *value)).collect(),
            self_closing,
        }))
    }

    /// Deep-copy `node` and its subtree into a new detached node.
    pub fn deep_clone(&mut self, node: NodeId) -> NodeId {
        let copy = self.push_node(self.nodes[node.0].kind.clone());
        let children = self.nodes[node.0].children.clone();
        for child in children {
            let child_copy = self.deep_clone(child);
            self.append_child(copy, child_copy);
        }
        copy
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(old_parent) = self.nodes[child.0].parent {
            self.nodes[old_parent.0].children.retain(|&c| c != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    // ---- internals ----

    fn element(&self, node: NodeId) -> Option<&ElementData> {
        match &self.nodes[node.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[node.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(Node { kind, parent: None, children: Vec::new() });
        NodeId(self.nodes.len() - 1)
    }

    fn detach_children(&mut self, node: NodeId) {
        for child in std::mem::take(&mut self.nodes[node.0].children) {
            self.nodes[child.0].parent = None;
        }
    }

    /// Depth-first, document-order walk over the descendants of `scope`.
    fn descendants(&self, scope: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack: Vec<NodeId> = self.nodes[scope.0].children.iter().rev().copied().collect();
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(self.nodes[node.0].children.iter().rev().copied());
            Some(node)
        })
    }

    fn parse_into(&mut self, parent: NodeId, html: &str) {
        let mut open = vec![parent];

        for token in tokenize(html) {
            let current = open.last().copied().unwrap_or(parent);
            match token {
                Token::StartTag { name, attributes, self_closing } => {
                    // `<div />` opens a normal element; only void tags keep the slash.
                    let is_void = is_void_element(&name);
                    let node = self.push_node(NodeKind::Element(ElementData {
                        tag: name,
                        attributes,
                        self_closing: self_closing && is_void,
                    }));
                    self.append_child(current, node);
                    if !is_void {
                        open.push(node);
                    }
                }
                Token::EndTag { name } => {
                    // Index 0 is the insertion parent and is never closed.
                    if let Some(position) =
                        open.iter().skip(1).rposition(|&node| self.tag_name(node) == Some(&name))
                    {
                        open.truncate(position + 1);
                    }
                }
                Token::Text(text) => {
                    let node = self.push_node(NodeKind::Text(text));
                    self.append_child(current, node);
                }
                Token::Comment(text) => {
                    let node = self.push_node(NodeKind::Comment(text));
                    self.append_child(current, node);
                }
                Token::Doctype(text) => {
                    let node = self.push_node(NodeKind::Doctype(text));
                    self.append_child(current, node);
                }
            }
        }
    }

    fn write_node(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].kind {
            NodeKind::Root => out.push_str(&self.inner_html(node)),
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeKind::Doctype(text) => {
                out.push_str("<!");
                out.push_str(text);
                out.push('>');
            }
            NodeKind::Element(element) => {
                out.push('<');
                out.push_str(&element.tag);
                for attribute in &element.attributes {
                    out.push(' ');
                    out.push_str(&attribute.name);
                    if let Some(value) = &attribute.value {
                        out.push_str("=\"");
                        out.push_str(&value.replace('"', "&quot;"));
                        out.push('"');
                    }
                }
                if is_void_element(&element.tag) {
                    out.push_str(if element.self_closing { " />" } else { ">" });
                    return;
                }
                out.push('>');
                for &child in &self.nodes[node.0].children {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(&element.tag);
                out.push('>');
            }
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAV: &str = r#"<nav><ul class="main-menu__list"><li class="nav-item current"><a href="index.html">Home</a></li><li class="nav-item"><a href="about.html">About</a></li></ul></nav>"#;

    #[test]
    fn test_round_trip_well_formed_markup() {
        let html = r#"<!DOCTYPE html><html><head><link rel="stylesheet" href="a.css" /></head><body><!-- x --><div id="header-component"></div><br></body></html>"#;
        assert_eq!(Document::parse(html).to_html(), html);
    }

    #[test]
    fn test_element_by_id() {
        let doc = Document::parse(r#"<div id="a"><span id="b">x</span></div>"#);
        let b = doc.element_by_id("b").unwrap();
        assert_eq!(doc.tag_name(b), Some("span"));
        assert!(doc.element_by_id("missing").is_none());
    }

    #[test]
    fn test_elements_by_class_in_document_order() {
        let doc = Document::parse(NAV);
        let items = doc.elements_by_class("nav-item");
        assert_eq!(items.len(), 2);
        let first_link = doc.first_descendant_by_tag(items[0], "a").unwrap();
        assert_eq!(doc.attr(first_link, "href"), Some("index.html"));
    }

    #[test]
    fn test_class_list_mutations() {
        let mut doc = Document::parse(r#"<li class="nav-item current">x</li>"#);
        let li = doc.first_by_class("nav-item").unwrap();
        assert!(doc.remove_class(li, "current"));
        assert!(!doc.has_class(li, "current"));
        assert!(!doc.remove_class(li, "current"));
        assert!(doc.add_class(li, "current"));
        assert!(!doc.add_class(li, "current"));
        assert_eq!(doc.attr(li, "class"), Some("nav-item current"));
        assert!(!doc.toggle_class(li, "current"));
        assert!(doc.toggle_class(li, "current"));
    }

    #[test]
    fn test_set_inner_html_detaches_old_children() {
        let mut doc = Document::parse(r#"<div id="slot"><p class="old">x</p></div>"#);
        let slot = doc.element_by_id("slot").unwrap();
        doc.set_inner_html(slot, r#"<p class="new">y</p>"#);
        assert!(doc.first_by_class("old").is_none());
        assert!(doc.first_by_class("new").is_some());
        assert_eq!(doc.inner_html(slot), r#"<p class="new">y</p>"#);
    }

    #[test]
    fn test_set_text_escapes() {
        let mut doc = Document::parse(r#"<span class="dynamic-year">2020</span>"#);
        let span = doc.first_by_class("dynamic-year").unwrap();
        doc.set_text(span, "<2025>");
        assert_eq!(doc.text_content(span), "&lt;2025&gt;");
    }

    #[test]
    fn test_deep_clone_is_detached_copy() {
        let mut doc = Document::parse(NAV);
        let list = doc.first_by_class("main-menu__list").unwrap();
        let copy = doc.deep_clone(list);
        assert!(doc.parent(copy).is_none());
        assert_eq!(doc.outer_html(copy), doc.outer_html(list));
        assert_eq!(doc.elements_by_class("main-menu__list").len(), 1);
    }

    #[test]
    fn test_stray_end_tag_is_ignored() {
        let doc = Document::parse("<div></span><p>x</p></div>");
        assert_eq!(doc.to_html(), "<div><p>x</p></div>");
    }

    #[test]
    fn test_unclosed_elements_are_closed() {
        let doc = Document::parse("<div><p>x");
        assert_eq!(doc.to_html(), "<div><p>x</p></div>");
    }

    #[test]
    fn test_fragment_end_tag_does_not_escape_slot() {
        let mut doc = Document::parse(r#"<div id="slot"></div><p>after</p>"#);
        let slot = doc.element_by_id("slot").unwrap();
        doc.set_inner_html(slot, "<span>a</span></div><em>b</em>");
        assert_eq!(doc.inner_html(slot), "<span>a</span><em>b</em>");
    }

    #[test]
    fn test_create_and_append_element() {
        let mut doc = Document::parse("<html><head></head><body></body></html>");
        let head = doc.head().unwrap();
        let link = doc.create_element("link", &[("rel", "prefetch"), ("href", "about.html")]);
        doc.append_child(head, link);
        assert_eq!(
            doc.inner_html(head),
            r#"<link rel="prefetch" href="about.html" />"#
        );
        assert!(doc.body().is_some());
    }

    #[test]
    fn test_self_closing_placeholder_receives_content() {
        let mut doc = Document::parse(r#"<body><div id="sidebar-component" /></body>"#);
        assert_eq!(doc.to_html(), r#"<body><div id="sidebar-component"></div></body>"#);

        let slot = doc.element_by_id("sidebar-component").unwrap();
        doc.set_inner_html(slot, "<aside>side</aside>");
        assert_eq!(
            doc.to_html(),
            r#"<body><div id="sidebar-component"><aside>side</aside></div></body>"#
        );
    }

    #[test]
    fn test_self_closing_non_void_opens_element() {
        let doc = Document::parse("<div class=\"a\" /><p>x</p>");
        let div = doc.first_by_class("a").unwrap();
        assert_eq!(doc.tag_name(doc.children(div)[0]), Some("p"));
        assert_eq!(doc.to_html(), "<div class=\"a\"><p>x</p></div>");
    }

    #[test]
    fn test_has_child_nodes_counts_text() {
        let doc = Document::parse(r#"<div class="a"> </div><div class="b"></div>"#);
        assert!(doc.has_child_nodes(doc.first_by_class("a").unwrap()));
        assert!(!doc.has_child_nodes(doc.first_by_class("b").unwrap()));
    }
}
