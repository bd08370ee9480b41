//! Core types for mutable XML trees.
//!
//! Nodes live in an arena owned by [`XmlDocument`] and are addressed by
//! [`NodeId`]. Removing a node only detaches it from its parent, so ids
//! collected before a mutation stay valid afterwards.

/// Namespace bound to the reserved `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Handle to a node inside an [`XmlDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// A qualified XML name, split into prefix and local part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QName {
    /// Namespace prefix, if any (e.g., "w" in `<w:p>`).
    pub prefix: Option<String>,
    /// The local name (without prefix).
    pub local: String,
}

impl QName {
    /// Split a raw `prefix:local` name.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((prefix, local)) => Self {
                prefix: Some(prefix.to_string()),
                local: local.to_string(),
            },
            None => Self {
                prefix: None,
                local: raw.to_string(),
            },
        }
    }

    /// The name as written in markup.
    pub fn qualified(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.local),
            None => self.local.clone(),
        }
    }
}

/// An attribute with its resolved namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub name: QName,

    /// Namespace URI the prefix resolved to. Unprefixed attributes are in no
    /// namespace.
    pub namespace: Option<String>,

    /// The attribute value (after unescaping XML entities).
    pub value: String,
}

/// Element payload: name, resolved namespace and attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: QName,

    /// Namespace URI in scope for this element's prefix (or the default
    /// namespace when unprefixed).
    pub namespace: Option<String>,

    pub attributes: Vec<XmlAttribute>,
}

impl XmlElement {
    /// Check the namespace URI and local name.
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.name.local == local && self.namespace.as_deref() == Some(namespace)
    }

    /// Get an attribute value by its raw (possibly prefixed) name.
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.qualified() == name)
            .map(|a| a.value.as_str())
    }

    /// Get an attribute value by namespace URI and local name.
    pub fn get_attribute_ns(&self, namespace: &str, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.local == local && a.namespace.as_deref() == Some(namespace))
            .map(|a| a.value.as_str())
    }
}

/// The different kinds of node stored in the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNodeKind {
    /// The document node; parent of the root element and of any
    /// prolog/epilog nodes.
    Document,

    Element(XmlElement),

    /// Character data (after unescaping XML entities).
    Text(String),

    /// A `<![CDATA[...]]>` section.
    CData(String),

    /// Comment content without the `<!--`/`-->` delimiters.
    Comment(String),

    /// The XML declaration content, e.g. `xml version="1.0"`.
    Declaration(String),

    /// Processing instruction content without `<?`/`?>`.
    ProcessingInstruction(String),

    /// DOCTYPE content without `<!DOCTYPE`/`>`.
    DocType(String),
}

#[derive(Debug, Clone)]
pub(crate) struct XmlNode {
    pub(crate) kind: XmlNodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

/// A parsed XML document.
///
/// The document owns every node; all navigation and mutation goes through
/// it. Node 0 is always the document node.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    pub(crate) nodes: Vec<XmlNode>,
}

impl Default for XmlDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlDocument {
    /// Create a document containing only the document node.
    pub fn new() -> Self {
        Self {
            nodes: vec![XmlNode {
                kind: XmlNodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// The document node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// The single root element, if present.
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.root())
            .iter()
            .copied()
            .find(|&id| self.element(id).is_some())
    }

    pub fn kind(&self, id: NodeId) -> &XmlNodeKind {
        &self.nodes[id.0].kind
    }

    /// Element payload, if `id` is an element.
    pub fn element(&self, id: NodeId) -> Option<&XmlElement> {
        match &self.nodes[id.0].kind {
            XmlNodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut XmlElement> {
        match &mut self.nodes[id.0].kind {
            XmlNodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    /// Check whether `id` is an element with the given namespace and local name.
    pub fn is_element_ns(&self, id: NodeId, namespace: &str, local: &str) -> bool {
        self.element(id).is_some_and(|e| e.is(namespace, local))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Whether `id` is still reachable from the document node.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root() {
                return true;
            }
            match self.parent(current) {
                Some(parent) if self.children(parent).contains(&current) => current = parent,
                _ => return false,
            }
        }
    }

    fn position_in_parent(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(id)?;
        let index = self.children(parent).iter().position(|&c| c == id)?;
        Some((parent, index))
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.position_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.position_in_parent(id)?;
        index
            .checked_sub(1)
            .and_then(|i| self.children(parent).get(i).copied())
    }

    /// The next sibling that is an element, skipping text and comments.
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.next_sibling(id);
        while let Some(sibling) = current {
            if self.is_element(sibling) {
                return Some(sibling);
            }
            current = self.next_sibling(sibling);
        }
        None
    }

    /// The previous sibling that is an element, skipping text and comments.
    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.previous_sibling(id);
        while let Some(sibling) = current {
            if self.is_element(sibling) {
                return Some(sibling);
            }
            current = self.previous_sibling(sibling);
        }
        None
    }

    /// All descendants of `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Descendant elements with the given namespace and local name, in
    /// document order.
    pub fn descendants_ns(&self, id: NodeId, namespace: &str, local: &str) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&d| self.is_element_ns(d, namespace, local))
            .collect()
    }

    /// First descendant element with the given namespace and local name.
    pub fn first_descendant_ns(&self, id: NodeId, namespace: &str, local: &str) -> Option<NodeId> {
        self.descendants(id)
            .into_iter()
            .find(|&d| self.is_element_ns(d, namespace, local))
    }

    /// Concatenated text of all descendant text and CDATA nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        match self.kind(id) {
            XmlNodeKind::Text(text) | XmlNodeKind::CData(text) => return text.clone(),
            _ => {}
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|d| match self.kind(d) {
                XmlNodeKind::Text(text) | XmlNodeKind::CData(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replace all children of `id` with a single text node.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        for child in std::mem::take(&mut self.nodes[id.0].children) {
            self.nodes[child.0].parent = None;
        }
        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.append_child(id, text_node);
        }
    }

    /// Replace the content of a text, CDATA or comment node in place.
    ///
    /// Returns `false` when the node kind carries no character data.
    pub fn set_node_value(&mut self, id: NodeId, value: &str) -> bool {
        match &mut self.nodes[id.0].kind {
            XmlNodeKind::Text(text) | XmlNodeKind::CData(text) | XmlNodeKind::Comment(text) => {
                *text = value.to_string();
                true
            }
            _ => false,
        }
    }

    /// Get an attribute value by its raw name (e.g. `w:type`).
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.get_attribute(name))
    }

    /// Get an attribute value by namespace URI and local name.
    pub fn attribute_ns(&self, id: NodeId, namespace: &str, local: &str) -> Option<&str> {
        self.element(id)
            .and_then(|e| e.get_attribute_ns(namespace, local))
    }

    /// Set an unprefixed attribute, replacing an existing value.
    ///
    /// Does nothing if `id` is not an element.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(element) = self.element_mut(id) else {
            return;
        };
        let qname = QName::parse(name);
        if let Some(existing) = element.attributes.iter_mut().find(|a| a.name == qname) {
            existing.value = value.to_string();
        } else {
            element.attributes.push(XmlAttribute {
                name: qname,
                namespace: None,
                value: value.to_string(),
            });
        }
    }

    /// Detach `id` (and its subtree) from its parent.
    ///
    /// The node stays in the arena, so ids held by callers remain usable;
    /// it simply no longer serializes.
    pub fn remove(&mut self, id: NodeId) {
        if let Some((parent, index)) = self.position_in_parent(id) {
            self.nodes[parent.0].children.remove(index);
        }
        self.nodes[id.0].parent = None;
    }

    pub(crate) fn push_node(&mut self, kind: XmlNodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(XmlNode {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create a detached element.
    pub fn create_element(&mut self, element: XmlElement) -> NodeId {
        self.push_node(XmlNodeKind::Element(element))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push_node(XmlNodeKind::Text(text.to_string()))
    }

    /// Create a detached comment node.
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push_node(XmlNodeKind::Comment(text.to_string()))
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.remove(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Insert `node` immediately before `reference`.
    ///
    /// Returns `false` if `reference` has no parent.
    pub fn insert_before(&mut self, node: NodeId, reference: NodeId) -> bool {
        self.remove(node);
        let Some((parent, index)) = self.position_in_parent(reference) else {
            return false;
        };
        self.nodes[node.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(index, node);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "urn:test";

    fn element(name: &str) -> XmlElement {
        XmlElement {
            name: QName::parse(name),
            namespace: Some(NS.to_string()),
            attributes: vec![],
        }
    }

    fn sample() -> (XmlDocument, NodeId, NodeId, NodeId) {
        let mut doc = XmlDocument::new();
        let root = doc.create_element(element("t:root"));
        doc.append_child(doc.root(), root);
        let a = doc.create_element(element("t:a"));
        let text = doc.create_text("  ");
        let b = doc.create_element(element("t:b"));
        doc.append_child(root, a);
        doc.append_child(root, text);
        doc.append_child(root, b);
        (doc, root, a, b)
    }

    #[test]
    fn test_qname_parse() {
        let name = QName::parse("w:fldChar");
        assert_eq!(name.prefix.as_deref(), Some("w"));
        assert_eq!(name.local, "fldChar");
        assert_eq!(name.qualified(), "w:fldChar");
        assert_eq!(QName::parse("plain").qualified(), "plain");
    }

    #[test]
    fn test_element_siblings_skip_text() {
        let (doc, root, a, b) = sample();
        assert_eq!(doc.document_element(), Some(root));
        assert_eq!(doc.next_element_sibling(a), Some(b));
        assert_eq!(doc.previous_element_sibling(b), Some(a));
        assert_eq!(doc.previous_element_sibling(a), None);
        assert!(doc.next_sibling(a).is_some_and(|n| !doc.is_element(n)));
    }

    #[test]
    fn test_remove_keeps_id_usable() {
        let (mut doc, root, a, b) = sample();
        doc.remove(a);
        assert!(!doc.is_attached(a));
        assert!(doc.is_attached(b));
        assert_eq!(doc.descendants_ns(root, NS, "a"), Vec::<NodeId>::new());
        assert!(doc.is_element_ns(a, NS, "a"));
    }

    #[test]
    fn test_set_text_content_and_attribute() {
        let (mut doc, _root, a, _b) = sample();
        doc.set_text_content(a, "hello");
        assert_eq!(doc.text_content(a), "hello");
        doc.set_attribute(a, "data-x", "1");
        doc.set_attribute(a, "data-x", "2");
        assert_eq!(doc.attribute(a, "data-x"), Some("2"));
        assert_eq!(doc.element(a).map(|e| e.attributes.len()), Some(1));
    }

    #[test]
    fn test_insert_before() {
        let (mut doc, root, a, b) = sample();
        let comment = doc.create_comment("note");
        assert!(doc.insert_before(comment, b));
        assert_eq!(doc.previous_sibling(b), Some(comment));
        assert_eq!(doc.children(root).len(), 4);
        assert_eq!(doc.children(root)[0], a);
    }
}
