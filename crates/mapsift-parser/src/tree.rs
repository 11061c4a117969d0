//! In-memory element tree of an XML document.
//!
//! The tree keeps everything needed to write the document back out: comments,
//! processing instructions, CDATA sections and whitespace text all survive a
//! read/write cycle. Text and attribute values are stored decoded.

use indexmap::IndexMap;

use crate::span::Span;

/// A node inside an element or at the top level of a document.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    CData(String),
    /// Content between `<?` and `?>`, including the XML declaration.
    ProcessingInstruction(String),
    /// Content between `<!DOCTYPE` and `>`.
    Doctype(String),
}

impl Node {
    /// Returns the element if this node is one
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Returns the element mutably if this node is one
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Returns true for text nodes made only of whitespace
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Node::Text(text) if text.trim().is_empty())
    }
}

/// An XML element with ordered attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    attributes: IndexMap<String, String>,
    children: Vec<Node>,
    span: Span,
}

impl Element {
    /// Creates an element without attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
            span: Span::default(),
        }
    }

    pub(crate) fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Returns the tag name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the span of the start tag in the source document.
    ///
    /// Elements built in memory have an empty span at offset zero.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Returns the decoded value of an attribute
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Iterates over attributes in document order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Sets an attribute, keeping its position if it already exists.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Returns the child nodes
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Returns the child nodes mutably
    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    /// Appends a child node
    pub fn push(&mut self, node: Node) {
        self.children.push(node);
    }

    /// Iterates over the direct child elements
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Returns the first direct child element with the given name
    pub fn first_child(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|child| child.name == name)
    }

    /// Returns the first element named `name` in pre-order, this element included.
    pub fn find(&self, name: &str) -> Option<&Element> {
        if self.name == name {
            return Some(self);
        }
        self.child_elements().find_map(|child| child.find(name))
    }

    /// Returns true if any descendant element is named one of `names`.
    pub fn has_descendant(&self, names: &[&str]) -> bool {
        self.child_elements()
            .any(|child| names.contains(&child.name()) || child.has_descendant(names))
    }

    /// Concatenates the direct text and CDATA children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) | Node::CData(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// A complete document: one root element with its surrounding nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    prolog: Vec<Node>,
    root: Element,
    epilog: Vec<Node>,
}

impl XmlDocument {
    /// Creates a document from its three top-level sections.
    pub fn new(prolog: Vec<Node>, root: Element, epilog: Vec<Node>) -> Self {
        Self {
            prolog,
            root,
            epilog,
        }
    }

    /// Nodes before the root element (declaration, comments, DOCTYPE)
    pub fn prolog(&self) -> &[Node] {
        &self.prolog
    }

    /// Returns the root element
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Returns the root element mutably
    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    /// Nodes after the root element
    pub fn epilog(&self) -> &[Node] {
        &self.epilog
    }
}
