//! Mutable, namespace-aware element tree
//!
//! Text content is stored in its escaped source form so that nodes the caller
//! never touches are written back exactly as they were read.

use quick_xml::escape::{escape, unescape};

/// XML namespace bound to the reserved `xml` prefix
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// A parsed XML document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Nodes between the declaration and the root element
    pub(crate) prolog: Vec<Node>,
    pub(crate) root: Element,
    /// Nodes after the root element
    pub(crate) epilog: Vec<Node>,
    pub(crate) had_declaration: bool,
}

impl Document {
    /// Create a document around a root element
    pub fn new(root: Element) -> Self {
        Self {
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
            had_declaration: false,
        }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }
}

/// A node in the tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Character data, escaped
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    DocType(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    fn is_blank_text(&self) -> bool {
        matches!(self, Node::Text(t) if t.trim().is_empty())
    }
}

/// An element with its qualified name, resolved namespace, attributes and children
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    namespace: Option<String>,
    /// Qualified attribute name and unescaped value, in source order
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Create an empty element
    ///
    /// `name` is the qualified name as it will be written (`opf:item`, `meta`);
    /// `namespace` is the URI that name resolves to in its destination scope.
    pub fn new(name: impl Into<String>, namespace: Option<&str>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.map(str::to_string),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub(crate) fn from_parts(
        name: String,
        namespace: Option<String>,
        attributes: Vec<(String, String)>,
    ) -> Self {
        Self {
            name,
            namespace,
            attributes,
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Qualified name, including any prefix
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local_name(&self) -> &str {
        self.name
            .split_once(':')
            .map(|(_, local)| local)
            .unwrap_or(&self.name)
    }

    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Whether this element is `local` in namespace `ns`
    pub fn is(&self, ns: &str, local: &str) -> bool {
        self.namespace() == Some(ns) && self.local_name() == local
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub(crate) fn push_node(&mut self, node: Node) {
        self.children.push(node);
    }

    /// Direct child elements
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    /// First direct child matching `predicate`
    pub fn child<P>(&self, predicate: P) -> Option<&Element>
    where
        P: Fn(&Element) -> bool,
    {
        self.elements().find(|el| predicate(el))
    }

    pub fn child_mut<P>(&mut self, predicate: P) -> Option<&mut Element>
    where
        P: Fn(&Element) -> bool,
    {
        self.elements_mut().find(|el| predicate(el))
    }

    /// All descendants (excluding self) matching `predicate`, in document order
    pub fn descendants<'a, P>(&'a self, predicate: &P) -> Vec<&'a Element>
    where
        P: Fn(&Element) -> bool,
    {
        let mut found = Vec::new();
        for el in self.elements() {
            if predicate(el) {
                found.push(el);
            }
            found.extend(el.descendants(predicate));
        }
        found
    }

    /// Unescaped text of the direct text and CDATA children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .map(|node| match node {
                Node::Text(raw) => unescape(raw)
                    .map(|text| text.into_owned())
                    .unwrap_or_else(|_| raw.clone()),
                Node::CData(data) => data.clone(),
                _ => String::new(),
            })
            .collect()
    }

    /// Replace all children with a single text node
    pub fn set_text(&mut self, text: &str) {
        self.children = vec![Node::Text(escape(text).into_owned())];
    }

    /// Append a child element after the last existing child element,
    /// reusing the indentation that precedes it
    pub fn append_element(&mut self, child: Element) {
        let last = self
            .children
            .iter()
            .rposition(|node| matches!(node, Node::Element(_)));

        match last {
            Some(index) => {
                let indent = index
                    .checked_sub(1)
                    .and_then(|prev| self.children.get(prev))
                    .filter(|node| node.is_blank_text())
                    .cloned();
                self.children.insert(index + 1, Node::Element(child));
                if let Some(indent) = indent {
                    self.children.insert(index + 1, indent);
                }
            }
            None => {
                // Only whitespace (the closing tag's indentation) or nothing at all
                let closing = match self.children.last() {
                    Some(Node::Text(t)) if t.trim().is_empty() && !t.is_empty() => {
                        Some(t.clone())
                    }
                    _ => None,
                };
                match closing {
                    Some(closing) => {
                        self.children.pop();
                        self.children.push(Node::Text(format!("{closing}  ")));
                        self.children.push(Node::Element(child));
                        self.children.push(Node::Text(closing));
                    }
                    None => self.children.push(Node::Element(child)),
                }
            }
        }
    }

    /// Remove the first direct child element matching `predicate`, together with
    /// the indentation in front of it
    pub fn remove_element<P>(&mut self, predicate: P) -> Option<Element>
    where
        P: Fn(&Element) -> bool,
    {
        let index = self
            .children
            .iter()
            .position(|node| matches!(node, Node::Element(el) if predicate(el)))?;

        let removed = match self.children.remove(index) {
            Node::Element(el) => el,
            _ => unreachable!("position matched an element"),
        };
        if index > 0 && self.children[index - 1].is_blank_text() {
            self.children.remove(index - 1);
        }
        Some(removed)
    }
}
