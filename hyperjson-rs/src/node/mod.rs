//! Node structures for the markup tree.
//!
//! A tree is an owned value: each element exclusively owns its children,
//! there are no parent pointers, and cloning a node deep-copies its subtree.

mod element;

pub use element::{AttrValue, Attributes, Element};

/// A node in the markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Node {
    /// Raw character data.
    Text(String),
    /// An element, including comments and declarations.
    Element(Element),
}

impl Node {
    /// Creates a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    /// Creates a comment node.
    pub fn comment(body: impl Into<String>) -> Self {
        Node::Element(Element::comment(body))
    }

    /// Returns true if this is a text node.
    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    /// Returns true if this is an element node.
    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    /// Returns the text, if this is a text node.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(t) => Some(t),
            Node::Element(_) => None,
        }
    }

    /// Returns the element, if this is an element node.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }
    }

    /// Returns a mutable reference to the element, if this is an element node.
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }
    }

    /// Returns true if this is a text node made only of whitespace.
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Node::Text(t) if t.trim().is_empty())
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}
