//! Element content: tag name, attributes and children.

use indexmap::IndexMap;

use super::Node;
use crate::constants::{
    is_declaration_tag, is_void_tag, COMMENT_TAG, DATA_ID_ATTR, ID_ATTR, SENTINEL_PREFIX,
};

/// Attribute map of an element. Keeps source order for serialization;
/// equality ignores order.
pub type Attributes = IndexMap<String, AttrValue>;

/// The value of a present attribute.
///
/// With the `serde` feature a value serializes as its string and a valueless
/// attribute as `true`, so an absent attribute (`null`) stays distinguishable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttrValue {
    /// A boolean attribute written without `=` (e.g. `disabled`).
    Valueless,
    /// An attribute with a value, stored unescaped.
    Value(String),
}

impl AttrValue {
    /// Returns the string value, or `None` for a valueless attribute.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Valueless => None,
            AttrValue::Value(v) => Some(v),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for AttrValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AttrValue::Valueless => serializer.serialize_bool(true),
            AttrValue::Value(v) => serializer.serialize_str(v),
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for AttrValue {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Flag(bool),
            Value(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Flag(true) => Ok(AttrValue::Valueless),
            Repr::Flag(false) => Err(serde::de::Error::custom(
                "a valueless attribute is written as `true`",
            )),
            Repr::Value(v) => Ok(AttrValue::Value(v)),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Value(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Value(value)
    }
}

/// An element node.
///
/// `attributes` is `None` when the element has no attributes at all; the
/// parser never produces an empty map.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Element {
    tag: String,
    attributes: Option<Attributes>,
    children: Vec<Node>,
}

impl Element {
    /// Creates an element with no attributes and no children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self::with_attributes(tag, None)
    }

    /// Creates an element with the given attribute state and no children.
    pub fn with_attributes(tag: impl Into<String>, attributes: Option<Attributes>) -> Self {
        Element {
            tag: tag.into(),
            attributes,
            children: Vec::new(),
        }
    }

    /// Creates a comment element holding `body` as its single text child.
    pub fn comment(body: impl Into<String>) -> Self {
        Element::new(COMMENT_TAG).with_child(Node::Text(body.into()))
    }

    /// Builder: sets an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.set_attribute(name, value.into());
        self
    }

    /// Builder: sets a valueless attribute.
    pub fn with_flag(mut self, name: impl Into<String>) -> Self {
        self.set_attribute(name, AttrValue::Valueless);
        self
    }

    /// Builder: appends a child.
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Returns the tag name.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns the attribute map, or `None` if the element has no attributes.
    pub fn attributes(&self) -> Option<&Attributes> {
        self.attributes.as_ref()
    }

    /// Returns the value of the named attribute, if present.
    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.as_ref().and_then(|attrs| attrs.get(name))
    }

    /// Iterates over attribute names in source order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .iter()
            .flat_map(|attrs| attrs.keys().map(String::as_str))
    }

    /// Sets an attribute, creating the attribute map if needed.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: AttrValue) {
        self.attributes
            .get_or_insert_with(Attributes::new)
            .insert(name.into(), value);
    }

    /// Removes an attribute. Removing the last attribute returns the element
    /// to the "no attributes" state.
    pub fn remove_attribute(&mut self, name: &str) -> Option<AttrValue> {
        let attrs = self.attributes.as_mut()?;
        let removed = attrs.shift_remove(name);
        if attrs.is_empty() {
            self.attributes = None;
        }
        removed
    }

    /// Returns the children.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Returns a mutable reference to the children.
    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    /// Returns true if this element represents a comment.
    pub fn is_comment(&self) -> bool {
        self.tag == COMMENT_TAG
    }

    /// Returns true if the tag is a sentinel (`#comment`, `#document`).
    pub fn is_sentinel(&self) -> bool {
        self.tag.starts_with(SENTINEL_PREFIX)
    }

    /// Returns true for declaration-like elements (`!DOCTYPE`, `?xml`).
    pub fn is_declaration(&self) -> bool {
        is_declaration_tag(&self.tag)
    }

    /// Returns true if the tag names a void element.
    pub fn is_void(&self) -> bool {
        is_void_tag(&self.tag)
    }

    /// Returns the `id` attribute value, falling back to `data-id`.
    pub fn stable_id(&self) -> Option<(&'static str, &str)> {
        [ID_ATTR, DATA_ID_ATTR].into_iter().find_map(|name| {
            self.attribute(name)
                .and_then(AttrValue::as_str)
                .map(|value| (name, value))
        })
    }

    /// Returns the concatenated text children, used for comment bodies.
    pub fn text_content(&self) -> String {
        self.children.iter().filter_map(Node::as_text).collect()
    }
}
