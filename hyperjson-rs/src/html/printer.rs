//! Markup printer that renders node trees.
//!
//! The inverse of the parser: parsing the output again yields the same
//! tags, attributes and text.

use std::fmt::{self, Write};

use crate::node::{AttrValue, Attributes, Element, Node};

/// Markup printer writing into any `fmt::Write` sink.
pub struct HtmlPrinter<W: Write> {
    writer: W,
}

impl<W: Write> HtmlPrinter<W> {
    /// Creates a new printer.
    pub fn new(writer: W) -> Self {
        HtmlPrinter { writer }
    }

    /// Consumes the printer and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Prints a node and its subtree.
    pub fn print(&mut self, node: &Node) -> fmt::Result {
        match node {
            Node::Text(text) => self.writer.write_str(text),
            Node::Element(element) => self.print_element(element),
        }
    }

    /// Prints an element and its subtree.
    pub fn print_element(&mut self, element: &Element) -> fmt::Result {
        let tag = element.tag();

        if element.is_comment() {
            return write!(self.writer, "<!--{}-->", element.text_content());
        }
        if element.is_sentinel() {
            // `#document` and other synthetic containers render as their content.
            return self.print_children(element.children());
        }

        write!(self.writer, "<{}", tag)?;
        self.print_attributes(element.attributes())?;

        if element.is_declaration() {
            self.writer.write_char('>')?;
            self.print_children(element.children())
        } else if element.children().is_empty() {
            self.writer.write_str(" />")
        } else {
            self.writer.write_char('>')?;
            self.print_children(element.children())?;
            write!(self.writer, "</{}>", tag)
        }
    }

    fn print_children(&mut self, children: &[Node]) -> fmt::Result {
        for child in children {
            self.print(child)?;
        }
        Ok(())
    }

    fn print_attributes(&mut self, attributes: Option<&Attributes>) -> fmt::Result {
        for (name, value) in attributes.into_iter().flatten() {
            match value {
                AttrValue::Valueless => write!(self.writer, " {}", name)?,
                AttrValue::Value(v) => write!(self.writer, " {}=\"{}\"", name, escape_attribute(v))?,
            }
        }
        Ok(())
    }
}

/// Escapes an attribute value for a double-quoted context.
///
/// Already escaped quotes are normalized first, so escaping is idempotent
/// across repeated parse/print cycles.
///
/// Backslashes are written as is. A value ending in a backslash therefore
/// prints as `"...\"`, which the parser reads as an escaped delimiter and
/// rejects as an unterminated value. Such values do not survive a round trip.
pub fn escape_attribute(value: &str) -> String {
    value.replace("\\\"", "\"").replace('"', "\\\"")
}

/// Prints a node tree to a string.
pub fn print_to_string(node: &Node) -> String {
    node.to_string()
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        HtmlPrinter::new(f).print(self)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        HtmlPrinter::new(f).print_element(self)
    }
}
