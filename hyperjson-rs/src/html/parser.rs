//! Markup parser that builds node trees.
//!
//! A single left-to-right scan over the input with an explicit stack of open
//! elements. The scanner is deliberately lenient: it does not validate, it
//! only fails when the input ends inside a construct or leaves tags open.

use crate::constants::{is_void_tag, DOCUMENT_TAG};
use crate::error::{Error, Result};
use crate::node::{AttrValue, Attributes, Element, Node};

/// Options for parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Keep whitespace-only text children verbatim.
    ///
    /// When false, every element with more than one child whose text
    /// children are all whitespace loses those text children, so that
    /// indentation does not show up as structure when diffing.
    pub preserve_whitespace: bool,
}

/// Markup parser.
#[derive(Debug, Clone, Default)]
pub struct HtmlParser {
    options: ParseOptions,
}

impl HtmlParser {
    /// Creates a new parser with the given options.
    pub fn new(options: ParseOptions) -> Self {
        HtmlParser { options }
    }

    /// Parses markup from a string.
    ///
    /// Returns a `#document` element whose children are the top-level nodes
    /// of the input.
    pub fn parse_str(&self, html: &str) -> Result<Element> {
        let mut document = TreeBuilder::new(html).run()?;
        if !self.options.preserve_whitespace {
            collapse_whitespace(&mut document);
        }
        Ok(document)
    }
}

/// Parses markup from a string with default options.
pub fn parse_str(html: &str) -> Result<Element> {
    HtmlParser::default().parse_str(html)
}

/// Scanner state: the input, a cursor, and the open elements.
struct TreeBuilder {
    chars: Vec<char>,
    pos: usize,
    document: Element,
    open: Vec<Element>,
}

impl TreeBuilder {
    fn new(html: &str) -> Self {
        TreeBuilder {
            chars: html.chars().collect(),
            pos: 0,
            document: Element::new(DOCUMENT_TAG),
            open: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Element> {
        while let Some(c) = self.current() {
            if c == '<' {
                if self.peek(1) == Some('/') {
                    self.close_tag()?;
                    continue;
                }
                if self.starts_with("<!--") {
                    self.comment(4)?;
                    continue;
                }
                if self.starts_with("<--") {
                    self.comment(3)?;
                    continue;
                }
                if self.peek(1).is_some_and(|next| !next.is_whitespace()) {
                    self.open_tag()?;
                    continue;
                }
            }
            self.push_char(c);
            self.pos += 1;
        }

        if let Some(unclosed) = self.open.last() {
            return Err(Error::malformed(
                self.chars.len(),
                format!("unclosed tag `{}`", unclosed.tag()),
            ));
        }
        Ok(self.document)
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn starts_with(&self, literal: &str) -> bool {
        let mut index = self.pos;
        for expected in literal.chars() {
            if self.chars.get(index) != Some(&expected) {
                return false;
            }
            index += 1;
        }
        true
    }

    /// True at `/>`.
    fn at_self_close(&self) -> bool {
        self.current() == Some('/') && self.peek(1) == Some('>')
    }

    /// Appends a finished node to the innermost open element.
    fn attach(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(parent) => parent.children_mut().push(node),
            None => self.document.children_mut().push(node),
        }
    }

    /// Adds one character of content to the innermost open element.
    /// Characters outside any element are dropped.
    fn push_char(&mut self, c: char) {
        let Some(parent) = self.open.last_mut() else {
            return;
        };
        match parent.children_mut().last_mut() {
            Some(Node::Text(text)) => text.push(c),
            _ => parent.children_mut().push(Node::Text(c.to_string())),
        }
    }

    fn close_tag(&mut self) -> Result<()> {
        let start = self.pos;
        self.pos += 2;
        let mut name = String::new();
        loop {
            match self.current() {
                None => return Err(Error::malformed(start, "unterminated close tag")),
                Some('>') => {
                    self.pos += 1;
                    break;
                }
                Some(c) => {
                    name.push(c);
                    self.pos += 1;
                }
            }
        }
        let name = name.trim();

        let Some(current) = self.open.last() else {
            return Err(Error::malformed(
                start,
                format!("close tag `{}` with no open element", name),
            ));
        };
        if current.tag() != name {
            if is_void_tag(name) {
                log::trace!("ignoring close tag of void element `{}`", name);
                return Ok(());
            }
            log::warn!(
                "close tag `{}` at offset {} closes `{}`",
                name,
                start,
                current.tag()
            );
        }

        if let Some(element) = self.open.pop() {
            self.attach(Node::Element(element));
        }
        Ok(())
    }

    /// Scans a comment whose opener is `opener_len` characters long. The body
    /// runs to the first `-->`.
    fn comment(&mut self, opener_len: usize) -> Result<()> {
        let start = self.pos;
        self.pos += opener_len;
        let body_start = self.pos;
        while !self.starts_with("-->") {
            if self.current().is_none() {
                return Err(Error::malformed(start, "unterminated comment"));
            }
            self.pos += 1;
        }
        let body: String = self.chars[body_start..self.pos].iter().collect();
        self.pos += 3;
        self.attach(Node::comment(body));
        Ok(())
    }

    fn open_tag(&mut self) -> Result<()> {
        let start = self.pos;
        self.pos += 1;

        let mut tag = String::new();
        while let Some(c) = self.current() {
            if c.is_whitespace() || c == '>' || self.at_self_close() {
                break;
            }
            tag.push(c);
            self.pos += 1;
        }

        let mut attributes = Attributes::new();
        loop {
            match self.current() {
                None => {
                    return Err(Error::malformed(
                        start,
                        format!("unterminated opening tag `{}`", tag),
                    ))
                }
                Some('>') => {
                    self.pos += 1;
                    let element = Element::with_attributes(tag, non_empty(attributes));
                    self.enter(element);
                    return Ok(());
                }
                Some('/') if self.peek(1) == Some('>') => {
                    self.pos += 2;
                    let element = Element::with_attributes(tag, non_empty(attributes));
                    self.attach(Node::Element(element));
                    return Ok(());
                }
                Some(c) if c.is_whitespace() => self.pos += 1,
                Some(_) => self.attribute(&mut attributes)?,
            }
        }
    }

    /// Handles the end of an opening tag. Void and declaration-like elements
    /// can never receive children, so they are closed right away.
    fn enter(&mut self, element: Element) {
        if element.is_void() || element.is_declaration() {
            self.attach(Node::Element(element));
        } else {
            self.open.push(element);
        }
    }

    fn attribute(&mut self, attributes: &mut Attributes) -> Result<()> {
        let mut name = String::new();
        while let Some(c) = self.current() {
            if c == '=' || c == '>' || c.is_whitespace() || self.at_self_close() {
                break;
            }
            name.push(c);
            self.pos += 1;
        }

        let value = if self.current() == Some('=') {
            self.pos += 1;
            AttrValue::Value(self.attribute_value()?)
        } else {
            AttrValue::Valueless
        };

        if !name.is_empty() {
            attributes.insert(name, value);
        }
        Ok(())
    }

    /// Scans an attribute value after `=`.
    ///
    /// A leading `"` or `'` is the delimiter; a delimiter preceded by a
    /// backslash is part of the value and is stored without the backslash.
    fn attribute_value(&mut self) -> Result<String> {
        let start = self.pos;
        let mut value = String::new();

        match self.current() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                loop {
                    match self.current() {
                        None => return Err(Error::malformed(start, "unterminated attribute value")),
                        Some('\\') if self.peek(1) == Some(quote) => {
                            value.push(quote);
                            self.pos += 2;
                        }
                        Some(c) if c == quote => {
                            self.pos += 1;
                            break;
                        }
                        Some(c) => {
                            value.push(c);
                            self.pos += 1;
                        }
                    }
                }
            }
            _ => {
                while let Some(c) = self.current() {
                    if c == '>' || c.is_whitespace() || self.at_self_close() {
                        break;
                    }
                    value.push(c);
                    self.pos += 1;
                }
            }
        }

        Ok(value)
    }
}

fn non_empty(attributes: Attributes) -> Option<Attributes> {
    if attributes.is_empty() {
        None
    } else {
        Some(attributes)
    }
}

/// Drops formatting-only text from every element whose children are more
/// than one node and whose text children are all whitespace.
fn collapse_whitespace(element: &mut Element) {
    let children = element.children();
    let formatting_only = children.len() > 1
        && children.iter().any(Node::is_text)
        && children
            .iter()
            .all(|child| child.is_element() || child.is_whitespace());
    if formatting_only {
        log::debug!(
            "dropping whitespace text among {} children of `{}`",
            children.len(),
            element.tag()
        );
        element.children_mut().retain(Node::is_element);
    }

    for child in element.children_mut() {
        if let Node::Element(e) = child {
            collapse_whitespace(e);
        }
    }
}
