//! Sibling identity used to match children across two trees.
//!
//! Each child gets a key derived from what it is (text, comment, element
//! with an id, or tag plus attribute names) and a 1-based rank among siblings
//! with the same key, so that the n-th plain `div` on one side pairs with
//! the n-th plain `div` on the other.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::constants::TEXT_IDENTIFIER;
use crate::node::{Element, Node};

/// Identifier of a child among its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    key: String,
    rank: usize,
}

impl Identifier {
    /// Returns the key shared by all siblings considered the same kind of node.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the 1-based occurrence rank among siblings with the same key.
    pub fn rank(&self) -> usize {
        self.rank
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.key, self.rank)
    }
}

/// Computes identifiers for a child sequence.
///
/// With `whitespace_runs`, whitespace-only text is keyed by its length so it
/// only pairs with whitespace of the same length.
pub fn identifiers(nodes: &[Node], whitespace_runs: bool) -> Vec<Identifier> {
    let mut seen: FxHashMap<String, usize> = FxHashMap::default();
    nodes
        .iter()
        .map(|node| {
            let key = identity_key(node, whitespace_runs);
            let rank = seen.entry(key.clone()).or_insert(0);
            *rank += 1;
            Identifier { key, rank: *rank }
        })
        .collect()
}

fn identity_key(node: &Node, whitespace_runs: bool) -> String {
    match node {
        Node::Text(text) if whitespace_runs && node.is_whitespace() => {
            format!("{}:ws{}", TEXT_IDENTIFIER, text.chars().count())
        }
        Node::Text(_) => TEXT_IDENTIFIER.to_string(),
        Node::Element(element) => element_key(element),
    }
}

/// Element keys put a space between the tag and the rest. Neither tag nor
/// attribute names contain whitespace, so the keying attribute (and, for
/// name lists, each name) is unambiguous whatever the values hold.
fn element_key(element: &Element) -> String {
    if element.is_sentinel() {
        return element.tag().to_string();
    }
    if let Some((attr, value)) = element.stable_id() {
        return format!("{} {}={}", element.tag(), attr, value);
    }
    let mut names: Vec<&str> = element.attribute_names().collect();
    if names.is_empty() {
        return element.tag().to_string();
    }
    names.sort_unstable();
    format!("{} [{}]", element.tag(), names.join(" "))
}
