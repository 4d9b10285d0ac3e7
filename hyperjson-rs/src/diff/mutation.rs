//! Mutation script types.
//!
//! A script is an ordered list of mutations. Each one addresses its target by
//! a path relative to the root both trees were diffed from, and sibling
//! references inside a children mutation are single segments relative to that
//! target.

use std::fmt;

use crate::node::{AttrValue, Node};

use super::path::{Addressing, Path, Segment};

/// A single change to a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "kind", rename_all = "snake_case")
)]
pub enum Mutation {
    /// Set (`value` is `Some`) or remove (`value` is `None`) an attribute of
    /// the element at `target`.
    Attribute {
        target: Path,
        name: String,
        value: Option<AttrValue>,
        previous: Option<AttrValue>,
    },
    /// Replace the content of the text node at `target`.
    Text {
        target: Path,
        value: String,
        previous: String,
    },
    /// Restructure the children of the element at `target`.
    ///
    /// Applied in three passes: every removal, then every move, then every
    /// insertion. Each segment resolves against the children as left by the
    /// entries before it.
    Children {
        target: Path,
        removed: Vec<Segment>,
        moved: Vec<Move>,
        inserted: Vec<Insertion>,
    },
}

impl Mutation {
    /// Returns the path this mutation addresses.
    pub fn target(&self) -> &Path {
        match self {
            Mutation::Attribute { target, .. }
            | Mutation::Text { target, .. }
            | Mutation::Children { target, .. } => target,
        }
    }

    /// Iterates over every segment this mutation carries: the target path,
    /// then any sibling references.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        let siblings: Vec<&Segment> = match self {
            Mutation::Children {
                removed,
                moved,
                inserted,
                ..
            } => removed
                .iter()
                .chain(moved.iter().flat_map(|m| std::iter::once(&m.target).chain(&m.before)))
                .chain(inserted.iter().filter_map(|i| i.before.as_ref()))
                .collect(),
            Mutation::Attribute { .. } | Mutation::Text { .. } => Vec::new(),
        };
        self.target().segments().iter().chain(siblings)
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::Attribute {
                target,
                name,
                value: Some(value),
                ..
            } => match value.as_str() {
                Some(v) => write!(f, "set @{}=\"{}\" on /{}", name, v, target),
                None => write!(f, "set @{} on /{}", name, target),
            },
            Mutation::Attribute {
                target,
                name,
                value: None,
                ..
            } => write!(f, "remove @{} on /{}", name, target),
            Mutation::Text { target, value, .. } => {
                write!(f, "text /{} = {:?}", target, value)
            }
            Mutation::Children {
                target,
                removed,
                moved,
                inserted,
            } => write!(
                f,
                "children /{}: -{} ~{} +{}",
                target,
                removed.len(),
                moved.len(),
                inserted.len()
            ),
        }
    }
}

/// Relocates an existing child.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Move {
    /// The child to move.
    pub target: Segment,
    /// The sibling to place it before, or `None` to append.
    ///
    /// Resolved before the child is detached.
    pub before: Option<Segment>,
}

/// Adds a new child.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Insertion {
    /// The sibling to insert before, or `None` to append.
    pub before: Option<Segment>,
    /// The subtree to insert.
    pub value: Node,
}

/// An ordered list of mutations turning one tree into another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Script {
    addressing: Addressing,
    mutations: Vec<Mutation>,
}

impl Script {
    /// Creates a script from mutations addressed in the given form.
    pub fn new(addressing: Addressing, mutations: Vec<Mutation>) -> Self {
        Script {
            addressing,
            mutations,
        }
    }

    /// Returns the segment form the paths in this script use.
    pub fn addressing(&self) -> Addressing {
        self.addressing
    }

    /// Returns the mutations in application order.
    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    /// Returns an iterator over the mutations.
    pub fn iter(&self) -> std::slice::Iter<'_, Mutation> {
        self.mutations.iter()
    }

    /// Returns the number of mutations.
    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    /// Returns true if the script changes nothing.
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Consumes the script, returning its mutations.
    pub fn into_mutations(self) -> Vec<Mutation> {
        self.mutations
    }
}

impl<'a> IntoIterator for &'a Script {
    type Item = &'a Mutation;
    type IntoIter = std::slice::Iter<'a, Mutation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for Script {
    type Item = Mutation;
    type IntoIter = std::vec::IntoIter<Mutation>;

    fn into_iter(self) -> Self::IntoIter {
        self.mutations.into_iter()
    }
}
