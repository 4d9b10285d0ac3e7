//! Path addressing of nodes relative to an ancestor.
//!
//! A path is a list of per-level segments. A symbolic segment names a child by
//! its step name and its 1-based rank among siblings with the same step name
//! (`div[2]`, `text()[1]`, `comment()[1]`). A compact segment is the plain
//! 0-based child index. Both resolve against the tree as it is at the moment
//! of resolution.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::constants::{PATH_SEPARATOR, SENTINEL_PREFIX, TEXT_STEP};
use crate::error::Error;
use crate::node::Node;

/// Which segment form a mutation script uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Addressing {
    /// `tag[n]` segments.
    #[default]
    Symbolic,
    /// Plain child indices.
    Compact,
}

/// Returns the name a node is addressed by in a symbolic segment.
///
/// Text is `text()`, sentinel elements drop their marker and gain `()`
/// (`#comment` becomes `comment()`), other elements use their tag.
pub fn step_name(node: &Node) -> Cow<'_, str> {
    match node {
        Node::Text(_) => Cow::Borrowed(TEXT_STEP),
        Node::Element(element) => match element.tag().strip_prefix(SENTINEL_PREFIX) {
            Some(name) => Cow::Owned(format!("{}()", name)),
            None => Cow::Borrowed(element.tag()),
        },
    }
}

/// One level of a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// The `nth` (1-based) sibling whose step name is `name`.
    Named { name: String, nth: usize },
    /// The child at a 0-based index.
    Index(usize),
}

impl Segment {
    /// Creates a symbolic segment.
    pub fn named(name: impl Into<String>, nth: usize) -> Self {
        Segment::Named {
            name: name.into(),
            nth,
        }
    }

    /// Names the sibling at `index` within `siblings`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn for_position<'n, I>(siblings: I, index: usize, addressing: Addressing) -> Segment
    where
        I: IntoIterator<Item = &'n Node>,
    {
        match addressing {
            Addressing::Compact => Segment::Index(index),
            Addressing::Symbolic => {
                let preceding: Vec<&Node> = siblings.into_iter().take(index + 1).collect();
                let name = step_name(preceding[index]);
                let nth = preceding
                    .iter()
                    .filter(|sibling| step_name(sibling) == name)
                    .count();
                Segment::named(name, nth)
            }
        }
    }

    /// Returns the addressing form this segment belongs to.
    pub fn addressing(&self) -> Addressing {
        match self {
            Segment::Named { .. } => Addressing::Symbolic,
            Segment::Index(_) => Addressing::Compact,
        }
    }

    /// Finds the index of the child this segment names.
    pub fn locate(&self, children: &[Node]) -> Option<usize> {
        match self {
            Segment::Index(index) => (*index < children.len()).then_some(*index),
            Segment::Named { name, nth } => children
                .iter()
                .enumerate()
                .filter(|(_, child)| step_name(child) == name.as_str())
                .nth(nth.checked_sub(1)?)
                .map(|(index, _)| index),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Named { name, nth } => write!(f, "{}[{}]", name, nth),
            Segment::Index(index) => write!(f, "{}", index),
        }
    }
}

impl FromStr for Segment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            return s
                .parse()
                .map(Segment::Index)
                .map_err(|_| Error::InvalidPath(format!("index out of range: {}", s)));
        }

        let invalid = || Error::InvalidPath(format!("expected `name[n]` or an index, got `{}`", s));
        let body = s.strip_suffix(']').ok_or_else(invalid)?;
        let open = body.rfind('[').ok_or_else(invalid)?;
        let (name, nth) = (&body[..open], &body[open + 1..]);
        let nth: usize = nth.parse().map_err(|_| invalid())?;
        if name.is_empty() || nth == 0 {
            return Err(invalid());
        }
        Ok(Segment::named(name, nth))
    }
}

/// A location relative to an ancestor. The empty path is the ancestor itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// The empty path.
    pub fn root() -> Self {
        Path::default()
    }

    /// Returns true for the empty path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the segments from the outermost level inward.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns this path extended by one level.
    pub fn child(&self, segment: Segment) -> Path {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Path { segments }
    }

    /// Splits off the last segment.
    pub fn split_last(&self) -> Option<(&[Segment], &Segment)> {
        self.segments
            .split_last()
            .map(|(last, parent)| (parent, last))
    }
}

impl From<Vec<Segment>> for Path {
    fn from(segments: Vec<Segment>) -> Self {
        Path { segments }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", PATH_SEPARATOR)?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Path::root());
        }
        s.split(PATH_SEPARATOR)
            .map(str::parse)
            .collect::<Result<Vec<Segment>, Error>>()
            .map(Path::from)
    }
}

#[cfg(feature = "serde")]
mod wire {
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    use super::{Path, Segment};

    impl Serialize for Segment {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Segment::Index(index) => serializer.serialize_u64(*index as u64),
                Segment::Named { .. } => serializer.collect_str(self),
            }
        }
    }

    impl<'de> Deserialize<'de> for Segment {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            #[derive(Deserialize)]
            #[serde(untagged)]
            enum Repr {
                Index(usize),
                Named(String),
            }

            match Repr::deserialize(deserializer)? {
                Repr::Index(index) => Ok(Segment::Index(index)),
                Repr::Named(text) => text.parse().map_err(de::Error::custom),
            }
        }
    }

    impl Serialize for Path {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            self.segments.serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for Path {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            Vec::<Segment>::deserialize(deserializer).map(Path::from)
        }
    }
}
