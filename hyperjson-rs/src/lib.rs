//! hyperjson - markup trees, mutation scripts and patches
//!
//! This library parses HTML-like markup into a compact owned tree, computes
//! an ordered, path-addressed mutation script between two trees, and replays
//! such a script to reproduce the target tree from the source tree.
//!
//! # Overview
//!
//! - [`parse`] scans markup into a `#document` element holding the top-level
//!   nodes. Comments become `#comment` elements and void tags never receive
//!   children.
//! - [`diff`] matches children by identity (`id`, `data-id`, or tag plus
//!   attribute names, ranked among equal siblings) so a node that moves keeps
//!   its identity, and records attribute, text and child-list changes.
//! - [`patch`] applies a script to a copy of a tree, resolving each path
//!   against the partially patched copy.
//! - [`serialize`] is the inverse of [`parse`].
//!
//! # Example
//!
//! ```
//! use hyperjson::{diff, parse, patch, serialize, DiffOptions, ParseOptions};
//!
//! let old = parse(r#"<div class="dog">x</div><div>y</div>"#, ParseOptions::default())?;
//! let new = parse(
//!     r#"<div class="cat">x</div><div>z</div><div>new</div>"#,
//!     ParseOptions::default(),
//! )?;
//!
//! let script = diff(&old, &new, DiffOptions::empty());
//! assert_eq!(script.len(), 3);
//!
//! let patched = patch(&old, &script)?;
//! assert_eq!(patched, new);
//! assert_eq!(
//!     serialize(&patched),
//!     r#"<div class="cat">x</div><div>z</div><div>new</div>"#
//! );
//! # Ok::<(), hyperjson::Error>(())
//! ```

pub mod constants;
pub mod diff;
pub mod error;
pub mod html;
pub mod node;

// Re-export commonly used types
pub use diff::{
    Addressing, Diff, DiffOptions, Insertion, Move, Mutation, Patch, Path, Script, Segment,
};
pub use error::{Error, Result};
pub use html::{HtmlParser, HtmlPrinter, ParseOptions};
pub use node::{AttrValue, Attributes, Element, Node};

/// Parses markup into a `#document` element.
pub fn parse(html: &str, options: ParseOptions) -> Result<Element> {
    HtmlParser::new(options).parse_str(html)
}

/// Renders a tree back to markup.
pub fn serialize(root: &Element) -> String {
    root.to_string()
}

/// Computes the mutation script turning `old` into `new`.
pub fn diff(old: &Element, new: &Element, options: DiffOptions) -> Script {
    Diff::new(options).diff(old, new)
}

/// Applies `script` to a copy of `base`.
pub fn patch(base: &Element, script: &Script) -> Result<Element> {
    Patch::new().apply(base, script)
}
