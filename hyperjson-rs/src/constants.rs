//! Constants used throughout hyperjson.
//!
//! Sentinel tag names, the void tag set and the tokens used when naming
//! siblings for identity matching and path addressing.

/// Tag name of the synthetic element returned by the parser, holding the
/// top-level nodes of a document.
pub const DOCUMENT_TAG: &str = "#document";

/// Tag name of an element representing a comment. Its single text child is
/// the comment body.
pub const COMMENT_TAG: &str = "#comment";

/// Marker that starts a sentinel tag name (`#comment`, `#document`).
pub const SENTINEL_PREFIX: char = '#';

/// Identifier shared by every text node.
pub const TEXT_IDENTIFIER: &str = "#text";

/// Path step name of a text node.
pub const TEXT_STEP: &str = "text()";

/// Separator between path segments in the textual path form.
pub const PATH_SEPARATOR: char = '/';

/// Attribute consulted first when deriving an element's identifier.
pub const ID_ATTR: &str = "id";

/// Attribute consulted when no `id` is present.
pub const DATA_ID_ATTR: &str = "data-id";

/// Element names that never receive children.
pub const VOID_TAGS: [&str; 16] = [
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link",
    "meta", "param", "source", "track", "wbr",
];

/// Returns true if `tag` names a void element (ASCII case-insensitive).
pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.iter().any(|void| void.eq_ignore_ascii_case(tag))
}

/// Returns true if `tag` is a declaration-like name (`!DOCTYPE`, `?xml`).
pub fn is_declaration_tag(tag: &str) -> bool {
    tag.starts_with('!') || tag.starts_with('?')
}
