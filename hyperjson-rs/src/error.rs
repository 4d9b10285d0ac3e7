//! Error types for hyperjson.

use thiserror::Error;

/// Result type alias for hyperjson operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing markup or applying a mutation script.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The input ended inside a construct, or left tags open.
    #[error("malformed input at offset {offset}: {message}")]
    MalformedInput {
        /// Character offset where the offending construct started.
        offset: usize,
        /// What was left unterminated.
        message: String,
    },

    /// A mutation addresses a node that does not exist in the tree being patched.
    #[error("unresolvable address `{path}`: {message}")]
    UnresolvableAddress {
        /// Textual form of the path that failed to resolve.
        path: String,
        /// Why resolution failed.
        message: String,
    },

    /// A textual path or segment could not be parsed.
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

impl Error {
    pub(crate) fn malformed(offset: usize, message: impl Into<String>) -> Self {
        Error::MalformedInput {
            offset,
            message: message.into(),
        }
    }

    pub(crate) fn unresolvable(path: impl ToString, message: impl Into<String>) -> Self {
        Error::UnresolvableAddress {
            path: path.to_string(),
            message: message.into(),
        }
    }
}
