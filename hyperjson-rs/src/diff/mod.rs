//! Diff and Patch algorithms for node trees.
//!
//! This module matches children across two trees by identifier, generates a
//! path-addressed mutation script from the matching, and applies such scripts
//! to reconstruct the target tree.

mod generator;
mod identity;
mod mutation;
mod patch;
mod path;

pub use generator::{Diff, DiffOptions};
pub use identity::{identifiers, Identifier};
pub use mutation::{Insertion, Move, Mutation, Script};
pub use patch::Patch;
pub use path::{step_name, Addressing, Path, Segment};
