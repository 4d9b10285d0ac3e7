//! Diff generation algorithm.
//!
//! Produces a mutation script that turns one tree into another. Children are
//! matched by identifier, so a node keeps its identity (and only its own
//! changes are recorded) when siblings are added, removed or reordered.
//!
//! Per level the engine simulates the patch on a working copy of the old
//! children, in the same three passes the patch uses: removals right to left,
//! then moves of the nodes outside a longest increasing run, then insertions
//! left to right. Every segment is computed against the working copy at the
//! moment the patch will resolve it.

use bitflags::bitflags;
use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::node::{Element, Node};

use super::identity::{identifiers, Identifier};
use super::mutation::{Insertion, Move, Mutation, Script};
use super::path::{Addressing, Path, Segment};

bitflags! {
    /// Options controlling how scripts are generated.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct DiffOptions: u8 {
        /// Emit plain child indices instead of `tag[n]` segments.
        const COMPACT_ADDRESSING = 1;
        /// Key whitespace-only text by its length, so runs of different
        /// length are not paired with each other.
        const WHITESPACE_RUNS = 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Original,
    Inserted,
}

/// A child in the working copy of one level.
struct Slot<'a> {
    id: Identifier,
    node: &'a Node,
    origin: Origin,
}

/// Diff generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Diff {
    options: DiffOptions,
}

impl Diff {
    /// Creates a new diff generator.
    pub fn new(options: DiffOptions) -> Self {
        Diff { options }
    }

    /// Returns the segment form emitted scripts use.
    pub fn addressing(&self) -> Addressing {
        if self.options.contains(DiffOptions::COMPACT_ADDRESSING) {
            Addressing::Compact
        } else {
            Addressing::Symbolic
        }
    }

    /// Computes the script turning `old` into `new`.
    ///
    /// The two roots are assumed to be the same logical node; their tags are
    /// not compared. Paths are relative to them.
    pub fn diff(&self, old: &Element, new: &Element) -> Script {
        let mut mutations = Vec::new();
        self.diff_element(&Path::root(), old, new, &mut mutations);
        debug!("diff produced {} mutation(s)", mutations.len());
        Script::new(self.addressing(), mutations)
    }

    fn diff_element(&self, target: &Path, old: &Element, new: &Element, out: &mut Vec<Mutation>) {
        diff_attributes(target, old, new, out);
        self.diff_children(target, old.children(), new.children(), out);
    }

    fn diff_children(&self, target: &Path, old: &[Node], new: &[Node], out: &mut Vec<Mutation>) {
        let whitespace_runs = self.options.contains(DiffOptions::WHITESPACE_RUNS);
        let new_ids = identifiers(new, whitespace_runs);

        let mut working: Vec<Slot<'_>> = identifiers(old, whitespace_runs)
            .into_iter()
            .zip(old)
            .map(|(id, node)| Slot {
                id,
                node,
                origin: Origin::Original,
            })
            .collect();

        let removed = self.remove_stale(&mut working, &new_ids);
        let moved = self.reorder(&mut working, &new_ids);
        let inserted = self.insert_missing(&mut working, &new_ids, new);

        if !(removed.is_empty() && moved.is_empty() && inserted.is_empty()) {
            debug!(
                "/{}: {} removed, {} moved, {} inserted",
                target,
                removed.len(),
                moved.len(),
                inserted.len()
            );
            out.push(Mutation::Children {
                target: target.clone(),
                removed,
                moved,
                inserted,
            });
        }

        // The working copy now lines up with `new` position by position.
        for (index, (slot, after)) in working.iter().zip(new).enumerate() {
            if slot.origin != Origin::Original {
                continue;
            }
            match (slot.node, after) {
                (Node::Text(before), Node::Text(text)) if before != text => {
                    out.push(Mutation::Text {
                        target: target.child(Segment::for_position(new, index, self.addressing())),
                        value: text.clone(),
                        previous: before.clone(),
                    });
                }
                (Node::Element(before), Node::Element(element)) => {
                    let path = target.child(Segment::for_position(new, index, self.addressing()));
                    self.diff_element(&path, before, element, out);
                }
                _ => {}
            }
        }
    }

    /// Drops children with no counterpart in `new_ids`, right to left.
    fn remove_stale(&self, working: &mut Vec<Slot<'_>>, new_ids: &[Identifier]) -> Vec<Segment> {
        let wanted: FxHashSet<&Identifier> = new_ids.iter().collect();
        let mut removed = Vec::new();
        for index in (0..working.len()).rev() {
            if !wanted.contains(&working[index].id) {
                removed.push(self.segment(working, index));
                working.remove(index);
            }
        }
        removed
    }

    /// Puts the surviving children into the order of `new_ids` with as few
    /// moves as possible.
    fn reorder(&self, working: &mut Vec<Slot<'_>>, new_ids: &[Identifier]) -> Vec<Move> {
        let current: FxHashMap<&Identifier, usize> = working
            .iter()
            .enumerate()
            .map(|(index, slot)| (&slot.id, index))
            .collect();
        let shared: Vec<Identifier> = new_ids
            .iter()
            .filter(|id| current.contains_key(id))
            .cloned()
            .collect();
        let order: Vec<usize> = shared.iter().filter_map(|id| current.get(id).copied()).collect();
        let keep = longest_increasing(&order);

        let mut moved = Vec::new();
        for j in (0..shared.len()).rev() {
            if keep[j] {
                continue;
            }
            let Some(from) = position_of(working, &shared[j]) else {
                continue;
            };
            let anchor = shared.get(j + 1).and_then(|id| position_of(working, id));
            moved.push(Move {
                target: self.segment(working, from),
                before: anchor.map(|a| self.segment(working, a)),
            });

            let slot = working.remove(from);
            match anchor {
                Some(a) if from < a => working.insert(a - 1, slot),
                Some(a) => working.insert(a, slot),
                None => working.push(slot),
            }
        }
        moved
    }

    /// Inserts the children of `new` with no counterpart yet, left to right.
    fn insert_missing<'a>(
        &self,
        working: &mut Vec<Slot<'a>>,
        new_ids: &[Identifier],
        new: &'a [Node],
    ) -> Vec<Insertion> {
        let present: FxHashSet<Identifier> = working.iter().map(|slot| slot.id.clone()).collect();
        let mut inserted = Vec::new();
        for (index, (id, node)) in new_ids.iter().zip(new).enumerate() {
            if present.contains(id) {
                continue;
            }
            inserted.push(Insertion {
                before: (index < working.len()).then(|| self.segment(working, index)),
                value: node.clone(),
            });
            working.insert(
                index,
                Slot {
                    id: id.clone(),
                    node,
                    origin: Origin::Inserted,
                },
            );
        }
        inserted
    }

    fn segment(&self, working: &[Slot<'_>], index: usize) -> Segment {
        Segment::for_position(working.iter().map(|slot| slot.node), index, self.addressing())
    }
}

fn position_of(working: &[Slot<'_>], id: &Identifier) -> Option<usize> {
    working.iter().position(|slot| &slot.id == id)
}

/// Emits attribute mutations for every name whose value differs, old names
/// first, then names only `new` has.
fn diff_attributes(target: &Path, old: &Element, new: &Element, out: &mut Vec<Mutation>) {
    let added = new
        .attribute_names()
        .filter(|name| old.attribute(name).is_none());
    for name in old.attribute_names().chain(added) {
        let previous = old.attribute(name);
        let value = new.attribute(name);
        if previous != value {
            out.push(Mutation::Attribute {
                target: target.clone(),
                name: name.to_string(),
                value: value.cloned(),
                previous: previous.cloned(),
            });
        }
    }
}

/// Marks the members of one longest strictly increasing subsequence.
fn longest_increasing(seq: &[usize]) -> Vec<bool> {
    // tails[k] is the index of the smallest tail of an increasing run of length k + 1
    let mut tails: Vec<usize> = Vec::new();
    let mut prev: Vec<Option<usize>> = vec![None; seq.len()];

    for (i, &value) in seq.iter().enumerate() {
        let k = tails.partition_point(|&t| seq[t] < value);
        if k > 0 {
            prev[i] = Some(tails[k - 1]);
        }
        if k == tails.len() {
            tails.push(i);
        } else {
            tails[k] = i;
        }
    }

    let mut keep = vec![false; seq.len()];
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        keep[i] = true;
        cursor = prev[i];
    }
    keep
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::AttrValue;

    fn div(id: &str) -> Node {
        Node::from(Element::new("div").with_attribute("id", id))
    }

    fn root(children: Vec<Node>) -> Element {
        children
            .into_iter()
            .fold(Element::new("#document"), |parent, child| parent.with_child(child))
    }

    #[test]
    fn test_longest_increasing() {
        assert_eq!(longest_increasing(&[]), Vec::<bool>::new());
        assert_eq!(longest_increasing(&[0, 1, 2]), [true, true, true]);
        assert_eq!(longest_increasing(&[2, 0, 1]), [false, true, true]);
        assert_eq!(
            longest_increasing(&[3, 0, 4, 1, 2]),
            [false, true, false, true, true]
        );
    }

    #[test]
    fn test_identical_trees_produce_empty_script() {
        let tree = root(vec![
            Node::from(Element::new("p").with_attribute("class", "a").with_child("x")),
            Node::comment("c"),
        ]);
        assert!(Diff::default().diff(&tree, &tree).is_empty());
    }

    #[test]
    fn test_attribute_changes() {
        let old = Element::new("a")
            .with_attribute("href", "/x")
            .with_flag("hidden");
        let new = Element::new("a")
            .with_attribute("href", "/y")
            .with_attribute("title", "t");
        let script = Diff::default().diff(&old, &new);

        assert_eq!(
            script.mutations(),
            &[
                Mutation::Attribute {
                    target: Path::root(),
                    name: "href".to_string(),
                    value: Some(AttrValue::from("/y")),
                    previous: Some(AttrValue::from("/x")),
                },
                Mutation::Attribute {
                    target: Path::root(),
                    name: "hidden".to_string(),
                    value: None,
                    previous: Some(AttrValue::Valueless),
                },
                Mutation::Attribute {
                    target: Path::root(),
                    name: "title".to_string(),
                    value: Some(AttrValue::from("t")),
                    previous: None,
                },
            ]
        );
    }

    #[test]
    fn test_swap_is_a_single_move() {
        let old = root(vec![div("a"), div("b")]);
        let new = root(vec![div("b"), div("a")]);
        let script = Diff::default().diff(&old, &new);

        assert_eq!(
            script.mutations(),
            &[Mutation::Children {
                target: Path::root(),
                removed: vec![],
                moved: vec![Move {
                    target: Segment::named("div", 2),
                    before: Some(Segment::named("div", 1)),
                }],
                inserted: vec![],
            }]
        );
    }

    #[test]
    fn test_rotation_moves_only_one_node() {
        let old = root(vec![div("a"), div("b"), div("c"), div("d")]);
        let new = root(vec![div("d"), div("a"), div("b"), div("c")]);
        let script = Diff::new(DiffOptions::COMPACT_ADDRESSING).diff(&old, &new);

        let Mutation::Children { moved, .. } = &script.mutations()[0] else {
            panic!("expected a children mutation");
        };
        assert_eq!(
            moved,
            &[Move {
                target: Segment::Index(3),
                before: Some(Segment::Index(0)),
            }]
        );
    }

    #[test]
    fn test_removals_right_to_left() {
        let old = root(vec![Node::text("x"), div("a"), Node::text("y"), div("b")]);
        let new = root(vec![Node::text("x")]);
        let script = Diff::default().diff(&old, &new);

        let Mutation::Children { removed, .. } = &script.mutations()[0] else {
            panic!("expected a children mutation");
        };
        assert_eq!(
            removed,
            &[
                Segment::named("div", 2),
                Segment::named("text()", 2),
                Segment::named("div", 1),
            ]
        );
    }

    #[test]
    fn test_insertions_left_to_right() {
        let old = root(vec![div("b")]);
        let new = root(vec![div("a"), div("b"), div("c")]);
        let script = Diff::new(DiffOptions::COMPACT_ADDRESSING).diff(&old, &new);

        let Mutation::Children { inserted, .. } = &script.mutations()[0] else {
            panic!("expected a children mutation");
        };
        assert_eq!(inserted.len(), 2);
        assert_eq!(inserted[0].before, Some(Segment::Index(0)));
        assert_eq!(inserted[0].value, div("a"));
        assert_eq!(inserted[1].before, None);
        assert_eq!(inserted[1].value, div("c"));
    }

    #[test]
    fn test_identity_survives_reordering() {
        let old = root(vec![
            Node::from(Element::new("div").with_attribute("id", "a").with_child("one")),
            div("b"),
        ]);
        let new = root(vec![
            div("b"),
            Node::from(Element::new("div").with_attribute("id", "a").with_child("uno")),
        ]);
        let script = Diff::default().diff(&old, &new);

        assert_eq!(script.len(), 2);
        assert!(matches!(script.mutations()[0], Mutation::Children { .. }));
        assert_eq!(
            script.mutations()[1],
            Mutation::Text {
                target: "div[2]/text()[1]".parse().unwrap(),
                value: "uno".to_string(),
                previous: "one".to_string(),
            }
        );
    }

    #[test]
    fn test_whitespace_runs_option() {
        let old = root(vec![Node::text(" "), Node::text("x")]);
        let new = root(vec![Node::text("  "), Node::text("x")]);

        let plain = Diff::default().diff(&old, &new);
        assert!(matches!(plain.mutations()[0], Mutation::Text { .. }));

        let runs = Diff::new(DiffOptions::WHITESPACE_RUNS).diff(&old, &new);
        let Mutation::Children {
            removed, inserted, ..
        } = &runs.mutations()[0]
        else {
            panic!("expected a children mutation");
        };
        assert_eq!(removed.len(), 1);
        assert_eq!(inserted.len(), 1);
    }
}
