//! Patch application algorithm.
//!
//! Applies a mutation script to a copy of a base tree. Every path is resolved
//! against the copy as it stands when the mutation is reached, so the script
//! must be applied in order.

use log::trace;

use crate::error::{Error, Result};
use crate::node::{Element, Node};

use super::mutation::{Insertion, Move, Mutation, Script};
use super::path::{Addressing, Path, Segment};

/// Patch applicator for mutation scripts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Patch {
    _placeholder: (),
}

impl Patch {
    /// Creates a new patch applicator.
    pub fn new() -> Self {
        Patch { _placeholder: () }
    }

    /// Applies `script` to a copy of `base` and returns the copy.
    ///
    /// `base` is left untouched. Fails with [`Error::UnresolvableAddress`]
    /// if any path does not resolve against the tree being patched, and with
    /// [`Error::InvalidPath`] if a segment is not of the script's addressing
    /// form.
    pub fn apply(&self, base: &Element, script: &Script) -> Result<Element> {
        let mut root = base.clone();
        for mutation in script {
            check_addressing(script.addressing(), mutation)?;
            trace!("apply {}", mutation);
            self.apply_mutation(&mut root, mutation)?;
        }
        Ok(root)
    }

    fn apply_mutation(&self, root: &mut Element, mutation: &Mutation) -> Result<()> {
        match mutation {
            Mutation::Attribute {
                target,
                name,
                value,
                ..
            } => {
                let element = resolve_element_mut(root, target)?;
                match value {
                    Some(value) => element.set_attribute(name.clone(), value.clone()),
                    None => {
                        element.remove_attribute(name);
                    }
                }
                Ok(())
            }
            Mutation::Text { target, value, .. } => {
                let (parent, last) = target
                    .split_last()
                    .ok_or_else(|| Error::unresolvable(target, "the root is not a text node"))?;
                let parent = resolve_segments_mut(root, parent, target)?;
                let index = last
                    .locate(parent.children())
                    .ok_or_else(|| Error::unresolvable(target, "no such text node"))?;
                match &mut parent.children_mut()[index] {
                    Node::Text(text) => {
                        *text = value.clone();
                        Ok(())
                    }
                    Node::Element(_) => Err(Error::unresolvable(target, "expected a text node")),
                }
            }
            Mutation::Children {
                target,
                removed,
                moved,
                inserted,
            } => {
                let element = resolve_element_mut(root, target)?;
                remove_children(element, target, removed)?;
                move_children(element, target, moved)?;
                insert_children(element, target, inserted)
            }
        }
    }
}

/// Rejects a mutation carrying a segment of the other addressing form.
fn check_addressing(addressing: Addressing, mutation: &Mutation) -> Result<()> {
    match mutation.segments().find(|s| s.addressing() != addressing) {
        Some(segment) => Err(Error::InvalidPath(format!(
            "`{}` in a {:?} script, at `{}`",
            segment,
            addressing,
            mutation.target()
        ))),
        None => Ok(()),
    }
}

/// Walks `path` from `root` down to an element.
fn resolve_element_mut<'a>(root: &'a mut Element, path: &Path) -> Result<&'a mut Element> {
    resolve_segments_mut(root, path.segments(), path)
}

fn resolve_segments_mut<'a>(
    root: &'a mut Element,
    segments: &[Segment],
    path: &Path,
) -> Result<&'a mut Element> {
    let mut current = root;
    for segment in segments {
        let index = segment.locate(current.children()).ok_or_else(|| {
            Error::unresolvable(path, format!("no child matches `{}`", segment))
        })?;
        current = current.children_mut()[index]
            .as_element_mut()
            .ok_or_else(|| {
                Error::unresolvable(path, format!("`{}` is not an element", segment))
            })?;
    }
    Ok(current)
}

fn locate_child(element: &Element, segment: &Segment, target: &Path) -> Result<usize> {
    segment.locate(element.children()).ok_or_else(|| {
        Error::unresolvable(
            target.child(segment.clone()),
            format!("no child matches `{}`", segment),
        )
    })
}

fn remove_children(element: &mut Element, target: &Path, removed: &[Segment]) -> Result<()> {
    for segment in removed {
        let index = locate_child(element, segment, target)?;
        element.children_mut().remove(index);
    }
    Ok(())
}

fn move_children(element: &mut Element, target: &Path, moved: &[Move]) -> Result<()> {
    for Move { target: child, before } in moved {
        let from = locate_child(element, child, target)?;
        let anchor = match before {
            Some(anchor) => locate_child(element, anchor, target)?,
            None => element.children().len(),
        };
        let node = element.children_mut().remove(from);
        // detaching shifts every later sibling down by one
        let to = if from < anchor { anchor - 1 } else { anchor };
        element.children_mut().insert(to, node);
    }
    Ok(())
}

fn insert_children(element: &mut Element, target: &Path, inserted: &[Insertion]) -> Result<()> {
    for Insertion { before, value } in inserted {
        let index = match before {
            Some(anchor) => locate_child(element, anchor, target)?,
            None => element.children().len(),
        };
        element.children_mut().insert(index, value.clone());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::AttrValue;

    fn list() -> Element {
        Element::new("ul")
            .with_child(Element::new("li").with_child("a"))
            .with_child(Element::new("li").with_child("b"))
            .with_child(Element::new("li").with_child("c"))
    }

    fn script(mutations: Vec<Mutation>) -> Script {
        Script::new(Addressing::Symbolic, mutations)
    }

    #[test]
    fn test_patch_new() {
        let base = list();
        let patched = Patch::new().apply(&base, &Script::default()).unwrap();
        assert_eq!(patched, base);
    }

    #[test]
    fn test_base_is_not_mutated() {
        let base = list();
        let patch = script(vec![Mutation::Attribute {
            target: Path::root(),
            name: "class".to_string(),
            value: Some(AttrValue::from("menu")),
            previous: None,
        }]);
        let patched = Patch::new().apply(&base, &patch).unwrap();
        assert_eq!(patched.attribute("class"), Some(&AttrValue::from("menu")));
        assert!(base.attributes().is_none());
    }

    #[test]
    fn test_text_mutation() {
        let patch = script(vec![Mutation::Text {
            target: "li[2]/text()[1]".parse().unwrap(),
            value: "B".to_string(),
            previous: "b".to_string(),
        }]);
        let patched = Patch::new().apply(&list(), &patch).unwrap();
        assert_eq!(patched.children()[1].as_element().unwrap().text_content(), "B");
    }

    #[test]
    fn test_text_mutation_on_element_fails() {
        let patch = script(vec![Mutation::Text {
            target: "li[2]".parse().unwrap(),
            value: "B".to_string(),
            previous: String::new(),
        }]);
        let err = Patch::new().apply(&list(), &patch).unwrap_err();
        assert!(matches!(err, Error::UnresolvableAddress { .. }));
    }

    #[test]
    fn test_remove_last_attribute() {
        let base = Element::new("p").with_attribute("class", "x");
        let patch = script(vec![Mutation::Attribute {
            target: Path::root(),
            name: "class".to_string(),
            value: None,
            previous: Some(AttrValue::from("x")),
        }]);
        let patched = Patch::new().apply(&base, &patch).unwrap();
        assert_eq!(patched, Element::new("p"));
    }

    #[test]
    fn test_move_adjusts_for_detached_node() {
        let patch = Script::new(
            Addressing::Compact,
            vec![Mutation::Children {
                target: Path::root(),
                removed: vec![],
                moved: vec![Move {
                    target: Segment::Index(0),
                    before: Some(Segment::Index(2)),
                }],
                inserted: vec![],
            }],
        );
        let patched = Patch::new().apply(&list(), &patch).unwrap();
        let texts: Vec<String> = patched
            .children()
            .iter()
            .filter_map(Node::as_element)
            .map(Element::text_content)
            .collect();
        assert_eq!(texts, ["b", "a", "c"]);
    }

    #[test]
    fn test_children_passes_in_order() {
        let patch = script(vec![Mutation::Children {
            target: Path::root(),
            removed: vec![Segment::named("li", 2)],
            moved: vec![Move {
                target: Segment::named("li", 2),
                before: Some(Segment::named("li", 1)),
            }],
            inserted: vec![Insertion {
                before: None,
                value: Node::from(Element::new("li").with_child("d")),
            }],
        }]);
        let patched = Patch::new().apply(&list(), &patch).unwrap();
        let texts: Vec<String> = patched
            .children()
            .iter()
            .filter_map(Node::as_element)
            .map(Element::text_content)
            .collect();
        assert_eq!(texts, ["c", "a", "d"]);
    }

    #[test]
    fn test_unresolvable_addresses() {
        let missing_target = script(vec![Mutation::Attribute {
            target: "li[4]".parse().unwrap(),
            name: "x".to_string(),
            value: None,
            previous: None,
        }]);
        let err = Patch::new().apply(&list(), &missing_target).unwrap_err();
        assert_eq!(
            err,
            Error::UnresolvableAddress {
                path: "li[4]".to_string(),
                message: "no child matches `li[4]`".to_string(),
            }
        );

        let missing_anchor = script(vec![Mutation::Children {
            target: Path::root(),
            removed: vec![],
            moved: vec![],
            inserted: vec![Insertion {
                before: Some(Segment::named("p", 1)),
                value: Node::text("x"),
            }],
        }]);
        assert!(Patch::new().apply(&list(), &missing_anchor).is_err());

        let through_text = script(vec![Mutation::Children {
            target: "li[1]/text()[1]".parse().unwrap(),
            removed: vec![Segment::named("text()", 1)],
            moved: vec![],
            inserted: vec![],
        }]);
        assert!(matches!(
            Patch::new().apply(&list(), &through_text),
            Err(Error::UnresolvableAddress { .. })
        ));
    }

    #[test]
    fn test_unresolvable_move() {
        let moving = |target: Segment, before: Option<Segment>| {
            script(vec![Mutation::Children {
                target: Path::root(),
                removed: vec![],
                moved: vec![Move { target, before }],
                inserted: vec![],
            }])
        };

        let missing_target = moving(Segment::named("li", 4), Some(Segment::named("li", 1)));
        assert_eq!(
            Patch::new().apply(&list(), &missing_target).unwrap_err(),
            Error::UnresolvableAddress {
                path: "li[4]".to_string(),
                message: "no child matches `li[4]`".to_string(),
            }
        );

        let missing_anchor = moving(Segment::named("li", 1), Some(Segment::named("p", 1)));
        assert_eq!(
            Patch::new().apply(&list(), &missing_anchor).unwrap_err(),
            Error::UnresolvableAddress {
                path: "p[1]".to_string(),
                message: "no child matches `p[1]`".to_string(),
            }
        );
    }

    #[test]
    fn test_mixed_addressing_is_rejected() {
        let mixed = Script::new(
            Addressing::Symbolic,
            vec![Mutation::Children {
                target: "li[1]".parse().unwrap(),
                removed: vec![Segment::Index(0)],
                moved: vec![],
                inserted: vec![],
            }],
        );
        let err = Patch::new().apply(&list(), &mixed).unwrap_err();
        assert!(matches!(err, Error::InvalidPath(_)));

        let compact_target = Script::new(
            Addressing::Compact,
            vec![Mutation::Text {
                target: "li[1]/text()[1]".parse().unwrap(),
                value: "A".to_string(),
                previous: "a".to_string(),
            }],
        );
        assert!(matches!(
            Patch::new().apply(&list(), &compact_target),
            Err(Error::InvalidPath(_))
        ));
    }
}
