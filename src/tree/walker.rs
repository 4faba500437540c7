// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Recursive descent shared by every transformation.
//!
//! The walker owns the traversal (order, depth accounting) and a
//! [`Visitor`] owns the per-node behaviour.  Children are transformed first
//! and handed to the visitor in their original order, so a visitor only
//! ever assembles already-converted pieces.

use super::{Node, Scalar};
use crate::error::{ObfuscateError, Result};

/// Container levels allowed below the root before the walk is abandoned.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Per-node behaviour plugged into [`Walker::walk`].
pub trait Visitor {
    type Output;

    fn on_mapping(&mut self, entries: Vec<(String, Self::Output)>) -> Result<Self::Output>;

    fn on_sequence(&mut self, items: Vec<Self::Output>) -> Result<Self::Output>;

    fn on_scalar(&mut self, value: &Scalar) -> Result<Self::Output>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Walker {
    max_depth: usize,
}

impl Default for Walker {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Walker {
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Walk `node`, returning whatever the visitor builds for the root.
    /// The input is never modified.
    pub fn walk<V>(&self, node: &Node, visitor: &mut V) -> Result<V::Output>
    where
        V: Visitor + ?Sized,
    {
        self.descend(node, visitor, 0)
    }

    fn descend<V>(&self, node: &Node, visitor: &mut V, depth: usize) -> Result<V::Output>
    where
        V: Visitor + ?Sized,
    {
        if depth > self.max_depth {
            return Err(ObfuscateError::RecursionLimitExceeded {
                limit: self.max_depth,
            });
        }

        match node {
            Node::Mapping(entries) => {
                let mut out = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    out.push((key.clone(), self.descend(value, visitor, depth + 1)?));
                }
                visitor.on_mapping(out)
            }
            Node::Sequence(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.descend(item, visitor, depth + 1)?);
                }
                visitor.on_sequence(out)
            }
            Node::Scalar(value) => visitor.on_scalar(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Flattens a tree into an s-expression so order and nesting are visible.
    struct Sexpr;

    impl Visitor for Sexpr {
        type Output = String;

        fn on_mapping(&mut self, entries: Vec<(String, String)>) -> Result<String> {
            let parts: Vec<String> = entries.into_iter().map(|(k, v)| format!("{k}={v}")).collect();
            Ok(format!("{{{}}}", parts.join(",")))
        }

        fn on_sequence(&mut self, items: Vec<String>) -> Result<String> {
            Ok(format!("[{}]", items.join(",")))
        }

        fn on_scalar(&mut self, value: &Scalar) -> Result<String> {
            Ok(value.render())
        }
    }

    fn nested(depth: usize) -> Node {
        let mut node = Node::string("leaf");
        for _ in 0..depth {
            node = Node::Sequence(vec![node]);
        }
        node
    }

    #[test]
    fn preserves_entry_and_item_order() {
        let tree = Node::Mapping(vec![
            ("b".to_string(), Node::string("1")),
            (
                "a".to_string(),
                Node::Sequence(vec![Node::string("x"), Node::Scalar(Scalar::Null)]),
            ),
        ]);
        let out = Walker::default().walk(&tree, &mut Sexpr).unwrap();
        assert_eq!(out, "{b=1,a=[x,]}");
    }

    #[test]
    fn scalar_root_goes_straight_to_visitor() {
        let out = Walker::default()
            .walk(&Node::Scalar(Scalar::Bool(true)), &mut Sexpr)
            .unwrap();
        assert_eq!(out, "true");
    }

    #[test]
    fn depth_at_limit_is_accepted() {
        let walker = Walker::with_max_depth(3);
        assert_eq!(walker.walk(&nested(3), &mut Sexpr).unwrap(), "[[[leaf]]]");
    }

    #[test]
    fn depth_past_limit_fails_closed() {
        let walker = Walker::with_max_depth(3);
        let err = walker.walk(&nested(4), &mut Sexpr).unwrap_err();
        assert!(matches!(
            err,
            ObfuscateError::RecursionLimitExceeded { limit: 3 }
        ));
    }

    #[test]
    fn default_limit_stops_pathological_depth() {
        let err = Walker::default()
            .walk(&nested(DEFAULT_MAX_DEPTH + 50), &mut Sexpr)
            .unwrap_err();
        assert!(matches!(err, ObfuscateError::RecursionLimitExceeded { .. }));
    }
}
