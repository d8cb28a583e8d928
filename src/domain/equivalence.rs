//! Tree equivalence relations and their canonical forms

use serde::{Deserialize, Serialize};

use crate::domain::node::QueryNode;
use crate::domain::query::Restriction;

/// Which trees count as the same variant during deduplication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Equivalence {
    /// Deep structural equality; sibling order matters.
    #[default]
    Ordered,
    /// Equality up to reordering of siblings at every level.
    Unordered,
}

/// Hashable, totally ordered stand-in for a tree under an [`Equivalence`].
///
/// Two trees are equivalent iff their canonical forms are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalTree {
    restrictions: Vec<Restriction>,
    children: Option<Vec<CanonicalTree>>,
}

impl CanonicalTree {
    pub fn of(node: &QueryNode, equivalence: Equivalence) -> Self {
        let children = node.has_children_list().then(|| {
            let mut children: Vec<_> = node
                .children()
                .iter()
                .map(|child| CanonicalTree::of(child, equivalence))
                .collect();
            if equivalence == Equivalence::Unordered {
                children.sort();
            }
            children
        });
        Self {
            restrictions: node.restrictions.clone(),
            children,
        }
    }
}

impl Equivalence {
    pub fn canonical(self, node: &QueryNode) -> CanonicalTree {
        CanonicalTree::of(node, self)
    }

    pub fn equivalent(self, a: &QueryNode, b: &QueryNode) -> bool {
        match self {
            Equivalence::Ordered => a == b,
            Equivalence::Unordered => a.size() == b.size() && self.canonical(a) == self.canonical(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mirrored_pair() -> (QueryNode, QueryNode) {
        // _[_[_], _] and _[_, _[_]]
        let mut left = QueryNode::leaf();
        left.add_child();
        left.add_child();
        left.children_mut()[0].add_child();

        let mut right = QueryNode::leaf();
        right.add_child();
        right.add_child();
        right.children_mut()[1].add_child();
        (left, right)
    }

    #[test]
    fn given_mirrored_trees_when_ordered_then_not_equivalent() {
        let (left, right) = mirrored_pair();
        assert!(!Equivalence::Ordered.equivalent(&left, &right));
        assert_ne!(
            Equivalence::Ordered.canonical(&left),
            Equivalence::Ordered.canonical(&right)
        );
    }

    #[test]
    fn given_mirrored_trees_when_unordered_then_equivalent() {
        let (left, right) = mirrored_pair();
        assert!(Equivalence::Unordered.equivalent(&left, &right));
        assert_eq!(
            Equivalence::Unordered.canonical(&left),
            Equivalence::Unordered.canonical(&right)
        );
    }

    #[test]
    fn given_no_decoded_children_when_canonical_then_matches_plain_leaf() {
        let leaf = QueryNode::leaf();
        let empty = QueryNode::leaf().with_children(Vec::new());
        assert!(!empty.has_children_list());
        assert_eq!(
            Equivalence::Unordered.canonical(&leaf),
            Equivalence::Unordered.canonical(&empty)
        );
    }
}
