//! Default grow function: every way of adding one node to a tree

use std::convert::Infallible;
use std::iter;

use crate::domain::expand::Candidates;
use crate::domain::node::QueryNode;

/// Lazily yields every tree obtained by adding one empty node to `tree`.
///
/// Order: first the tree with a new last child on the root, then, child by
/// child, the tree with that child replaced by each of its own growths.
/// `tree` itself is left untouched.
pub fn tree_grow(tree: &QueryNode) -> Box<dyn Iterator<Item = QueryNode> + '_> {
    let extended = iter::once_with(move || {
        let mut grown = tree.clone();
        grown.add_child();
        grown
    });

    let nested = tree
        .children()
        .iter()
        .enumerate()
        .flat_map(move |(index, child)| {
            tree_grow(child).map(move |grown_child| {
                let mut grown = tree.clone();
                grown.children_mut()[index] = grown_child;
                grown
            })
        });

    Box::new(extended.chain(nested))
}

/// [`tree_grow`] as an infallible candidate source for the expander.
pub fn tree_candidates(tree: &QueryNode) -> Candidates<'_, QueryNode, Infallible> {
    Box::new(tree_grow(tree).map(Ok))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_leaf_when_growing_then_yields_single_child_tree() {
        let grown: Vec<_> = tree_grow(&QueryNode::leaf()).collect();

        assert_eq!(grown.len(), 1);
        assert_eq!(grown[0].to_string(), "_[_]");
    }

    #[test]
    fn given_two_children_when_growing_then_root_extension_comes_first() {
        let mut tree = QueryNode::leaf();
        tree.add_child();
        tree.add_child();

        let grown: Vec<String> = tree_grow(&tree).map(|t| t.to_string()).collect();

        assert_eq!(grown, vec!["_[_, _, _]", "_[_[_], _]", "_[_, _[_]]"]);
    }

    #[test]
    fn given_tree_grow_when_passed_to_expander_then_grows_lazily() {
        use crate::domain::expand_generations;

        let trees = expand_generations(2, vec![QueryNode::leaf()], |tree| {
            Box::new(tree_grow(tree).map(Ok::<_, Infallible>))
        })
        .unwrap();

        let rendered: Vec<String> = trees.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["_[_, _]", "_[_[_]]"]);
    }

    #[test]
    fn given_any_tree_when_growing_then_each_result_has_one_more_node() {
        let mut tree = QueryNode::leaf();
        tree.add_child();
        tree.children_mut()[0].add_child();
        tree.add_child();

        for grown in tree_grow(&tree) {
            assert_eq!(grown.size(), tree.size() + 1);
        }
        assert_eq!(tree.size(), 4);
    }
}
