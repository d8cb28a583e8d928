/*
Rendering of query trees as `termtree` trees.

Kept behind a trait so other tree shapes can be rendered the same way.
 */
use itertools::Itertools;
use termtree::Tree;
use tracing::instrument;

use crate::domain::QueryNode;

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for QueryNode {
    #[instrument(level = "trace", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        // The root label lists the alternative restrictions of the node
        let root = if self.restrictions.is_empty() {
            "_".to_string()
        } else {
            self.restrictions.iter().join(" | ")
        };

        let leaves: Vec<_> = self.children().iter().map(|c| c.to_tree_string()).collect();

        Tree::new(root).with_leaves(leaves)
    }
}
