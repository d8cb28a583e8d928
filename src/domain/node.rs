//! Query tree data model, the tree mutator and the tree size calculator

use std::fmt;

use itertools::{Itertools, MinMaxResult};
use tracing::instrument;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::query::Restriction;

/// Node of a query tree. A root node stands for the whole tree.
///
/// `children` stays `None` until the first child is added; afterwards the
/// list is only ever appended to, never swapped for another list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QueryNode {
    /// Alternative restrictions on the matched token (OR semantics)
    pub restrictions: Vec<Restriction>,
    children: Option<Vec<QueryNode>>,
}

impl QueryNode {
    /// Unrestricted node without a children list.
    pub fn leaf() -> Self {
        Self::default()
    }

    pub fn with_restrictions(restrictions: Vec<Restriction>) -> Self {
        Self {
            restrictions,
            children: None,
        }
    }

    /// Appends decoded children after any existing ones.
    /// An empty vector leaves a childless node without a children list.
    pub fn with_children(mut self, children: Vec<QueryNode>) -> Self {
        if !children.is_empty() {
            self.children.get_or_insert_with(Vec::new).extend(children);
        }
        self
    }

    pub fn children(&self) -> &[QueryNode] {
        self.children.as_deref().unwrap_or_default()
    }

    /// Mutable access to existing children; the list itself cannot be replaced.
    pub fn children_mut(&mut self) -> &mut [QueryNode] {
        self.children.as_deref_mut().unwrap_or_default()
    }

    pub fn has_children_list(&self) -> bool {
        self.children.is_some()
    }

    pub fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }

    /// Appends one new, empty child, creating the children list on first use.
    #[instrument(level = "trace", skip(self))]
    pub fn add_child(&mut self) {
        self.children.get_or_insert_with(Vec::new).push(QueryNode::leaf());
    }

    /// Number of nodes in the subtree rooted here, counting this node.
    ///
    /// Walks the tree with an explicit stack, so deep trees do not exhaust
    /// the call stack.
    #[instrument(level = "trace", skip(self))]
    pub fn size(&self) -> usize {
        let mut size = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            size += 1;
            stack.extend(node.children());
        }
        size
    }

    /// Longest root-to-leaf path, counted in nodes.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            for child in node.children() {
                stack.push((child, depth + 1));
            }
        }
        max_depth
    }
}

/// Appends one empty child to `node`.
pub fn add_child(node: &mut QueryNode) {
    node.add_child();
}

/// Counts all nodes of the tree rooted at `node`.
pub fn tree_size(node: &QueryNode) -> usize {
    node.size()
}

/// Smallest and largest tree size in `trees`.
///
/// Fails with `InvalidArgument` on an empty collection instead of returning
/// sentinel values.
#[instrument(level = "debug", skip(trees), fields(trees = trees.len()))]
pub fn size_range(trees: &[QueryNode]) -> DomainResult<(usize, usize)> {
    match trees.iter().map(QueryNode::size).minmax() {
        MinMaxResult::NoElements => Err(DomainError::InvalidArgument(
            "size range of an empty tree collection".to_string(),
        )),
        MinMaxResult::OneElement(size) => Ok((size, size)),
        MinMaxResult::MinMax(min, max) => Ok((min, max)),
    }
}

impl fmt::Display for QueryNode {
    /// Compact notation: `label[child, child]`, `_` for unrestricted nodes.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.restrictions.is_empty() {
            write!(f, "_")?;
        } else {
            write!(f, "{}", self.restrictions.iter().join("|"))?;
        }
        if let Some(children) = &self.children {
            write!(f, "[{}]", children.iter().join(", "))?;
        }
        Ok(())
    }
}
