//! Tree mutator and tree size calculator over randomly built trees.

use proptest::prelude::*;
use proptest::sample::Index;
use rstest::rstest;

use querytree::domain::{add_child, size_range, tree_grow, tree_size, ErrorKind, QueryNode};
use querytree::util::testing::{chain, init_test_setup, tree, tree_from_parents};

fn arb_tree(max_nodes: usize) -> impl Strategy<Value = QueryNode> {
    prop::collection::vec(any::<usize>(), 0..max_nodes).prop_map(|parents| tree_from_parents(&parents))
}

#[test]
fn given_leaf_when_measuring_then_size_is_one() {
    init_test_setup();
    assert_eq!(tree_size(&QueryNode::leaf()), 1);
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(10)]
fn given_fresh_node_when_adding_k_children_then_has_k_leaves(#[case] k: usize) {
    let mut node = QueryNode::leaf();

    for _ in 0..k {
        add_child(&mut node);
    }

    assert_eq!(node.children().len(), k);
    assert!(node.children().iter().all(QueryNode::is_leaf));
    assert_eq!(tree_size(&node), k + 1);
}

#[test]
fn given_deep_chain_when_measuring_then_counts_every_node() {
    let deep = chain(2_000);
    assert_eq!(tree_size(&deep), 2_000);
}

#[test]
fn given_decoded_query_when_measuring_then_counts_nested_groups() {
    // root with obj child, which has an amod child
    let decoded = tree("_ >obj (upos=NOUN >amod _)");
    assert_eq!(tree_size(&decoded), 3);
}

#[test]
fn given_single_tree_when_size_range_then_min_equals_max() {
    let t = chain(4);
    assert_eq!(size_range(std::slice::from_ref(&t)).unwrap(), (4, 4));
}

#[test]
fn given_empty_collection_when_size_range_then_invalid_argument() {
    let err = size_range(&[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

proptest! {
    #[test]
    fn size_is_one_plus_children(t in arb_tree(40)) {
        let children: usize = t.children().iter().map(tree_size).sum();
        prop_assert_eq!(tree_size(&t), 1 + children);
    }

    #[test]
    fn size_counts_built_nodes(parents in prop::collection::vec(any::<usize>(), 0..60)) {
        prop_assert_eq!(tree_size(&tree_from_parents(&parents)), parents.len() + 1);
    }

    #[test]
    fn size_range_ignores_order(
        trees in prop::collection::vec(arb_tree(12), 1..8),
        shift in any::<Index>(),
    ) {
        let expected = size_range(&trees).unwrap();
        let sizes: Vec<usize> = trees.iter().map(tree_size).collect();
        prop_assert_eq!(expected, (*sizes.iter().min().unwrap(), *sizes.iter().max().unwrap()));

        let mut reordered = trees.clone();
        reordered.reverse();
        prop_assert_eq!(size_range(&reordered).unwrap(), expected);
        reordered.rotate_left(shift.index(trees.len()));
        prop_assert_eq!(size_range(&reordered).unwrap(), expected);
    }

    #[test]
    fn grow_adds_one_node_per_position(t in arb_tree(15)) {
        let grown: Vec<QueryNode> = tree_grow(&t).collect();
        prop_assert_eq!(grown.len(), tree_size(&t));
        prop_assert!(grown.iter().all(|g| tree_size(g) == tree_size(&t) + 1));
    }
}
