//! Shared test setup: once-only tracing subscriber and tree fixtures

use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{decode_query, QueryNode};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    // Create a filter for noisy modules
    let noisy_modules = ["config::"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    // RUST_LOG wins, otherwise everything from this crate down to trace
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("querytree=trace"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Decodes a query known to be valid.
pub fn tree(query: &str) -> QueryNode {
    decode_query(query).unwrap_or_else(|e| panic!("fixture query '{query}': {e}"))
}

/// A leaf with `depth - 1` nodes hanging below it in a single chain.
pub fn chain(depth: usize) -> QueryNode {
    let mut root = QueryNode::leaf();
    let mut node = &mut root;
    for _ in 1..depth {
        node.add_child();
        node = &mut node.children_mut()[0];
    }
    root
}

/// Builds a tree of `parents.len() + 1` unlabelled nodes.
///
/// Node `i + 1` hangs below node `parents[i] % (i + 1)`, so any sequence is valid.
pub fn tree_from_parents(parents: &[usize]) -> QueryNode {
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); parents.len() + 1];
    for (i, parent) in parents.iter().enumerate() {
        children[parent % (i + 1)].push(i + 1);
    }

    // children always carry higher indices, so assembling backwards sees them first
    let mut built: Vec<Option<QueryNode>> = vec![None; children.len()];
    for node in (0..children.len()).rev() {
        let kids = children[node]
            .iter()
            .filter_map(|&child| built[child].take())
            .collect();
        built[node] = Some(QueryNode::leaf().with_children(kids));
    }
    built[0].take().unwrap_or_else(QueryNode::leaf)
}

/// Compact bracket rendering of every tree, in order.
pub fn render(trees: &[QueryNode]) -> Vec<String> {
    trees.iter().map(ToString::to_string).collect()
}
