//! Query trees for dependency-treebank search
//!
//! Enumerates tree shapes by repeated growth, deduplicates each generation,
//! tokenizes query text with awareness of parenthesised groups and decodes
//! queries into restriction trees.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod tree_traits;
pub mod util;
