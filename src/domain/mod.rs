//! Domain layer: query trees and the algorithms over them
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod equivalence;
pub mod error;
pub mod expand;
pub mod generate;
pub mod grow;
pub mod node;
pub mod query;
pub mod tokenizer;

pub use equivalence::{CanonicalTree, Equivalence};
pub use error::{BoxError, DomainError, DomainResult, ErrorKind};
pub use expand::{
    expand_generations, expand_generations_hashed, Candidates, Dedup, Expander, Generations,
    KeyedScan, KeyedSet, LinearScan,
};
pub use generate::{generate_sized, SizeRange};
pub use grow::{tree_candidates, tree_grow};
pub use node::{add_child, size_range, tree_size, QueryNode};
pub use query::{
    decode_query, Constraint, QueryDecoder, Restriction, DEFAULT_MAX_DEPTH, UNIVERSAL_FEATURES,
};
pub use tokenizer::{split_query_bytes, split_query_text, split_query_text_with, ParenPolicy};
