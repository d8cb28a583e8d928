//! Enumeration of all query tree shapes within a size range

use std::fmt;
use std::str::FromStr;

use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::expand::{Dedup, Expander, Generations};
use crate::domain::grow::tree_candidates;
use crate::domain::node::QueryNode;

/// Inclusive range of tree sizes, `1 <= min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeRange {
    min: usize,
    max: usize,
}

impl SizeRange {
    pub fn new(min: usize, max: usize) -> DomainResult<Self> {
        if min == 0 {
            return Err(DomainError::InvalidArgument(
                "tree size must be at least 1".to_string(),
            ));
        }
        if min > max {
            return Err(DomainError::InvalidArgument(format!(
                "size range {min}-{max} is empty"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn exact(size: usize) -> DomainResult<Self> {
        Self::new(size, size)
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// Generations needed to reach the largest size from a single leaf.
    pub fn generations(&self) -> Generations {
        Generations::from(self.max - 1)
    }
}

impl FromStr for SizeRange {
    type Err = DomainError;

    /// Accepts `"k"` or `"lo-hi"`.
    fn from_str(s: &str) -> DomainResult<Self> {
        let parse = |part: &str| {
            part.trim().parse::<usize>().map_err(|e| {
                DomainError::InvalidArgument(format!("invalid tree size '{}': {}", part.trim(), e))
            })
        };
        match s.split_once('-') {
            Some((lo, hi)) => Self::new(parse(lo)?, parse(hi)?),
            None => Self::exact(parse(s)?),
        }
    }
}

impl fmt::Display for SizeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}

/// All distinct trees with a size inside `range`, smallest sizes first.
///
/// Size `s` is the frontier after `s - 1` generations grown from one leaf,
/// so trees are distinct under whatever equivalence `expander` deduplicates by.
#[instrument(level = "debug", skip(expander), fields(range = %range))]
pub fn generate_sized<D>(range: SizeRange, expander: &mut Expander<D>) -> DomainResult<Vec<QueryNode>>
where
    D: Dedup<QueryNode>,
{
    let mut trees: Vec<QueryNode> = Vec::new();
    let mut frontier = vec![QueryNode::leaf()];

    for size in 1..=range.max() {
        if size > 1 {
            frontier = expander.expand(Generations::from(1), frontier, tree_candidates)?;
        }
        if size >= range.min() {
            trees
                .try_reserve(frontier.len())
                .map_err(|source| DomainError::AllocationFailure {
                    what: "generated trees",
                    source,
                })?;
            trees.extend(frontier.iter().cloned());
            debug!(size, count = frontier.len(), "trees of size generated");
        }
    }

    Ok(trees)
}
