//! Query tree generation service
//!
//! Runs the generation expander under the configured limits and with the
//! configured equivalence and dedup strategy.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::config::{DedupStrategy, Settings};
use crate::domain::{
    generate_sized, size_range, tree_candidates, Dedup, Equivalence, Expander, Generations,
    KeyedScan, KeyedSet, LinearScan, QueryNode, SizeRange,
};

/// Generation and measurement of query trees.
pub struct GenerationService {
    settings: Arc<Settings>,
}

impl GenerationService {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    /// Every distinct tree whose size lies in `range`.
    #[instrument(level = "debug", skip(self), fields(range = %range))]
    pub fn generate(&self, range: SizeRange) -> ApplicationResult<Vec<QueryNode>> {
        self.check_generations(range.generations())?;
        let equivalence = self.settings.expansion.equivalence;

        let trees = match (self.settings.expansion.dedup, equivalence) {
            (DedupStrategy::Linear, Equivalence::Ordered) => {
                generate_sized(range, &mut self.expander(structural()))?
            }
            // canonical forms are built once per candidate, not per comparison
            (DedupStrategy::Linear, Equivalence::Unordered) => generate_sized(
                range,
                &mut self.expander(KeyedScan::new(move |tree: &QueryNode| {
                    equivalence.canonical(tree)
                })),
            )?,
            (DedupStrategy::Hashed, _) => generate_sized(
                range,
                &mut self.expander(KeyedSet::new(move |tree: &QueryNode| {
                    equivalence.canonical(tree)
                })),
            )?,
        };

        debug!(count = trees.len(), "generated trees");
        Ok(trees)
    }

    /// Grows `seeds` for `generations` steps with the default grow function.
    ///
    /// Negative counts and counts above `expansion.max_generations` are rejected
    /// before any work is done.
    #[instrument(level = "debug", skip(self, seeds), fields(seeds = seeds.len()))]
    pub fn expand(&self, generations: i64, seeds: Vec<QueryNode>) -> ApplicationResult<Vec<QueryNode>> {
        let generations = Generations::try_from(generations)?;
        self.check_generations(generations)?;
        let equivalence = self.settings.expansion.equivalence;

        let trees = match (self.settings.expansion.dedup, equivalence) {
            (DedupStrategy::Linear, Equivalence::Ordered) => self
                .expander(structural())
                .expand(generations, seeds, tree_candidates)?,
            (DedupStrategy::Linear, Equivalence::Unordered) => self
                .expander(KeyedScan::new(move |tree: &QueryNode| equivalence.canonical(tree)))
                .expand(generations, seeds, tree_candidates)?,
            (DedupStrategy::Hashed, _) => self
                .expander(KeyedSet::new(move |tree: &QueryNode| equivalence.canonical(tree)))
                .expand(generations, seeds, tree_candidates)?,
        };

        Ok(trees)
    }

    /// Smallest and largest size among `trees`.
    pub fn size_range(&self, trees: &[QueryNode]) -> ApplicationResult<(usize, usize)> {
        Ok(size_range(trees)?)
    }

    fn expander<D: Dedup<QueryNode>>(&self, dedup: D) -> Expander<D> {
        Expander::new(dedup).with_max_frontier(self.settings.expansion.max_frontier)
    }

    fn check_generations(&self, generations: Generations) -> ApplicationResult<()> {
        let max = self.settings.expansion.max_generations;
        if generations.get() > max {
            return Err(ApplicationError::GenerationLimit {
                requested: generations.get(),
                max,
            });
        }
        Ok(())
    }
}

fn structural() -> LinearScan<fn(&QueryNode, &QueryNode) -> bool> {
    LinearScan::structural()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExpansionConfig;
    use crate::domain::DomainError;

    fn service(expansion: ExpansionConfig) -> GenerationService {
        GenerationService::new(Arc::new(Settings {
            expansion,
            ..Settings::default()
        }))
    }

    #[test]
    fn given_negative_generations_when_expanding_then_invalid_argument() {
        let result = service(ExpansionConfig::default()).expand(-1, vec![QueryNode::leaf()]);

        assert!(matches!(
            result,
            Err(ApplicationError::Domain(DomainError::InvalidArgument(_)))
        ));
    }

    #[test]
    fn given_generations_above_limit_when_expanding_then_generation_limit() {
        let svc = service(ExpansionConfig {
            max_generations: 2,
            ..ExpansionConfig::default()
        });

        let result = svc.expand(3, vec![QueryNode::leaf()]);

        assert!(matches!(
            result,
            Err(ApplicationError::GenerationLimit { requested: 3, max: 2 })
        ));
    }

    #[test]
    fn given_small_frontier_bound_when_generating_then_frontier_limit() {
        let svc = service(ExpansionConfig {
            max_frontier: 3,
            ..ExpansionConfig::default()
        });

        let result = svc.generate(SizeRange::exact(5).unwrap());

        assert!(matches!(
            result,
            Err(ApplicationError::Domain(DomainError::FrontierLimit { limit: 3, .. }))
        ));
    }

    #[test]
    fn given_unordered_hashed_when_generating_size_four_then_four_shapes() {
        let svc = service(ExpansionConfig {
            equivalence: Equivalence::Unordered,
            dedup: DedupStrategy::Hashed,
            ..ExpansionConfig::default()
        });

        let trees = svc.generate(SizeRange::exact(4).unwrap()).unwrap();

        assert_eq!(trees.len(), 4);
    }
}
