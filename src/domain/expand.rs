//! Generation expander: bounded breadth expansion with per-generation dedup
//!
//! Each generation feeds every tree of the current frontier through a grow
//! function and keeps the first occurrence of every distinct candidate. Only
//! candidates of the same generation are compared with each other.

use std::collections::HashSet;
use std::hash::Hash;

use tracing::{debug, instrument, trace};

use crate::domain::error::{DomainError, DomainResult};

/// Lazily produced candidates of one grow call, borrowing the grown tree.
pub type Candidates<'a, T, E> = Box<dyn Iterator<Item = Result<T, E>> + 'a>;

/// Number of generations to expand. Never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generations(usize);

impl Generations {
    pub fn get(self) -> usize {
        self.0
    }
}

impl From<usize> for Generations {
    fn from(n: usize) -> Self {
        Self(n)
    }
}

impl TryFrom<i64> for Generations {
    type Error = DomainError;

    fn try_from(n: i64) -> DomainResult<Self> {
        usize::try_from(n).map(Self).map_err(|_| {
            DomainError::InvalidArgument(format!("generation count must be >= 0, got {n}"))
        })
    }
}

/// Decides whether a candidate joins the generation being built.
pub trait Dedup<T> {
    /// Returns `true` when `candidate` differs from everything in `accepted`,
    /// i.e. from every tree admitted earlier in the same generation.
    fn admit(&mut self, accepted: &[T], candidate: &T) -> DomainResult<bool>;

    /// Forgets per-generation state before a new generation starts.
    fn start_generation(&mut self) {}
}

/// Linear equality scan over the accepted trees, O(k²) per generation.
pub struct LinearScan<F> {
    eq: F,
}

impl<T: PartialEq> LinearScan<fn(&T, &T) -> bool> {
    /// Scan using the type's own equality.
    pub fn structural() -> Self {
        Self {
            eq: <T as PartialEq>::eq,
        }
    }
}

impl<F> LinearScan<F> {
    pub fn by<T>(eq: F) -> Self
    where
        F: FnMut(&T, &T) -> bool,
    {
        Self { eq }
    }
}

impl<T, F> Dedup<T> for LinearScan<F>
where
    F: FnMut(&T, &T) -> bool,
{
    fn admit(&mut self, accepted: &[T], candidate: &T) -> DomainResult<bool> {
        Ok(!accepted.iter().any(|seen| (self.eq)(seen, candidate)))
    }
}

/// Linear scan over cached keys: each candidate's key is computed once.
///
/// Suits keys that are costly to build but not hashable cheaply, e.g.
/// unordered canonical forms.
pub struct KeyedScan<F, K> {
    key: F,
    keys: Vec<K>,
}

impl<F, K> KeyedScan<F, K>
where
    K: PartialEq,
{
    pub fn new<T>(key: F) -> Self
    where
        F: FnMut(&T) -> K,
    {
        Self {
            key,
            keys: Vec::new(),
        }
    }
}

impl<T, F, K> Dedup<T> for KeyedScan<F, K>
where
    F: FnMut(&T) -> K,
    K: PartialEq,
{
    fn admit(&mut self, _accepted: &[T], candidate: &T) -> DomainResult<bool> {
        let key = (self.key)(candidate);
        if self.keys.contains(&key) {
            return Ok(false);
        }
        self.keys
            .try_reserve(1)
            .map_err(|source| DomainError::AllocationFailure {
                what: "dedup keys",
                source,
            })?;
        self.keys.push(key);
        Ok(true)
    }

    fn start_generation(&mut self) {
        self.keys.clear();
    }
}

/// Hash-based dedup keyed by a structural key consistent with equality.
pub struct KeyedSet<F, K> {
    key: F,
    seen: HashSet<K>,
}

impl<F, K> KeyedSet<F, K>
where
    K: Hash + Eq,
{
    pub fn new<T>(key: F) -> Self
    where
        F: FnMut(&T) -> K,
    {
        Self {
            key,
            seen: HashSet::new(),
        }
    }
}

impl<T, F, K> Dedup<T> for KeyedSet<F, K>
where
    F: FnMut(&T) -> K,
    K: Hash + Eq,
{
    fn admit(&mut self, _accepted: &[T], candidate: &T) -> DomainResult<bool> {
        self.seen
            .try_reserve(1)
            .map_err(|source| DomainError::AllocationFailure {
                what: "dedup set",
                source,
            })?;
        Ok(self.seen.insert((self.key)(candidate)))
    }

    fn start_generation(&mut self) {
        self.seen.clear();
    }
}

/// Runs the generation loop with a dedup strategy and an optional frontier bound.
pub struct Expander<D> {
    dedup: D,
    max_frontier: Option<usize>,
}

impl<D> Expander<D> {
    pub fn new(dedup: D) -> Self {
        Self {
            dedup,
            max_frontier: None,
        }
    }

    /// Fail with `FrontierLimit` once a generation would hold more than `limit` trees.
    pub fn with_max_frontier(mut self, limit: usize) -> Self {
        self.max_frontier = Some(limit);
        self
    }

    /// Expands `seeds` for `generations` steps and returns the last frontier.
    ///
    /// Zero generations return `seeds` unchanged. Candidates are pulled from
    /// `grow` one at a time; the first error aborts the whole call and no
    /// partial frontier is returned.
    #[instrument(level = "debug", skip(self, seeds, grow), fields(seeds = seeds.len()))]
    pub fn expand<T, G, E>(
        &mut self,
        generations: Generations,
        seeds: Vec<T>,
        mut grow: G,
    ) -> DomainResult<Vec<T>>
    where
        D: Dedup<T>,
        G: for<'a> FnMut(&'a T) -> Candidates<'a, T, E>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let mut frontier = seeds;

        for generation in 1..=generations.get() {
            self.dedup.start_generation();
            let mut next: Vec<T> = Vec::new();
            let mut candidates = 0usize;

            for tree in &frontier {
                for candidate in grow(tree) {
                    let candidate = candidate.map_err(|e| DomainError::CollaboratorFailure {
                        generation,
                        source: Box::new(e),
                    })?;
                    candidates += 1;

                    if !self.dedup.admit(&next, &candidate)? {
                        continue;
                    }
                    if let Some(limit) = self.max_frontier {
                        if next.len() >= limit {
                            return Err(DomainError::FrontierLimit { limit, generation });
                        }
                    }
                    next.try_reserve(1)
                        .map_err(|source| DomainError::AllocationFailure {
                            what: "frontier",
                            source,
                        })?;
                    next.push(candidate);
                }
            }

            debug!(
                generation,
                candidates,
                accepted = next.len(),
                "generation expanded"
            );
            frontier = next;

            if frontier.is_empty() {
                trace!(generation, "frontier exhausted");
                break;
            }
        }

        Ok(frontier)
    }
}

/// Expands `trees` for `n` generations, deduplicating with a linear equality scan.
pub fn expand_generations<T, G, E>(n: usize, trees: Vec<T>, grow: G) -> DomainResult<Vec<T>>
where
    T: PartialEq,
    G: for<'a> FnMut(&'a T) -> Candidates<'a, T, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    let dedup: LinearScan<fn(&T, &T) -> bool> = LinearScan::structural();
    Expander::new(dedup).expand(Generations::from(n), trees, grow)
}

/// Same frontier as [`expand_generations`], deduplicating through a hash set.
pub fn expand_generations_hashed<T, G, E>(
    n: usize,
    trees: Vec<T>,
    grow: G,
) -> DomainResult<Vec<T>>
where
    T: Hash + Eq + Clone,
    G: for<'a> FnMut(&'a T) -> Candidates<'a, T, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    Expander::new(KeyedSet::new(|tree: &T| tree.clone())).expand(Generations::from(n), trees, grow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::fmt;
    use std::iter;

    #[derive(Debug)]
    struct Boom;

    impl fmt::Display for Boom {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "boom")
        }
    }

    impl std::error::Error for Boom {}

    fn halves(n: &u32) -> Candidates<'_, u32, Infallible> {
        Box::new([n / 2, n / 2, n + 1].into_iter().map(Ok))
    }

    fn boom_from_two(n: &u32) -> Candidates<'_, u32, Boom> {
        if *n >= 2 {
            Box::new(iter::once(Err(Boom)))
        } else {
            Box::new(iter::once(Ok(n + 1)))
        }
    }

    #[test]
    fn given_zero_generations_when_expanding_then_returns_seeds() {
        let out = expand_generations(0, vec![3u32, 3, 7], halves).unwrap();
        assert_eq!(out, vec![3, 3, 7]);
    }

    #[test]
    fn given_duplicate_candidates_when_expanding_then_keeps_first_occurrence() {
        // 8 -> 4, 4, 9 ; 5 -> 2, 2, 6
        let out = expand_generations(1, vec![8u32, 5], halves).unwrap();
        assert_eq!(out, vec![4, 9, 2, 6]);
    }

    #[test]
    fn given_repeat_across_generations_when_expanding_then_not_compared() {
        // generation 1: [1, 3]; generation 2: 1 -> 0, 0, 2 ; 3 -> 1, 1, 4
        let out = expand_generations(2, vec![2u32], halves).unwrap();
        assert_eq!(out, vec![0, 2, 1, 4]);
    }

    #[test]
    fn given_hashed_dedup_when_expanding_then_matches_linear_scan() {
        let linear = expand_generations(4, vec![40u32, 17], halves).unwrap();
        let hashed = expand_generations_hashed(4, vec![40u32, 17], halves).unwrap();
        assert_eq!(linear, hashed);
    }

    #[test]
    fn given_failing_grow_when_expanding_then_aborts_without_partial_result() {
        let result = expand_generations(3, vec![1u32], boom_from_two);

        match result {
            Err(DomainError::CollaboratorFailure { generation, .. }) => assert_eq!(generation, 2),
            other => panic!("expected collaborator failure, got {other:?}"),
        }
    }

    #[test]
    fn given_error_mid_sequence_when_expanding_then_later_candidates_never_pulled() {
        fn fail_second(n: &u32) -> Candidates<'_, u32, Boom> {
            Box::new(
                iter::once(Ok(*n))
                    .chain(iter::once(Err(Boom)))
                    .chain(iter::from_fn(|| unreachable!("pulled past the failure"))),
            )
        }

        let result = expand_generations(1, vec![1u32], fail_second);

        assert!(matches!(
            result,
            Err(DomainError::CollaboratorFailure { generation: 1, .. })
        ));
    }

    #[test]
    fn given_keyed_scan_when_expanding_then_key_built_once_per_candidate() {
        let mut calls = 0;
        let out = Expander::new(KeyedScan::new(|n: &u32| {
            calls += 1;
            *n
        }))
        .expand(Generations::from(1), vec![8u32, 5], halves)
        .unwrap();

        assert_eq!(out, vec![4, 9, 2, 6]);
        assert_eq!(calls, 6);
    }

    #[test]
    fn given_frontier_limit_when_generation_overflows_then_fails() {
        let mut expander =
            Expander::new(LinearScan::<fn(&u32, &u32) -> bool>::structural()).with_max_frontier(1);
        let result = expander.expand(Generations::from(1), vec![8u32], halves);
        assert!(matches!(
            result,
            Err(DomainError::FrontierLimit {
                limit: 1,
                generation: 1
            })
        ));
    }

    #[test]
    fn given_negative_count_when_converting_then_invalid_argument() {
        assert!(Generations::try_from(-1i64).is_err());
        assert_eq!(Generations::try_from(3i64).unwrap().get(), 3);
    }
}
