//! Variation operators for fixed-size subset chromosomes.
//!
//! Both operators are stateless: rates and the random source are passed in
//! explicitly, and every output is again a valid candidate of the input's
//! length with pairwise-distinct indices.
//!
//! # Mutation
//!
//! - [`mutate`]: per-position replacement with an index not currently in the
//!   candidate
//!
//! # Crossover
//!
//! - [`crossover`]: uniform resample from the parents' combined gene pool.
//!   Positional crossover (one-point, OX, PMX) makes no sense here because
//!   only set membership matters.

use crate::candidate::Candidate;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeSet, HashSet};

// ============================================================================
// Mutation
// ============================================================================

/// Per-position replacement mutation.
///
/// Each position is independently replaced with probability `mutation_rate`
/// by an index drawn uniformly from the items not currently in the mutant.
/// The unused pool is updated after every replacement (the new index leaves,
/// the old one returns), so later positions never draw an index that an
/// earlier position just took.
///
/// When the candidate already covers the whole universe there is nothing to
/// swap in and the candidate is returned unchanged.
///
/// # Complexity
/// O(L) plus expected `N / (N - L)` draws per replaced position.
pub fn mutate<R: Rng>(
    candidate: &Candidate,
    universe_len: usize,
    mutation_rate: f64,
    rng: &mut R,
) -> Candidate {
    let mut mutant = candidate.clone().into_indices();
    if mutant.len() >= universe_len {
        return Candidate::new(mutant);
    }

    let mut in_use: HashSet<usize> = mutant.iter().copied().collect();

    for slot in mutant.iter_mut() {
        if !rng.random_bool(mutation_rate) {
            continue;
        }

        let replacement = loop {
            let drawn = rng.random_range(0..universe_len);
            if !in_use.contains(&drawn) {
                break drawn;
            }
        };

        in_use.remove(&*slot);
        in_use.insert(replacement);
        *slot = replacement;
    }

    Candidate::new(mutant)
}

// ============================================================================
// Crossover
// ============================================================================

/// Subset crossover: resample both children from the parents' union.
///
/// With probability `1 - crossover_rate` the parents are returned unchanged.
/// Otherwise the union of both index sets is shuffled independently for each
/// child and truncated to the parents' length, then sorted ascending. If the
/// union holds no more than `L` indices (identical parents), both children
/// are the union itself.
///
/// Children only ever contain indices present in at least one parent.
///
/// # Panics
/// Panics if the parents have different lengths.
pub fn crossover<R: Rng>(
    parent_a: &Candidate,
    parent_b: &Candidate,
    crossover_rate: f64,
    rng: &mut R,
) -> (Candidate, Candidate) {
    assert_eq!(
        parent_a.len(),
        parent_b.len(),
        "parents must have equal length"
    );

    if !rng.random_bool(crossover_rate) {
        return (parent_a.clone(), parent_b.clone());
    }

    let length = parent_a.len();
    let mut pool: Vec<usize> = parent_a
        .indices()
        .iter()
        .chain(parent_b.indices())
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    if pool.len() <= length {
        return (Candidate::new(pool.clone()), Candidate::new(pool));
    }

    let first = resample(&mut pool, length, rng);
    let second = resample(&mut pool, length, rng);
    (first, second)
}

/// Shuffle the pool in place and take a sorted prefix of `length` indices.
fn resample<R: Rng>(pool: &mut [usize], length: usize, rng: &mut R) -> Candidate {
    pool.shuffle(rng);
    let mut child = pool[..length].to_vec();
    child.sort_unstable();
    Candidate::new(child)
}

// ============================================================================
// Tests
// ============================================================================
