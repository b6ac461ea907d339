//! Parent selection strategies.
//!
//! Selection decides which members mate. Every strategy here is biased
//! towards **higher** fitness.
//!
//! See Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//! Evolutionary Algorithms".

use crate::population::Member;
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;
use std::cmp::Ordering;

/// Weight of the least fit member under roulette selection.
const ROULETTE_FLOOR: f64 = 1e-10;

/// Selection strategy for choosing parents (maximization).
///
/// # Examples
///
/// ```
/// use subset_evolve::Selection;
///
/// // Binary tournament, the default
/// assert_eq!(Selection::default(), Selection::Tournament(2));
///
/// let sel = Selection::Rank;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// Pick `k` members uniformly with replacement, keep the fittest.
    Tournament(usize),

    /// Fitness-proportionate selection on fitness shifted by the population
    /// minimum, so negative scores work.
    Roulette,

    /// Linear ranking: the fittest member has weight `n`, the least fit `1`.
    Rank,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Tournament(2)
    }
}

impl Selection {
    /// Select a parent index from the population.
    ///
    /// # Panics
    /// Panics if `population` is empty.
    pub fn select<R: Rng>(&self, population: &[Member], rng: &mut R) -> usize {
        assert!(
            !population.is_empty(),
            "cannot select from empty population"
        );

        match self {
            Selection::Tournament(k) => tournament(population, *k, rng),
            Selection::Roulette => roulette(population, rng),
            Selection::Rank => rank(population, rng),
        }
    }
}

fn tournament<R: Rng>(population: &[Member], k: usize, rng: &mut R) -> usize {
    let k = k.max(1);
    let n = population.len();

    let mut best_idx = rng.random_range(0..n);
    for _ in 1..k {
        let idx = rng.random_range(0..n);
        if population[idx].fitness > population[best_idx].fitness {
            best_idx = idx;
        }
    }
    best_idx
}

fn roulette<R: Rng>(population: &[Member], rng: &mut R) -> usize {
    let min_fitness = population
        .iter()
        .map(|m| m.fitness)
        .fold(f64::INFINITY, f64::min);

    let weights = population
        .iter()
        .map(|m| (m.fitness - min_fitness).max(0.0) + ROULETTE_FLOOR);

    match WeightedIndex::new(weights) {
        Ok(dist) => dist.sample(rng),
        // Overflowing weights: fall back to uniform
        Err(_) => rng.random_range(0..population.len()),
    }
}

fn rank<R: Rng>(population: &[Member], rng: &mut R) -> usize {
    let n = population.len();

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        population[a]
            .fitness
            .partial_cmp(&population[b].fitness)
            .unwrap_or(Ordering::Equal)
    });

    // Least fit gets weight 1, fittest gets n
    let mut weights = vec![0usize; n];
    for (position, &idx) in order.iter().enumerate() {
        weights[idx] = position + 1;
    }

    match WeightedIndex::new(&weights) {
        Ok(dist) => dist.sample(rng),
        Err(_) => rng.random_range(0..n),
    }
}
