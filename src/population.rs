//! Evaluated population members and per-generation fitness statistics.

use crate::candidate::Candidate;
use std::cmp::Ordering;

/// A candidate paired with its fitness.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub candidate: Candidate,
    pub fitness: f64,
}

impl Member {
    pub fn new(candidate: Candidate, fitness: f64) -> Self {
        Self { candidate, fitness }
    }
}

/// Index of the fittest member; the first one wins ties.
///
/// Returns `None` for an empty slice.
pub fn fittest(population: &[Member]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, m) in population.iter().enumerate() {
        match best {
            Some(b) if population[b].fitness >= m.fitness => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Summary statistics of one generation's fitness values.
///
/// Standard deviation is the population (not sample) deviation; the median
/// of an even-sized population is the mean of the two middle values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessStats {
    pub best: f64,
    pub worst: f64,
    pub mean: f64,
    pub median: f64,
    pub stddev: f64,
}

impl FitnessStats {
    /// Returns `None` for an empty population.
    pub fn of(population: &[Member]) -> Option<Self> {
        if population.is_empty() {
            return None;
        }

        let mut values: Vec<f64> = population.iter().map(|m| m.fitness).collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let n = values.len();
        let mean = values.iter().sum::<f64>() / n as f64;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
        let median = if n % 2 == 1 {
            values[n / 2]
        } else {
            (values[n / 2 - 1] + values[n / 2]) / 2.0
        };

        Some(Self {
            best: values[n - 1],
            worst: values[0],
            mean,
            median,
            stddev: variance.sqrt(),
        })
    }
}
