//! Candidate representation and random candidate generation.
//!
//! A [`Candidate`] is a fixed-size, duplicate-free list of item indices.
//! Position carries no meaning: two candidates holding the same index set are
//! the same solution, which is what [`CandidateKey`] captures.

use crate::error::ConfigError;
use rand::seq::index;
use rand::Rng;
use std::collections::HashSet;
use std::fmt;

/// One solution: `L` distinct indices into the item universe.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Candidate {
    indices: Vec<usize>,
}

impl Candidate {
    /// Wraps indices as a candidate.
    ///
    /// No validation happens here; operators in this crate only ever produce
    /// valid candidates, see [`Candidate::is_valid`].
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    /// Indices in ascending order.
    pub fn sorted_indices(&self) -> Vec<usize> {
        let mut sorted = self.indices.clone();
        sorted.sort_unstable();
        sorted
    }

    /// Order-independent identity used for fitness memoization.
    pub fn canonical_key(&self) -> CandidateKey {
        CandidateKey(self.sorted_indices().into_boxed_slice())
    }

    /// Checks the subset invariant: exactly `length` pairwise-distinct
    /// indices, each below `universe_len`.
    pub fn is_valid(&self, length: usize, universe_len: usize) -> bool {
        if self.indices.len() != length {
            return false;
        }
        let mut seen = HashSet::with_capacity(length);
        self.indices
            .iter()
            .all(|&i| i < universe_len && seen.insert(i))
    }

    pub(crate) fn into_indices(self) -> Vec<usize> {
        self.indices
    }
}

impl From<Vec<usize>> for Candidate {
    fn from(indices: Vec<usize>) -> Self {
        Candidate::new(indices)
    }
}

/// Sorted index sequence identifying a candidate regardless of order.
///
/// Displays as the comma-joined sorted indices, e.g. `1,4,7`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandidateKey(Box<[usize]>);

impl CandidateKey {
    /// Number of indices behind the key.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

impl fmt::Display for CandidateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{index}")?;
        }
        Ok(())
    }
}

/// Produces uniformly random candidates of a fixed length.
#[derive(Debug, Clone, Copy)]
pub struct CandidateFactory {
    universe_len: usize,
    solution_length: usize,
}

impl CandidateFactory {
    /// Fails when the requested length cannot be drawn without replacement.
    pub fn new(universe_len: usize, solution_length: usize) -> Result<Self, ConfigError> {
        if solution_length == 0 {
            return Err(ConfigError::ZeroSolutionLength);
        }
        if solution_length > universe_len {
            return Err(ConfigError::SolutionTooLong {
                length: solution_length,
                universe: universe_len,
            });
        }
        Ok(Self {
            universe_len,
            solution_length,
        })
    }

    pub fn universe_len(&self) -> usize {
        self.universe_len
    }

    pub fn solution_length(&self) -> usize {
        self.solution_length
    }

    /// Draws `L` distinct indices uniformly without replacement.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Candidate {
        let drawn = index::sample(rng, self.universe_len, self.solution_length);
        Candidate::new(drawn.into_vec())
    }
}
