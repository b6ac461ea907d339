//! Bounded fitness memoization with least-recently-used eviction.
//!
//! Every population member goes through [`FitnessCache::get_or_compute`], so
//! the expensive evaluator runs at most once per distinct index set while the
//! entry stays resident.

use crate::candidate::{Candidate, CandidateKey};
use crate::error::{Error, EvaluationError, Result};
use lru::LruCache;
use std::num::NonZeroUsize;

/// Default capacity, large enough to hold several hundred generations of a
/// 50-member population when offspring repeat.
pub const DEFAULT_CACHE_CAPACITY: usize = 5000;

#[derive(Debug, Clone, Copy)]
struct Entry {
    fitness: f64,
    len: usize,
}

/// Key → fitness map keyed by [`CandidateKey`], owned by exactly one run.
///
/// # Example
///
/// ```
/// use subset_evolve::{Candidate, FitnessCache};
///
/// let mut cache = FitnessCache::new(2);
/// let f = cache
///     .get_or_compute(&Candidate::new(vec![2, 0]), |_| Ok(1.5))
///     .unwrap();
/// assert_eq!(f, 1.5);
///
/// // Same index set, different order: served from the cache.
/// let f = cache
///     .get_or_compute(&Candidate::new(vec![0, 2]), |_| unreachable!())
///     .unwrap();
/// assert_eq!(f, 1.5);
/// assert_eq!(cache.hits(), 1);
/// ```
#[derive(Debug)]
pub struct FitnessCache {
    entries: LruCache<CandidateKey, Entry>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl FitnessCache {
    /// Creates an empty cache. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Number of evaluator invocations made through this cache.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    /// Returns the cached fitness without touching recency.
    pub fn peek(&self, candidate: &Candidate) -> Option<f64> {
        self.entries
            .peek(&candidate.canonical_key())
            .map(|e| e.fitness)
    }

    /// Returns the fitness for `candidate`, computing it on a miss.
    ///
    /// On a hit the entry becomes most-recently-used. On a miss `compute` is
    /// called exactly once; a successful result is stored and the
    /// least-recently-used entry is evicted if the cache is full.
    /// Failures are returned as-is and nothing is stored.
    pub fn get_or_compute<F>(&mut self, candidate: &Candidate, compute: F) -> Result<f64>
    where
        F: FnOnce(&Candidate) -> std::result::Result<f64, EvaluationError>,
    {
        let key = candidate.canonical_key();

        if let Some(entry) = self.entries.get(&key) {
            if entry.len != candidate.len() {
                return Err(Error::CacheConsistency {
                    key: key.to_string(),
                    expected: candidate.len(),
                    found: entry.len,
                });
            }
            self.hits += 1;
            return Ok(entry.fitness);
        }

        self.misses += 1;
        let fitness = compute(candidate)?;

        let entry = Entry {
            fitness,
            len: candidate.len(),
        };
        // The key was absent, so a returned pair is always an eviction
        if let Some((evicted, _)) = self.entries.push(key, entry) {
            tracing::trace!(key = %evicted, "evicting least-recently-used fitness");
            self.evictions += 1;
        }

        Ok(fitness)
    }
}

impl Default for FitnessCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn c(indices: &[usize]) -> Candidate {
        Candidate::new(indices.to_vec())
    }

    #[test]
    fn test_same_set_evaluated_once() {
        let calls = Cell::new(0);
        let mut cache = FitnessCache::new(10);
        let eval = |cand: &Candidate| {
            calls.set(calls.get() + 1);
            Ok(cand.indices().iter().sum::<usize>() as f64)
        };

        assert_eq!(cache.get_or_compute(&c(&[3, 1, 2]), eval).unwrap(), 6.0);
        assert_eq!(cache.get_or_compute(&c(&[1, 2, 3]), eval).unwrap(), 6.0);
        assert_eq!(cache.get_or_compute(&c(&[2, 3, 1]), eval).unwrap(), 6.0);
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.hits(), 2);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn test_lru_eviction_order() {
        let mut cache = FitnessCache::new(2);
        cache.get_or_compute(&c(&[0]), |_| Ok(0.0)).unwrap();
        cache.get_or_compute(&c(&[1]), |_| Ok(1.0)).unwrap();

        // Touch [0] so [1] becomes least-recently-used
        cache.get_or_compute(&c(&[0]), |_| Ok(-1.0)).unwrap();
        cache.get_or_compute(&c(&[2]), |_| Ok(2.0)).unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.evictions(), 1);
        assert_eq!(cache.peek(&c(&[0])), Some(0.0));
        assert_eq!(cache.peek(&c(&[1])), None);
        assert_eq!(cache.peek(&c(&[2])), Some(2.0));
    }

    #[test]
    fn test_evicted_entry_recomputed() {
        let calls = Cell::new(0);
        let eval = |_: &Candidate| {
            calls.set(calls.get() + 1);
            Ok(1.0)
        };
        let mut cache = FitnessCache::new(1);
        cache.get_or_compute(&c(&[0, 1]), eval).unwrap();
        cache.get_or_compute(&c(&[2, 3]), eval).unwrap();
        cache.get_or_compute(&c(&[1, 0]), eval).unwrap();
        assert_eq!(calls.get(), 3);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failure_not_cached() {
        let mut cache = FitnessCache::new(4);
        let err = cache
            .get_or_compute(&c(&[5]), |_| {
                Err(EvaluationError::failed(&["x"], "boom"))
            })
            .unwrap_err();
        assert!(matches!(err, Error::Evaluation(_)));
        assert!(cache.is_empty());

        let f = cache.get_or_compute(&c(&[5]), |_| Ok(3.0)).unwrap();
        assert_eq!(f, 3.0);
    }

    #[test]
    fn test_zero_capacity_raised() {
        let cache = FitnessCache::new(0);
        assert_eq!(cache.capacity(), 1);
        assert_eq!(FitnessCache::default().capacity(), DEFAULT_CACHE_CAPACITY);
    }

    #[test]
    fn test_eviction_count_tracks_overflow() {
        let mut cache = FitnessCache::new(3);
        for round in 0..50usize {
            let idx = round % 5;
            cache.get_or_compute(&c(&[idx]), |_| Ok(idx as f64)).unwrap();
            assert!(cache.len() <= 3);
        }
        // Cycling 5 keys through 3 slots misses every time
        assert_eq!(cache.hits(), 0);
        assert_eq!(cache.misses(), 50);
        assert_eq!(cache.evictions(), 47);
    }

    #[test]
    fn test_length_mismatch_is_reported() {
        let mut cache = FitnessCache::new(4);
        let stored = c(&[1, 2]);
        cache.entries.put(
            stored.canonical_key(),
            Entry {
                fitness: 9.0,
                len: 3,
            },
        );

        let err = cache
            .get_or_compute(&c(&[2, 1]), |_| Ok(0.0))
            .unwrap_err();
        assert_eq!(
            err,
            Error::CacheConsistency {
                key: "1,2".into(),
                expected: 2,
                found: 3,
            }
        );
        assert_eq!(cache.hits(), 0);
    }
}
