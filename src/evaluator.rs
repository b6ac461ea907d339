//! The fitness evaluator contract.

use crate::error::EvaluationError;

/// Scores a subset of item labels; higher is better.
///
/// This is typically the most expensive operation of a run (for example a
/// trained regression model's prediction). The engine calls it only on cache
/// misses, synchronously, and never retries: retries or timeouts belong inside
/// the implementation.
///
/// Evaluators must be deterministic for the lifetime of a run, otherwise
/// memoized fitness values go stale.
///
/// Any `Fn(&[&str]) -> Result<f64, EvaluationError>` is an evaluator:
///
/// ```
/// use subset_evolve::{EvaluationError, FitnessEvaluator};
///
/// let count_vowels = |items: &[&str]| -> Result<f64, EvaluationError> {
///     Ok(items.iter().filter(|s| "AEIOU".contains(**s)).count() as f64)
/// };
/// assert_eq!(count_vowels.evaluate(&["A", "B", "E"]).unwrap(), 2.0);
/// ```
pub trait FitnessEvaluator {
    fn evaluate(&self, items: &[&str]) -> Result<f64, EvaluationError>;
}

impl<F> FitnessEvaluator for F
where
    F: Fn(&[&str]) -> Result<f64, EvaluationError>,
{
    fn evaluate(&self, items: &[&str]) -> Result<f64, EvaluationError> {
        self(items)
    }
}
