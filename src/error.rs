//! Error taxonomy.
//!
//! Configuration problems are reported before any evaluation happens.
//! Evaluation failures abort only the run that hit them.

/// Invalid run parameters, detected by [`EvolverConfig::validate`](crate::EvolverConfig::validate)
/// or while building a [`Universe`](crate::Universe).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("universe must contain at least one item")]
    EmptyUniverse,
    #[error("duplicate item label in universe: {0}")]
    DuplicateItem(String),
    #[error("solution_length must be at least 1")]
    ZeroSolutionLength,
    #[error("solution_length {length} exceeds universe size {universe}")]
    SolutionTooLong { length: usize, universe: usize },
    #[error("population_size must be at least 1")]
    EmptyPopulation,
    #[error("{name} must be within [0, 1], got {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },
    #[error("cache_capacity must be at least 1")]
    ZeroCacheCapacity,
    #[error("tournament size must be at least 1")]
    ZeroTournamentSize,
    #[error("evaluation_hard_cap {cap} is below max_evaluations {max_evaluations}")]
    HardCapBelowBudget { cap: usize, max_evaluations: usize },
}

/// The external evaluator failed for some candidate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("evaluator failed for [{}]: {reason}", items.join(", "))]
    Failed { items: Vec<String>, reason: String },
    #[error("evaluator returned non-finite fitness {value} for [{}]", items.join(", "))]
    NonFinite { items: Vec<String>, value: f64 },
}

impl EvaluationError {
    /// Convenience constructor for evaluators that only have a message.
    pub fn failed(items: &[&str], reason: impl Into<String>) -> Self {
        EvaluationError::Failed {
            items: items.iter().map(|s| s.to_string()).collect(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("ConfigurationError: {0}")]
    Configuration(#[from] ConfigError),
    #[error("EvaluationError: {0}")]
    Evaluation(#[from] EvaluationError),
    #[error("CacheConsistencyError: key {key} cached for length {found}, requested length {expected}")]
    CacheConsistency {
        key: String,
        expected: usize,
        found: usize,
    },
    #[error("run cancelled at generation {generation}")]
    Cancelled { generation: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
