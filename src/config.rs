//! Run configuration.
//!
//! [`EvolverConfig`] holds every parameter that controls one run.

use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::error::ConfigError;
use crate::selection::Selection;
use crate::termination::TerminationPolicy;

/// Configuration for one optimization run.
///
/// Builders store values as given; out-of-range values are reported by
/// [`validate`](Self::validate) rather than silently clamped.
///
/// # Defaults
///
/// ```
/// use subset_evolve::EvolverConfig;
///
/// let config = EvolverConfig::default();
/// assert_eq!(config.population_size, 50);
/// assert_eq!(config.cache_capacity, 5000);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use subset_evolve::{EvolverConfig, Selection};
///
/// let config = EvolverConfig::default()
///     .with_run_label("nightly-7")
///     .with_solution_length(42)
///     .with_population_size(100)
///     .with_selection(Selection::Tournament(3))
///     .with_mutation_rate(0.02)
///     .with_seed(7);
/// assert!(config.validate(1000).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EvolverConfig {
    /// Label attached to every observation record and the run summary.
    pub run_label: String,

    /// Number of items `L` in every candidate.
    pub solution_length: usize,

    /// Number of members `P` per generation.
    pub population_size: usize,

    /// Per-position probability of replacing an index (0.0–1.0).
    ///
    /// A rate around `1 / L` changes one position per offspring on average.
    pub mutation_rate: f64,

    /// Per-mating probability of recombining parents (0.0–1.0).
    pub crossover_rate: f64,

    /// Evaluation budget `E_max`.
    ///
    /// Every population member counts as one evaluation, whether it was
    /// served from the cache or not.
    pub max_evaluations: usize,

    /// Evaluations without champion improvement, `S_max`, required before
    /// the run may stop.
    pub stagnation_limit: usize,

    /// Absolute evaluation cap, regardless of stagnation.
    ///
    /// `None` (the default) lets an improving run overrun `max_evaluations`.
    pub evaluation_hard_cap: Option<usize>,

    /// Parent selection strategy.
    pub selection: Selection,

    /// Maximum number of memoized fitness values.
    pub cache_capacity: usize,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for EvolverConfig {
    fn default() -> Self {
        Self {
            run_label: "run".into(),
            solution_length: 10,
            population_size: 50,
            mutation_rate: 0.0116,
            crossover_rate: 0.5,
            max_evaluations: 30_000,
            stagnation_limit: 30_000,
            evaluation_hard_cap: None,
            selection: Selection::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            seed: None,
        }
    }
}

impl EvolverConfig {
    pub fn with_run_label(mut self, label: impl Into<String>) -> Self {
        self.run_label = label.into();
        self
    }

    pub fn with_solution_length(mut self, length: usize) -> Self {
        self.solution_length = length;
        self
    }

    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    pub fn with_max_evaluations(mut self, n: usize) -> Self {
        self.max_evaluations = n;
        self
    }

    pub fn with_stagnation_limit(mut self, n: usize) -> Self {
        self.stagnation_limit = n;
        self
    }

    pub fn with_evaluation_hard_cap(mut self, cap: usize) -> Self {
        self.evaluation_hard_cap = Some(cap);
        self
    }

    pub fn with_selection(mut self, sel: Selection) -> Self {
        self.selection = sel;
        self
    }

    /// Equivalent to `.with_selection(Selection::Tournament(k))`.
    pub fn with_tournament_size(self, k: usize) -> Self {
        self.with_selection(Selection::Tournament(k))
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The stopping rule described by this configuration.
    pub fn termination_policy(&self) -> TerminationPolicy {
        TerminationPolicy::new(self.max_evaluations, self.stagnation_limit)
            .with_hard_cap(self.evaluation_hard_cap)
    }

    /// Validates the configuration against a universe of `universe_len` items.
    pub fn validate(&self, universe_len: usize) -> Result<(), ConfigError> {
        if universe_len == 0 {
            return Err(ConfigError::EmptyUniverse);
        }
        if self.solution_length == 0 {
            return Err(ConfigError::ZeroSolutionLength);
        }
        if self.solution_length > universe_len {
            return Err(ConfigError::SolutionTooLong {
                length: self.solution_length,
                universe: universe_len,
            });
        }
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        check_probability("mutation_rate", self.mutation_rate)?;
        check_probability("crossover_rate", self.crossover_rate)?;
        if self.cache_capacity == 0 {
            return Err(ConfigError::ZeroCacheCapacity);
        }
        if self.selection == Selection::Tournament(0) {
            return Err(ConfigError::ZeroTournamentSize);
        }
        if let Some(cap) = self.evaluation_hard_cap {
            if cap < self.max_evaluations {
                return Err(ConfigError::HardCapBelowBudget {
                    cap,
                    max_evaluations: self.max_evaluations,
                });
            }
        }
        Ok(())
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ProbabilityOutOfRange { name, value })
    }
}
