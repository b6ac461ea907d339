//! Genetic algorithm for fixed-size subset selection.
//!
//! Searches for the `L`-item subset of a fixed universe that maximizes a
//! caller-supplied fitness function. The evaluator is assumed to be expensive
//! (for example a trained regression model), so every score goes through a
//! bounded LRU memo keyed by the subset's canonical, order-independent key.
//!
//! # Components
//!
//! - [`Universe`]: ordered item labels mapped to dense indices
//! - [`Candidate`] / [`CandidateFactory`]: a duplicate-free index subset and
//!   its uniform random generator
//! - [`FitnessCache`]: LRU memoization of evaluator results
//! - [`operators`]: subset-preserving [`mutate`](operators::mutate) and
//!   [`crossover`](operators::crossover)
//! - [`Selection`]: fitness-biased parent selection
//! - [`ChampionTracker`]: best-ever solution, independent of the live
//!   population
//! - [`TerminationPolicy`]: evaluation budget AND stagnation stopping rule
//! - [`Evolver`]: the generational loop, returning a [`RunOutcome`]
//! - [`run_batch`]: independent runs fanned out over threads
//!
//! # Observability
//!
//! Each generation produces a [`GenerationRecord`] for an
//! [`ObservationSink`]; the run itself logs through `tracing`.
//!
//! # References
//!
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"

mod batch;
mod cache;
mod candidate;
mod champion;
mod config;
mod error;
mod evaluator;
mod evolver;
mod observer;
pub mod operators;
mod population;
mod selection;
mod termination;
mod universe;

pub use batch::run_batch;
pub use cache::{FitnessCache, DEFAULT_CACHE_CAPACITY};
pub use candidate::{Candidate, CandidateFactory, CandidateKey};
pub use champion::{Champion, ChampionTracker};
pub use config::EvolverConfig;
pub use error::{ConfigError, Error, EvaluationError, Result};
pub use evaluator::FitnessEvaluator;
pub use evolver::{Evolver, RunOutcome};
pub use observer::{CsvSink, GenerationRecord, NullSink, ObservationSink, RunSummary, TracingSink};
pub use population::{FitnessStats, Member};
pub use selection::Selection;
pub use termination::TerminationPolicy;
pub use universe::Universe;
