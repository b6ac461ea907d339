//! Fan-out of independent runs.
//!
//! Runs share nothing mutable: each gets its own [`Evolver`], fitness cache,
//! random source and sink. With the `parallel` feature the runs are spread
//! over the rayon thread pool; otherwise they execute one after another.
//! Either way the results come back in input order and a failing run never
//! affects its siblings.

use crate::config::EvolverConfig;
use crate::error::Result;
use crate::evaluator::FitnessEvaluator;
use crate::evolver::{Evolver, RunOutcome};
use crate::observer::ObservationSink;
use crate::universe::Universe;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::instrument;

/// Runs one evolver per configuration.
///
/// `make_sink` builds the observation sink for each run from its
/// configuration, e.g. a [`CsvSink`](crate::CsvSink) per run label.
///
/// ```
/// use subset_evolve::{run_batch, EvaluationError, EvolverConfig, NullSink, Universe};
///
/// let universe = Universe::new(["A", "B", "C", "D"]).unwrap();
/// let configs: Vec<_> = (0..3)
///     .map(|seed| {
///         EvolverConfig::default()
///             .with_run_label(format!("seed-{seed}"))
///             .with_solution_length(2)
///             .with_population_size(8)
///             .with_max_evaluations(40)
///             .with_stagnation_limit(16)
///             .with_seed(seed)
///     })
///     .collect();
///
/// let eval = |items: &[&str]| -> Result<f64, EvaluationError> { Ok(items.len() as f64) };
/// let results = run_batch(&universe, configs, &eval, |_| NullSink);
/// assert_eq!(results.len(), 3);
/// assert!(results.iter().all(|r| r.is_ok()));
/// ```
#[cfg(feature = "parallel")]
#[instrument(level = "info", skip_all, fields(runs = configs.len()))]
pub fn run_batch<E, S, F>(
    universe: &Universe,
    configs: Vec<EvolverConfig>,
    evaluator: &E,
    make_sink: F,
) -> Vec<Result<RunOutcome>>
where
    E: FitnessEvaluator + Sync + ?Sized,
    S: ObservationSink,
    F: Fn(&EvolverConfig) -> S + Sync,
{
    configs
        .into_par_iter()
        .map(|config| run_one(universe, config, evaluator, &make_sink))
        .collect()
}

/// Runs one evolver per configuration, sequentially.
#[cfg(not(feature = "parallel"))]
#[instrument(level = "info", skip_all, fields(runs = configs.len()))]
pub fn run_batch<E, S, F>(
    universe: &Universe,
    configs: Vec<EvolverConfig>,
    evaluator: &E,
    make_sink: F,
) -> Vec<Result<RunOutcome>>
where
    E: FitnessEvaluator + ?Sized,
    S: ObservationSink,
    F: Fn(&EvolverConfig) -> S,
{
    configs
        .into_iter()
        .map(|config| run_one(universe, config, evaluator, &make_sink))
        .collect()
}

fn run_one<E, S, F>(
    universe: &Universe,
    config: EvolverConfig,
    evaluator: &E,
    make_sink: &F,
) -> Result<RunOutcome>
where
    E: FitnessEvaluator + ?Sized,
    S: ObservationSink,
    F: Fn(&EvolverConfig) -> S,
{
    let label = config.run_label.clone();
    let sink = make_sink(&config);
    let result = Evolver::new(universe, config).and_then(|evolver| evolver.run(evaluator, sink));

    match &result {
        Ok(outcome) => tracing::info!(run_label = %label, summary = %outcome.summary(), "run finished"),
        Err(err) => tracing::warn!(run_label = %label, err = %err, "run failed"),
    }
    result
}
