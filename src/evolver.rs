//! Generational loop execution.
//!
//! [`Evolver`] orchestrates one run:
//! initialization → evaluation → champion update → termination check →
//! selection → crossover → mutation → evaluation → ...
//!
//! A run is single-threaded and fully determined by its seed. The population
//! is replaced wholesale every generation; the best-ever solution survives in
//! the [`ChampionTracker`] instead.

use crate::cache::FitnessCache;
use crate::candidate::{Candidate, CandidateFactory};
use crate::champion::ChampionTracker;
use crate::config::EvolverConfig;
use crate::error::{EvaluationError, Result};
use crate::evaluator::FitnessEvaluator;
use crate::observer::{GenerationRecord, ObservationSink, RunSummary};
use crate::operators::{crossover, mutate};
use crate::population::{FitnessStats, Member};
use crate::termination::TerminationPolicy;
use crate::universe::Universe;
use crate::Error;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::instrument;

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_label: String,

    /// The best candidate seen during the entire run. Not necessarily a
    /// member of the final population.
    pub champion: Candidate,

    /// Fitness of `champion`.
    pub fitness: f64,

    /// Champion's item labels, sorted alphabetically.
    pub items: Vec<String>,

    /// Generations bred after the initial population.
    pub generations: usize,

    /// Population members evaluated, cache hits included.
    pub evaluations: usize,

    /// Evaluation count at the last champion improvement.
    pub last_improvement_evaluation: usize,

    /// Calls that reached the external evaluator (cache misses).
    pub evaluator_calls: u64,

    pub cache_hits: u64,

    /// Seed actually used, drawn at random when none was configured.
    pub seed: u64,

    pub elapsed: Duration,
}

impl RunOutcome {
    /// The one-line run summary.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            run_label: self.run_label.clone(),
            best_ever_fitness: self.fitness,
            elapsed_seconds: self.elapsed.as_secs(),
            items: self.items.clone(),
        }
    }
}

/// Executes one optimization run over a universe.
///
/// Each evolver owns its fitness cache; construct one per run.
///
/// # Usage
///
/// ```
/// use subset_evolve::{EvaluationError, Evolver, EvolverConfig, NullSink, Universe};
///
/// let universe = Universe::new(["A", "B", "C", "D", "E"]).unwrap();
/// let config = EvolverConfig::default()
///     .with_solution_length(2)
///     .with_population_size(10)
///     .with_max_evaluations(100)
///     .with_stagnation_limit(50)
///     .with_seed(1);
///
/// let vowels = |items: &[&str]| -> Result<f64, EvaluationError> {
///     Ok(items.iter().filter(|s| ["A", "E"].contains(*s)).count() as f64)
/// };
///
/// let outcome = Evolver::new(&universe, config).unwrap().run(&vowels, NullSink).unwrap();
/// assert_eq!(outcome.fitness, 2.0);
/// assert_eq!(outcome.items, vec!["A", "E"]);
/// ```
#[derive(Debug)]
pub struct Evolver<'u> {
    universe: &'u Universe,
    config: EvolverConfig,
    factory: CandidateFactory,
    policy: TerminationPolicy,
    cache: FitnessCache,
}

impl<'u> Evolver<'u> {
    /// Validates `config` against `universe` before anything is evaluated.
    pub fn new(universe: &'u Universe, config: EvolverConfig) -> Result<Self> {
        config.validate(universe.len())?;
        let factory = CandidateFactory::new(universe.len(), config.solution_length)?;
        let policy = config.termination_policy();
        let cache = FitnessCache::new(config.cache_capacity);

        Ok(Self {
            universe,
            config,
            factory,
            policy,
            cache,
        })
    }

    pub fn config(&self) -> &EvolverConfig {
        &self.config
    }

    /// Runs to termination and returns the champion.
    pub fn run<E, S>(self, evaluator: &E, sink: S) -> Result<RunOutcome>
    where
        E: FitnessEvaluator + ?Sized,
        S: ObservationSink,
    {
        self.run_with_cancel(evaluator, sink, None)
    }

    /// Runs with an optional cancellation flag.
    ///
    /// The flag is checked once per generation boundary. A cancelled run
    /// returns [`Error::Cancelled`]; no partial champion is reported.
    #[instrument(
        level = "info",
        skip_all,
        fields(
            run_label = %self.config.run_label,
            population_size = self.config.population_size,
            solution_length = self.config.solution_length,
            seed = tracing::field::Empty,
        )
    )]
    pub fn run_with_cancel<E, S>(
        mut self,
        evaluator: &E,
        mut sink: S,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<RunOutcome>
    where
        E: FitnessEvaluator + ?Sized,
        S: ObservationSink,
    {
        let start = Instant::now();
        let seed = self.config.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        tracing::Span::current().record("seed", seed);
        tracing::debug!("starting run");

        let mut tracker = ChampionTracker::new();
        let mut evaluations = 0usize;

        // Initializing
        let initial: Vec<Candidate> = (0..self.config.population_size)
            .map(|_| self.factory.generate(&mut rng))
            .collect();
        let mut population = self.evaluate_all(initial, evaluator, &mut evaluations)?;
        let mut generation = 0usize;
        self.observe_generation(generation, &population, evaluations, &mut tracker, &mut sink);

        loop {
            if self
                .policy
                .should_stop(evaluations, tracker.last_improvement_evaluation())
            {
                break;
            }
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    tracing::info!(generation, evaluations, "run cancelled");
                    return Err(Error::Cancelled { generation });
                }
            }

            let offspring = self.breed(&population, &mut rng);
            population = self.evaluate_all(offspring, evaluator, &mut evaluations)?;
            generation += 1;
            self.observe_generation(generation, &population, evaluations, &mut tracker, &mut sink);
        }

        let last_improvement_evaluation = tracker.last_improvement_evaluation();
        let champion = tracker
            .into_champion()
            .expect("a non-empty population always yields a champion");
        let items = self.universe.sorted_labels_of(&champion.candidate);

        let outcome = RunOutcome {
            run_label: self.config.run_label.clone(),
            champion: champion.candidate,
            fitness: champion.fitness,
            items,
            generations: generation,
            evaluations,
            last_improvement_evaluation,
            evaluator_calls: self.cache.misses(),
            cache_hits: self.cache.hits(),
            seed,
            elapsed: start.elapsed(),
        };

        tracing::info!(
            fitness = outcome.fitness,
            generations = outcome.generations,
            evaluations = outcome.evaluations,
            evaluator_calls = outcome.evaluator_calls,
            cache_hits = outcome.cache_hits,
            "run terminated"
        );

        Ok(outcome)
    }

    /// Selection, crossover, then mutation until the next generation is full.
    fn breed(&self, population: &[Member], rng: &mut StdRng) -> Vec<Candidate> {
        let size = self.config.population_size;
        let universe_len = self.universe.len();
        let mut next = Vec::with_capacity(size);

        while next.len() < size {
            let p1 = self.config.selection.select(population, rng);
            let p2 = self.config.selection.select(population, rng);

            let (c1, c2) = crossover(
                &population[p1].candidate,
                &population[p2].candidate,
                self.config.crossover_rate,
                rng,
            );

            for child in [c1, c2] {
                if next.len() >= size {
                    break;
                }
                next.push(mutate(&child, universe_len, self.config.mutation_rate, rng));
            }
        }

        next
    }

    /// Scores every candidate through the cache. The first failure aborts.
    fn evaluate_all<E>(
        &mut self,
        candidates: Vec<Candidate>,
        evaluator: &E,
        evaluations: &mut usize,
    ) -> Result<Vec<Member>>
    where
        E: FitnessEvaluator + ?Sized,
    {
        let universe = self.universe;
        let mut members = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let fitness = self
                .cache
                .get_or_compute(&candidate, |c| score(universe, evaluator, c))
                .inspect_err(|err| {
                    tracing::warn!(
                        candidate = %candidate.canonical_key(),
                        err = %err,
                        "evaluation failed, aborting run"
                    );
                })?;
            *evaluations += 1;
            members.push(Member::new(candidate, fitness));
        }

        Ok(members)
    }

    fn observe_generation<S: ObservationSink>(
        &self,
        generation: usize,
        population: &[Member],
        evaluations: usize,
        tracker: &mut ChampionTracker,
        sink: &mut S,
    ) {
        if tracker.observe(population, evaluations) {
            if let Some(champion) = tracker.champion() {
                tracing::info!(
                    generation,
                    evaluations,
                    fitness = champion.fitness,
                    "champion improved"
                );
            }
        }

        let (Some(stats), Some(champion)) = (FitnessStats::of(population), tracker.champion())
        else {
            return;
        };

        tracing::debug!(
            generation,
            evaluations,
            best_ever = champion.fitness,
            population_best = stats.best,
            "generation evaluated"
        );

        sink.observe(&GenerationRecord {
            run_label: self.config.run_label.clone(),
            generation,
            evaluations,
            best_ever_fitness: champion.fitness,
            population_best: stats.best,
            population_worst: stats.worst,
            population_mean: stats.mean,
            population_median: stats.median,
            population_stddev: stats.stddev,
            champion_indices: champion.candidate.sorted_indices(),
        });
    }
}

/// Calls the evaluator with the candidate's labels and rejects non-finite
/// scores, which would corrupt selection.
fn score<E>(
    universe: &Universe,
    evaluator: &E,
    candidate: &Candidate,
) -> std::result::Result<f64, EvaluationError>
where
    E: FitnessEvaluator + ?Sized,
{
    let labels = universe.labels_of(candidate);
    let fitness = evaluator.evaluate(&labels)?;
    if fitness.is_finite() {
        Ok(fitness)
    } else {
        Err(EvaluationError::NonFinite {
            items: labels.iter().map(|s| s.to_string()).collect(),
            value: fitness,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::observer::NullSink;
    use crate::Selection;
    use std::cell::Cell;

    fn letters(n: usize) -> Universe {
        Universe::new((0..n).map(|i| format!("item{i:03}"))).unwrap()
    }

    /// Sum of the numeric suffixes: best subset is the `L` highest indices.
    fn suffix_sum(items: &[&str]) -> std::result::Result<f64, EvaluationError> {
        items
            .iter()
            .map(|s| {
                s.trim_start_matches("item")
                    .parse::<f64>()
                    .map_err(|e| EvaluationError::failed(items, e.to_string()))
            })
            .sum()
    }

    fn base_config() -> EvolverConfig {
        EvolverConfig::default()
            .with_solution_length(5)
            .with_population_size(30)
            .with_mutation_rate(0.2)
            .with_crossover_rate(0.8)
            .with_max_evaluations(3000)
            .with_stagnation_limit(600)
            .with_seed(42)
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let u = letters(4);
        let err = Evolver::new(&u, base_config()).unwrap_err();
        assert_eq!(
            err,
            Error::Configuration(ConfigError::SolutionTooLong {
                length: 5,
                universe: 4
            })
        );
    }

    #[test]
    fn test_invalid_config_never_calls_evaluator() {
        let u = letters(10);
        let calls = Cell::new(0);
        let eval = |_: &[&str]| -> std::result::Result<f64, EvaluationError> {
            calls.set(calls.get() + 1);
            Ok(0.0)
        };
        let config = base_config().with_mutation_rate(2.0);
        let result = Evolver::new(&u, config).and_then(|e| e.run(&eval, NullSink));
        assert!(matches!(result, Err(Error::Configuration(_))));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_converges_on_suffix_sum() {
        let u = letters(20);
        let outcome = Evolver::new(&u, base_config())
            .unwrap()
            .run(&suffix_sum, NullSink)
            .unwrap();

        // Optimum: 15+16+17+18+19 = 85
        assert!(
            outcome.fitness >= 78.0,
            "expected near-optimal fitness, got {}",
            outcome.fitness
        );
        assert!(outcome.champion.is_valid(5, 20));
        assert_eq!(outcome.items.len(), 5);
    }

    #[test]
    fn test_records_one_per_generation() {
        let u = letters(20);
        let mut records: Vec<GenerationRecord> = Vec::new();
        let outcome = Evolver::new(&u, base_config())
            .unwrap()
            .run(&suffix_sum, &mut records)
            .unwrap();

        assert_eq!(records.len(), outcome.generations + 1);
        for (i, r) in records.iter().enumerate() {
            assert_eq!(r.generation, i);
            assert_eq!(r.evaluations, (i + 1) * 30);
            assert!(r.population_worst <= r.population_median);
            assert!(r.population_median <= r.population_best);
            assert!(r.population_best <= r.best_ever_fitness);
            assert!(r.champion_indices.windows(2).all(|w| w[0] < w[1]));
        }
        for w in records.windows(2) {
            assert!(w[1].best_ever_fitness >= w[0].best_ever_fitness);
        }
        let last = records.last().unwrap();
        assert_eq!(last.best_ever_fitness, outcome.fitness);
        assert_eq!(last.champion_indices, outcome.champion.sorted_indices());
    }

    #[test]
    fn test_cache_reduces_evaluator_calls() {
        let u = letters(8);
        let calls = Cell::new(0u64);
        let eval = |items: &[&str]| -> std::result::Result<f64, EvaluationError> {
            calls.set(calls.get() + 1);
            suffix_sum(items)
        };
        let config = base_config()
            .with_solution_length(3)
            .with_max_evaluations(2000)
            .with_stagnation_limit(500);
        let outcome = Evolver::new(&u, config).unwrap().run(&eval, NullSink).unwrap();

        // Only C(8,3) = 56 distinct subsets exist
        assert!(calls.get() <= 56);
        assert_eq!(outcome.evaluator_calls, calls.get());
        assert_eq!(
            outcome.evaluator_calls + outcome.cache_hits,
            outcome.evaluations as u64
        );
    }

    #[test]
    fn test_evaluation_error_aborts_run() {
        let u = letters(20);
        let calls = Cell::new(0);
        let eval = |items: &[&str]| -> std::result::Result<f64, EvaluationError> {
            calls.set(calls.get() + 1);
            if calls.get() == 7 {
                return Err(EvaluationError::failed(items, "model unavailable"));
            }
            Ok(1.0)
        };
        let err = Evolver::new(&u, base_config())
            .unwrap()
            .run(&eval, NullSink)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Evaluation(EvaluationError::Failed { .. })
        ));
    }

    #[test]
    fn test_non_finite_fitness_is_an_error() {
        let u = letters(10);
        let eval = |_: &[&str]| -> std::result::Result<f64, EvaluationError> { Ok(f64::NAN) };
        let err = Evolver::new(&u, base_config())
            .unwrap()
            .run(&eval, NullSink)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Evaluation(EvaluationError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_cancellation() {
        let u = letters(20);
        let config = base_config()
            .with_max_evaluations(usize::MAX)
            .with_stagnation_limit(usize::MAX);
        let cancel = Arc::new(AtomicBool::new(false));

        let flag = cancel.clone();
        let eval = move |items: &[&str]| -> std::result::Result<f64, EvaluationError> {
            // Trip the flag from inside the run; checked at the next boundary
            flag.store(true, Ordering::Relaxed);
            suffix_sum(items)
        };

        let err = Evolver::new(&u, config)
            .unwrap()
            .run_with_cancel(&eval, NullSink, Some(cancel))
            .unwrap_err();
        assert_eq!(err, Error::Cancelled { generation: 0 });
    }

    #[test]
    fn test_hard_cap_bounds_overrun() {
        let u = letters(30);
        // Strictly increasing fitness per call keeps the champion improving.
        let counter = Cell::new(0.0);
        let eval = |_: &[&str]| -> std::result::Result<f64, EvaluationError> {
            counter.set(counter.get() + 1.0);
            Ok(counter.get())
        };
        let config = base_config()
            .with_cache_capacity(1)
            .with_max_evaluations(300)
            .with_stagnation_limit(300)
            .with_evaluation_hard_cap(600);
        let outcome = Evolver::new(&u, config).unwrap().run(&eval, NullSink).unwrap();
        assert!(outcome.evaluations >= 600);
        assert!(outcome.evaluations < 600 + 30);
    }

    #[test]
    fn test_all_selection_strategies() {
        let u = letters(20);
        for selection in [
            Selection::Tournament(2),
            Selection::Tournament(4),
            Selection::Roulette,
            Selection::Rank,
        ] {
            let config = base_config().with_selection(selection);
            let outcome = Evolver::new(&u, config)
                .unwrap()
                .run(&suffix_sum, NullSink)
                .unwrap();
            assert!(
                outcome.fitness >= 70.0,
                "selection {selection:?} should make progress, got {}",
                outcome.fitness
            );
        }
    }

    #[test]
    fn test_summary_uses_sorted_labels() {
        let u = Universe::new(["zeta", "alpha", "mid"]).unwrap();
        let eval = |items: &[&str]| -> std::result::Result<f64, EvaluationError> {
            Ok(if items.contains(&"zeta") && items.contains(&"alpha") {
                1.0
            } else {
                0.0
            })
        };
        let config = base_config()
            .with_run_label("tiny")
            .with_solution_length(2)
            .with_population_size(6)
            .with_max_evaluations(60)
            .with_stagnation_limit(30);
        let outcome = Evolver::new(&u, config).unwrap().run(&eval, NullSink).unwrap();
        let line = outcome.summary().to_string();
        assert!(line.starts_with("tiny, 1.0, "), "unexpected summary {line}");
        assert!(line.ends_with(", alpha, zeta"), "unexpected summary {line}");
    }
}
