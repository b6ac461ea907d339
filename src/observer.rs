//! Per-generation observation records and where they go.
//!
//! Observation is informational only: sinks receive a shared reference to
//! each record and cannot influence the run.

use std::fmt;
use std::io::Write;

/// One generation's statistics, emitted after its evaluation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationRecord {
    pub run_label: String,
    /// 0 for the initial population.
    pub generation: usize,
    /// Evaluations spent so far, including this generation.
    pub evaluations: usize,
    pub best_ever_fitness: f64,
    pub population_best: f64,
    pub population_worst: f64,
    pub population_mean: f64,
    pub population_median: f64,
    pub population_stddev: f64,
    /// Champion's indices in ascending order.
    pub champion_indices: Vec<usize>,
}

impl GenerationRecord {
    /// Detail-log line: label, generation, the six fitness figures rounded to
    /// three decimals, then the champion's sorted indices, comma-separated.
    pub fn to_csv_line(&self) -> String {
        let mut fields = vec![self.run_label.clone(), self.generation.to_string()];
        fields.extend(
            [
                self.best_ever_fitness,
                self.population_best,
                self.population_worst,
                self.population_mean,
                self.population_median,
                self.population_stddev,
            ]
            .iter()
            .map(|v| round3(*v)),
        );
        fields.extend(self.champion_indices.iter().map(|i| i.to_string()));
        fields.join(",")
    }
}

fn round3(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    // Avoid printing "-0.0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format_fitness(rounded)
}

/// Shortest round-trip form, but integral values keep one decimal place
/// (`7.0`, not `7`) so fitness columns always read as floats.
pub(crate) fn format_fitness(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Receives one record per generation.
pub trait ObservationSink {
    fn observe(&mut self, record: &GenerationRecord);
}

impl ObservationSink for Vec<GenerationRecord> {
    fn observe(&mut self, record: &GenerationRecord) {
        self.push(record.clone());
    }
}

impl<S: ObservationSink + ?Sized> ObservationSink for &mut S {
    fn observe(&mut self, record: &GenerationRecord) {
        (**self).observe(record);
    }
}

impl<S: ObservationSink + ?Sized> ObservationSink for Box<S> {
    fn observe(&mut self, record: &GenerationRecord) {
        (**self).observe(record);
    }
}

/// Discards every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ObservationSink for NullSink {
    fn observe(&mut self, _record: &GenerationRecord) {}
}

/// Emits each record as a structured `info` event on the `subset_evolve::observer`
/// target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ObservationSink for TracingSink {
    fn observe(&mut self, record: &GenerationRecord) {
        tracing::info!(
            run_label = %record.run_label,
            generation = record.generation,
            evaluations = record.evaluations,
            best_ever = record.best_ever_fitness,
            best = record.population_best,
            worst = record.population_worst,
            mean = record.population_mean,
            median = record.population_median,
            stddev = record.population_stddev,
            champion = ?record.champion_indices,
            "generation observed"
        );
    }
}

/// Appends [`GenerationRecord::to_csv_line`] lines to a writer.
///
/// Write failures are logged and otherwise ignored.
#[derive(Debug)]
pub struct CsvSink<W: Write> {
    writer: W,
    failures: usize,
}

impl<W: Write> CsvSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            failures: 0,
        }
    }

    /// Number of records that could not be written.
    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ObservationSink for CsvSink<W> {
    fn observe(&mut self, record: &GenerationRecord) {
        let line = record.to_csv_line();
        if let Err(err) = writeln!(self.writer, "{line}").and_then(|_| self.writer.flush()) {
            self.failures += 1;
            tracing::warn!(
                run_label = %record.run_label,
                generation = record.generation,
                err = %err,
                "failed to write observation record"
            );
        }
    }
}

/// Terminal artifact of a successful run.
///
/// Displays as `run_label, best_ever_fitness, elapsed_seconds, item, item, ...`
/// with items sorted alphabetically and elapsed time truncated to seconds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunSummary {
    pub run_label: String,
    pub best_ever_fitness: f64,
    pub elapsed_seconds: u64,
    pub items: Vec<String>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}",
            self.run_label,
            format_fitness(self.best_ever_fitness),
            self.elapsed_seconds
        )?;
        for item in &self.items {
            write!(f, ", {item}")?;
        }
        Ok(())
    }
}
