//! The fixed, ordered set of selectable items.

use crate::candidate::Candidate;
use crate::error::ConfigError;
use std::collections::HashMap;

/// Item labels mapped to dense indices `0..N`.
///
/// Built once per engine and never mutated afterwards. Candidates only carry
/// indices; the universe translates them back to labels for the evaluator and
/// for the run summary.
///
/// ```
/// use subset_evolve::Universe;
///
/// let universe = Universe::new(["A", "B", "C"]).unwrap();
/// assert_eq!(universe.len(), 3);
/// assert_eq!(universe.index_of("B"), Some(1));
/// assert_eq!(universe.label(2), Some("C"));
/// ```
#[derive(Debug, Clone)]
pub struct Universe {
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl Universe {
    /// Builds a universe from labels in order.
    ///
    /// Fails on an empty input or a repeated label.
    pub fn new<I, S>(labels: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(ConfigError::EmptyUniverse);
        }

        let mut index = HashMap::with_capacity(labels.len());
        for (i, label) in labels.iter().enumerate() {
            if index.insert(label.clone(), i).is_some() {
                return Err(ConfigError::DuplicateItem(label.clone()));
            }
        }

        Ok(Self { labels, index })
    }

    /// Number of items `N`.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false for a constructed universe.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Labels of a candidate's items, in candidate order.
    ///
    /// Candidates produced by the engine only hold in-range indices, so this
    /// never skips an entry for them.
    pub fn labels_of(&self, candidate: &Candidate) -> Vec<&str> {
        candidate
            .indices()
            .iter()
            .filter_map(|&i| self.label(i))
            .collect()
    }

    /// Labels of a candidate's items, sorted alphabetically.
    pub fn sorted_labels_of(&self, candidate: &Candidate) -> Vec<String> {
        let mut labels: Vec<String> = self
            .labels_of(candidate)
            .into_iter()
            .map(str::to_string)
            .collect();
        labels.sort();
        labels
    }
}
