//! Budget- and stagnation-aware stopping rule.

/// Decides at each generation boundary whether the run should stop.
///
/// The run stops once the evaluation budget is spent **and** the champion has
/// not improved for `stagnation_limit` evaluations. A run that is still
/// improving may therefore overrun `max_evaluations`. An optional hard cap
/// bounds that overrun absolutely.
///
/// ```
/// use subset_evolve::TerminationPolicy;
///
/// let policy = TerminationPolicy::new(100, 50);
/// assert!(!policy.should_stop(90, 0));    // budget not spent
/// assert!(!policy.should_stop(120, 100)); // spent, but improved recently
/// assert!(policy.should_stop(150, 100));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminationPolicy {
    max_evaluations: usize,
    stagnation_limit: usize,
    hard_cap: Option<usize>,
}

impl TerminationPolicy {
    pub fn new(max_evaluations: usize, stagnation_limit: usize) -> Self {
        Self {
            max_evaluations,
            stagnation_limit,
            hard_cap: None,
        }
    }

    /// Stops unconditionally once `cap` evaluations have been spent.
    pub fn with_hard_cap(mut self, cap: Option<usize>) -> Self {
        self.hard_cap = cap;
        self
    }

    pub fn max_evaluations(&self) -> usize {
        self.max_evaluations
    }

    pub fn stagnation_limit(&self) -> usize {
        self.stagnation_limit
    }

    pub fn hard_cap(&self) -> Option<usize> {
        self.hard_cap
    }

    pub fn should_stop(&self, evaluations: usize, last_improvement_evaluation: usize) -> bool {
        if self.hard_cap.is_some_and(|cap| evaluations >= cap) {
            return true;
        }

        let budget_spent = evaluations >= self.max_evaluations;
        let stagnated =
            evaluations.saturating_sub(last_improvement_evaluation) >= self.stagnation_limit;
        budget_spent && stagnated
    }
}
