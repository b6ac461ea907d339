//! Best-ever tracking across generations.
//!
//! Generational replacement can lose the best member to drift; the champion
//! record cannot. It changes only on a strictly greater fitness.

use crate::candidate::Candidate;
use crate::population::{fittest, Member};

/// The best (candidate, fitness) pair seen so far in a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Champion {
    pub candidate: Candidate,
    pub fitness: f64,
    /// Evaluation count at which this champion was first observed.
    pub found_at_evaluation: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ChampionTracker {
    champion: Option<Champion>,
    last_improvement_evaluation: usize,
}

impl ChampionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans a generation and promotes its fittest member if it strictly beats
    /// the current champion (or if there is none yet).
    ///
    /// `evaluations` is the run's evaluation count after this generation was
    /// evaluated; it becomes the last-improvement mark on promotion.
    /// Returns whether the champion changed.
    pub fn observe(&mut self, population: &[Member], evaluations: usize) -> bool {
        let Some(idx) = fittest(population) else {
            return false;
        };
        let best = &population[idx];

        let improved = match &self.champion {
            Some(current) => best.fitness > current.fitness,
            None => true,
        };

        if improved {
            self.champion = Some(Champion {
                candidate: best.candidate.clone(),
                fitness: best.fitness,
                found_at_evaluation: evaluations,
            });
            self.last_improvement_evaluation = evaluations;
        }
        improved
    }

    pub fn champion(&self) -> Option<&Champion> {
        self.champion.as_ref()
    }

    pub fn best_fitness(&self) -> Option<f64> {
        self.champion.as_ref().map(|c| c.fitness)
    }

    pub fn last_improvement_evaluation(&self) -> usize {
        self.last_improvement_evaluation
    }

    pub fn into_champion(self) -> Option<Champion> {
        self.champion
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gen(fitnesses: &[f64]) -> Vec<Member> {
        fitnesses
            .iter()
            .enumerate()
            .map(|(i, &f)| Member::new(Candidate::new(vec![i, i + 10]), f))
            .collect()
    }

    #[test]
    fn test_first_observation_always_promotes() {
        let mut t = ChampionTracker::new();
        assert!(t.observe(&gen(&[-3.0, -1.0, -2.0]), 3));
        let c = t.champion().unwrap();
        assert_eq!(c.fitness, -1.0);
        assert_eq!(c.candidate.indices(), &[1, 11]);
        assert_eq!(t.last_improvement_evaluation(), 3);
    }

    #[test]
    fn test_never_regresses() {
        let mut t = ChampionTracker::new();
        t.observe(&gen(&[1.0, 5.0]), 2);
        assert!(!t.observe(&gen(&[0.0, 2.0]), 4));
        assert_eq!(t.best_fitness(), Some(5.0));
        assert_eq!(t.last_improvement_evaluation(), 2);
    }

    #[test]
    fn test_equal_fitness_does_not_promote() {
        let mut t = ChampionTracker::new();
        t.observe(&gen(&[5.0]), 1);
        let first = t.champion().unwrap().candidate.clone();

        let other = vec![Member::new(Candidate::new(vec![7, 8]), 5.0)];
        assert!(!t.observe(&other, 2));
        assert_eq!(t.champion().unwrap().candidate, first);
        assert_eq!(t.last_improvement_evaluation(), 1);
    }

    #[test]
    fn test_tracks_running_maximum() {
        let generations = [
            vec![0.1, 0.3],
            vec![0.2, 0.25],
            vec![0.5, 0.0],
            vec![0.4, 0.45],
            vec![0.9, 0.1],
        ];
        let mut t = ChampionTracker::new();
        let mut true_max = f64::NEG_INFINITY;
        let mut previous = f64::NEG_INFINITY;
        for (i, fits) in generations.iter().enumerate() {
            t.observe(&gen(fits), (i + 1) * 2);
            true_max = fits.iter().cloned().fold(true_max, f64::max);
            let best = t.best_fitness().unwrap();
            assert!(best >= previous);
            assert_eq!(best, true_max);
            previous = best;
        }
        assert_eq!(t.last_improvement_evaluation(), 10);
    }

    #[test]
    fn test_empty_population_is_ignored() {
        let mut t = ChampionTracker::new();
        assert!(!t.observe(&[], 0));
        assert!(t.champion().is_none());
    }
}
