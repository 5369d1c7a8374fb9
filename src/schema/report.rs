//! Progress and result types handed to reporting collaborators.
//!
//! Everything here is plain serializable data; charting and printing happen
//! outside the crate.

use serde::{Deserialize, Serialize};

use crate::compute::evolution::Candidate;

/// Per-generation statistics for plotting.
///
/// Every vector holds one entry per generation, starting with generation 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunHistory {
    /// Average fitness of each generation. This is the convergence signal.
    pub average_fitness: Vec<f64>,
    /// Fitness of the single best candidate of each generation.
    pub best_fitness: Vec<f64>,
    /// Population standard deviation of fitness.
    pub fitness_std: Vec<f64>,
}

impl RunHistory {
    /// Number of recorded generations.
    pub fn len(&self) -> usize {
        self.average_fitness.len()
    }

    pub fn is_empty(&self) -> bool {
        self.average_fitness.is_empty()
    }

    /// Running maximum of the average-fitness series.
    pub fn running_best(&self) -> Vec<f64> {
        self.average_fitness
            .iter()
            .scan(f64::NEG_INFINITY, |best, &value| {
                *best = best.max(value);
                Some(*best)
            })
            .collect()
    }
}

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum RunPhase {
    /// Generation 0 has not been graded yet.
    #[default]
    Initializing,
    /// Generations are being produced.
    Running,
    /// Stagnation threshold reached.
    Converged,
    /// Stopped by the generation cap or cancellation.
    Stopped,
}

/// Reason the run stopped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopReason {
    /// Stagnation counter reached the threshold.
    Converged,
    /// Hard generation cap hit before convergence.
    MaxGenerations,
    /// Cancel handle was set.
    Cancelled,
}

/// Progress update passed to callbacks after every generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunProgress {
    pub generation: usize,
    /// Average fitness of the current population.
    pub average_fitness: f64,
    /// Best average fitness seen so far.
    pub best_average_fitness: f64,
    /// Generations counted towards the stagnation threshold.
    pub stagnation: usize,
    pub phase: RunPhase,
}

/// The candidate reported as the outcome of a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BestCandidate {
    pub x: f64,
    pub y: f64,
    /// Reported fitness. Under `BestReporting::PopulationHead` this is the
    /// final population average, not the fitness of `(x, y)`.
    pub fitness: f64,
}

/// Statistics from a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStats {
    /// Generations produced after generation 0.
    pub generations: usize,
    pub population_size: usize,
    /// Average fitness of the final population.
    pub final_average_fitness: f64,
    /// Highest average fitness observed.
    pub best_average_fitness: f64,
    /// Objective evaluations spent on ranking and grading, plus the final
    /// rerank when the fittest member is reported.
    pub total_evaluations: u64,
    pub elapsed_seconds: f64,
    pub stop_reason: StopReason,
}

/// Final result of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub best: BestCandidate,
    pub final_population: Vec<Candidate>,
    pub stats: RunStats,
    pub history: RunHistory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_best() {
        let history = RunHistory {
            average_fitness: vec![0.1, 0.3, 0.2, 0.5, 0.4],
            ..Default::default()
        };
        assert_eq!(history.running_best(), vec![0.1, 0.3, 0.3, 0.5, 0.5]);
        assert_eq!(history.len(), 5);
    }

    #[test]
    fn test_result_serialization() {
        let result = RunResult {
            best: BestCandidate {
                x: 3.5,
                y: 4.25,
                fitness: 0.75,
            },
            final_population: vec![Candidate::new(3.5, 4.25)],
            stats: RunStats {
                generations: 1,
                population_size: 1,
                final_average_fitness: 0.75,
                best_average_fitness: 0.75,
                total_evaluations: 3,
                elapsed_seconds: 0.0,
                stop_reason: StopReason::Converged,
            },
            history: RunHistory {
                average_fitness: vec![0.5, 0.75],
                best_fitness: vec![0.5, 0.75],
                fitness_std: vec![0.0, 0.0],
            },
        };

        let json = serde_json::to_string(&result).unwrap();
        let parsed: RunResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.best, result.best);
        assert_eq!(parsed.history, result.history);
        assert_eq!(parsed.stats.stop_reason, StopReason::Converged);
    }
}
