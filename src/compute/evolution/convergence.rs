//! Generation loop and stopping rule.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use log::{debug, info, warn};

use crate::error::OptimizerError;
use crate::schema::{
    BestCandidate, BestReporting, OptimizerConfig, RunHistory, RunPhase, RunProgress, RunResult,
    RunStats, StagnationRule, StopReason,
};

use super::candidate::{Candidate, CandidateRng, Population};
use super::engine::evolve;
use super::fitness::{DomainError, FitnessEvaluator, FitnessSummary};

/// Per-run bookkeeping, updated once per generation.
#[derive(Debug, Clone)]
pub struct RunState {
    generation: usize,
    best_fitness: f64,
    stagnation: usize,
    history: RunHistory,
    phase: RunPhase,
}

impl RunState {
    /// State for a freshly graded generation 0.
    pub fn new(initial: &FitnessSummary) -> Self {
        Self {
            generation: 0,
            best_fitness: initial.mean,
            stagnation: 0,
            history: RunHistory {
                average_fitness: vec![initial.mean],
                best_fitness: vec![initial.best],
                fitness_std: vec![initial.std],
            },
            phase: RunPhase::Running,
        }
    }

    /// Placeholder until generation 0 has been graded.
    fn pending() -> Self {
        Self {
            generation: 0,
            best_fitness: f64::NEG_INFINITY,
            stagnation: 0,
            history: RunHistory::default(),
            phase: RunPhase::Initializing,
        }
    }

    /// Record the next generation's fitness and update the stagnation counter.
    ///
    /// A strictly better average resets the counter and an exact repeat of the
    /// best average increments it. A worse average only counts under
    /// [`StagnationRule::CountRegressions`].
    pub fn observe(&mut self, summary: &FitnessSummary, rule: StagnationRule) {
        let average = summary.mean;
        if average > self.best_fitness {
            self.best_fitness = average;
            self.stagnation = 0;
        } else if average == self.best_fitness {
            self.stagnation += 1;
        } else if rule == StagnationRule::CountRegressions {
            self.stagnation += 1;
        }

        self.generation += 1;
        self.history.average_fitness.push(average);
        self.history.best_fitness.push(summary.best);
        self.history.fitness_std.push(summary.std);
    }

    /// Whether the stagnation counter has reached `threshold`.
    pub fn is_converged(&self, threshold: usize) -> bool {
        self.stagnation >= threshold
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Best average fitness seen so far.
    pub fn best_fitness(&self) -> f64 {
        self.best_fitness
    }

    pub fn stagnation(&self) -> usize {
        self.stagnation
    }

    pub fn history(&self) -> &RunHistory {
        &self.history
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Average fitness of the latest generation.
    pub fn current_fitness(&self) -> f64 {
        self.history
            .average_fitness
            .last()
            .copied()
            .unwrap_or(self.best_fitness)
    }

    fn finish(&mut self, reason: StopReason) {
        self.phase = match reason {
            StopReason::Converged => RunPhase::Converged,
            StopReason::MaxGenerations | StopReason::Cancelled => RunPhase::Stopped,
        };
    }
}

/// Drives the generation loop until the population stagnates.
pub struct Optimizer {
    config: OptimizerConfig,
    seed: u64,
    rng: CandidateRng,
    evaluator: FitnessEvaluator,
    population: Population,
    state: RunState,
    evaluations: u64,
    cancelled: Arc<AtomicBool>,
}

impl Optimizer {
    /// Create an optimizer. Rejects invalid configurations before any work.
    pub fn new(config: OptimizerConfig) -> Result<Self, OptimizerError> {
        config.validate()?;

        let seed = config.random_seed.unwrap_or_else(rand::random);
        let rng = CandidateRng::new(seed, config.modes.sampling);
        let evaluator = FitnessEvaluator::new(config.modes.objective, config.parallel_evaluation);

        Ok(Self {
            config,
            seed,
            rng,
            evaluator,
            population: Vec::new(),
            state: RunState::pending(),
            evaluations: 0,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Get cancellation handle.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Seed actually used, including one drawn from entropy.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn population(&self) -> &[Candidate] {
        &self.population
    }

    /// Run state. Its phase is `Initializing` until generation 0 exists.
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Build and grade generation 0.
    pub fn initialize(&mut self) -> Result<(), OptimizerError> {
        let size = self.config.population.size;
        self.population = self.rng.population(size, &self.config.bounds);
        let summary = self.evaluator.summarize(&self.population)?;
        self.evaluations = size as u64;
        self.state = RunState::new(&summary);
        debug!("generation 0: average fitness {:.6}", summary.mean);
        Ok(())
    }

    /// Produce and grade one generation. Initializes first if needed.
    pub fn step(&mut self) -> Result<FitnessSummary, OptimizerError> {
        if self.state.phase() == RunPhase::Initializing {
            self.initialize()?;
        }

        let next = evolve(&self.population, &self.config, &self.evaluator, &mut self.rng)?;
        self.population = next.population;
        let summary = self.evaluator.summarize(&self.population)?;
        // One pass to rank the old population, one to grade the new one.
        self.evaluations += 2 * self.population.len() as u64;

        self.state.observe(&summary, self.config.modes.stagnation);
        debug!(
            "generation {}: average fitness {:.6}, best {:.6}, stagnation {}",
            self.state.generation(),
            summary.mean,
            self.state.best_fitness(),
            self.state.stagnation()
        );
        Ok(summary)
    }

    /// Check if the loop should stop.
    fn should_stop(&self) -> Option<StopReason> {
        if self.cancelled.load(Ordering::Relaxed) {
            return Some(StopReason::Cancelled);
        }

        let state = &self.state;
        if state.phase() == RunPhase::Initializing {
            return None;
        }
        if state.is_converged(self.config.termination.stagnation_threshold) {
            return Some(StopReason::Converged);
        }
        if state.generation() >= self.config.termination.max_generations {
            return Some(StopReason::MaxGenerations);
        }
        None
    }

    /// Get current progress.
    pub fn progress(&self) -> RunProgress {
        let state = &self.state;
        RunProgress {
            generation: state.generation(),
            average_fitness: state.current_fitness(),
            best_average_fitness: state.best_fitness(),
            stagnation: state.stagnation(),
            phase: state.phase(),
        }
    }

    /// Run to completion, reporting progress after generation 0 and after
    /// every later generation.
    pub fn run_with_callback<F>(&mut self, mut callback: F) -> Result<RunResult, OptimizerError>
    where
        F: FnMut(&RunProgress),
    {
        let start_time = Instant::now();
        info!(
            "starting run: population {}, seed {}, stagnation threshold {}",
            self.config.population.size, self.seed, self.config.termination.stagnation_threshold
        );

        self.initialize()?;
        callback(&self.progress());

        let stop_reason = loop {
            if let Some(reason) = self.should_stop() {
                break reason;
            }
            self.step()?;
            callback(&self.progress());
        };

        let elapsed = start_time.elapsed().as_secs_f64();
        self.finish(stop_reason, elapsed)
    }

    /// Run to completion (blocking).
    pub fn run(&mut self) -> Result<RunResult, OptimizerError> {
        self.run_with_callback(|_| {})
    }

    fn finish(
        &mut self,
        stop_reason: StopReason,
        elapsed_seconds: f64,
    ) -> Result<RunResult, OptimizerError> {
        let best = self.best_candidate()?;
        let state = &mut self.state;
        state.finish(stop_reason);

        match stop_reason {
            StopReason::Converged => info!(
                "converged after {} generations, average fitness {:.6}",
                state.generation(),
                state.current_fitness()
            ),
            StopReason::MaxGenerations => warn!(
                "generation cap {} reached before convergence (stagnation {})",
                self.config.termination.max_generations,
                state.stagnation()
            ),
            StopReason::Cancelled => warn!("run cancelled at generation {}", state.generation()),
        }

        Ok(RunResult {
            best,
            final_population: self.population.clone(),
            stats: RunStats {
                generations: state.generation(),
                population_size: self.population.len(),
                final_average_fitness: state.current_fitness(),
                best_average_fitness: state.best_fitness(),
                total_evaluations: self.evaluations,
                elapsed_seconds,
                stop_reason,
            },
            history: state.history().clone(),
        })
    }

    /// The reported outcome, per [`BestReporting`].
    fn best_candidate(&mut self) -> Result<BestCandidate, OptimizerError> {
        match self.config.modes.reporting {
            BestReporting::PopulationHead => {
                let head = self
                    .population
                    .first()
                    .copied()
                    .ok_or(DomainError::EmptyPopulation)?;
                let fitness = self.state.current_fitness();
                Ok(BestCandidate {
                    x: head.x,
                    y: head.y,
                    fitness,
                })
            }
            BestReporting::Reranked => {
                let (candidate, fitness) = self.evaluator.fittest(&self.population)?;
                self.evaluations += self.population.len() as u64;
                Ok(BestCandidate {
                    x: candidate.x,
                    y: candidate.y,
                    fitness,
                })
            }
        }
    }
}
