//! Objective function, population grading and ranking.

use std::cmp::Ordering;
use std::f64::consts::PI;

#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

use crate::schema::ObjectiveForm;

use super::candidate::Candidate;

/// Objective evaluation failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    #[error("ln(x² + y²) is undefined at ({x}, {y})")]
    UndefinedLogarithm { x: f64, y: f64 },
    #[error("Objective is not finite at ({x}, {y})")]
    NonFinite { x: f64, y: f64 },
    #[error("Cannot grade an empty population")]
    EmptyPopulation,
}

/// Aggregate fitness of one population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessSummary {
    /// Arithmetic mean, identical to [`FitnessEvaluator::grade`].
    pub mean: f64,
    /// Highest single-candidate fitness.
    pub best: f64,
    /// Population standard deviation.
    pub std: f64,
}

impl FitnessSummary {
    /// Summarize a non-empty slice of fitness values.
    pub fn from_scores(scores: &[f64]) -> Result<Self, DomainError> {
        if scores.is_empty() {
            return Err(DomainError::EmptyPopulation);
        }
        let n = scores.len() as f64;
        let mean = scores.iter().sum::<f64>() / n;
        let best = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
        Ok(Self {
            mean,
            best,
            std: variance.sqrt(),
        })
    }
}

/// Evaluates candidates against the objective.
///
/// Stateless apart from its settings; evaluation order never affects results.
#[derive(Debug, Clone, Copy)]
pub struct FitnessEvaluator {
    form: ObjectiveForm,
    parallel: bool,
}

impl FitnessEvaluator {
    /// Create a new fitness evaluator.
    pub fn new(form: ObjectiveForm, parallel: bool) -> Self {
        Self { form, parallel }
    }

    /// Fitness of one candidate.
    pub fn fitness(&self, candidate: &Candidate) -> Result<f64, DomainError> {
        let Candidate { x, y } = *candidate;
        if !x.is_finite() || !y.is_finite() {
            return Err(DomainError::NonFinite { x, y });
        }

        let radius_sq = x * x + y * y;
        if radius_sq <= 0.0 {
            return Err(DomainError::UndefinedLogarithm { x, y });
        }

        let phase = PI * 10.0 * x + 10.0 / (1.0 + y * y);
        let log = radius_sq.ln();
        let value = match self.form {
            ObjectiveForm::Nested => (phase + log).sin(),
            ObjectiveForm::Additive => phase.sin() + log,
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(DomainError::NonFinite { x, y })
        }
    }

    /// Fitness of every candidate, in population order.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn evaluate(&self, population: &[Candidate]) -> Result<Vec<f64>, DomainError> {
        if self.parallel {
            // Indexed collect keeps population order.
            population.par_iter().map(|c| self.fitness(c)).collect()
        } else {
            population.iter().map(|c| self.fitness(c)).collect()
        }
    }

    /// Fitness of every candidate, in population order.
    #[cfg(target_arch = "wasm32")]
    pub fn evaluate(&self, population: &[Candidate]) -> Result<Vec<f64>, DomainError> {
        // Sequential evaluation for WASM
        let _ = self.parallel;
        population.iter().map(|c| self.fitness(c)).collect()
    }

    /// Average fitness of the population.
    pub fn grade(&self, population: &[Candidate]) -> Result<f64, DomainError> {
        Ok(self.summarize(population)?.mean)
    }

    /// Mean, best and spread of the population's fitness.
    pub fn summarize(&self, population: &[Candidate]) -> Result<FitnessSummary, DomainError> {
        FitnessSummary::from_scores(&self.evaluate(population)?)
    }

    /// Candidates sorted from fittest to least fit.
    ///
    /// Equal fitness is broken by the larger x, then the larger y.
    pub fn rank(&self, population: &[Candidate]) -> Result<Vec<Candidate>, DomainError> {
        let scores = self.evaluate(population)?;
        let mut graded: Vec<(f64, Candidate)> =
            scores.into_iter().zip(population.iter().copied()).collect();
        graded.sort_by(descending);
        Ok(graded.into_iter().map(|(_, c)| c).collect())
    }

    /// The fittest candidate and its fitness, using the ranking order.
    pub fn fittest(&self, population: &[Candidate]) -> Result<(Candidate, f64), DomainError> {
        let scores = self.evaluate(population)?;
        scores
            .into_iter()
            .zip(population.iter().copied())
            .min_by(descending)
            .map(|(fitness, candidate)| (candidate, fitness))
            .ok_or(DomainError::EmptyPopulation)
    }
}

/// Reverse order on `(fitness, x, y)`.
fn descending(a: &(f64, Candidate), b: &(f64, Candidate)) -> Ordering {
    b.0.total_cmp(&a.0)
        .then_with(|| b.1.x.total_cmp(&a.1.x))
        .then_with(|| b.1.y.total_cmp(&a.1.y))
}
