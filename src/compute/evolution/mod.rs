//! Evolutionary search for the maximum of the objective.
//!
//! # Overview
//!
//! - **Candidates** (`candidate`): points, seeded random generation, mutation and crossover
//! - **Fitness** (`fitness`): the objective, population grading and ranking
//! - **Engine** (`engine`): one generation of rank, retain, diversify, mutate and breed
//! - **Convergence** (`convergence`): the generation loop and its stagnation rule
//!
//! # Example
//!
//! ```rust,no_run
//! use maxima_ga::compute::evolution::Optimizer;
//! use maxima_ga::schema::OptimizerConfig;
//!
//! let config = OptimizerConfig {
//!     random_seed: Some(42),
//!     ..Default::default()
//! };
//!
//! let mut optimizer = Optimizer::new(config).unwrap();
//! let result = optimizer
//!     .run_with_callback(|progress| {
//!         println!(
//!             "Generation {}: average fitness = {:.4}",
//!             progress.generation, progress.average_fitness
//!         );
//!     })
//!     .unwrap();
//!
//! println!("Best: ({:.4}, {:.4})", result.best.x, result.best.y);
//! ```

mod candidate;
mod convergence;
mod engine;
mod fitness;

pub use candidate::{Axis, Candidate, CandidateRng, Population, crossover};
pub use convergence::{Optimizer, RunState};
pub use engine::{Breakdown, Generation, evolve};
pub use fitness::{DomainError, FitnessEvaluator, FitnessSummary};
