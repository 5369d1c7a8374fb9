//! Maxima GA - Genetic algorithm search for the maximum of
//! `f(x, y) = sin(10πx + 10/(1+y²) + ln(x²+y²))` over a bounded rectangle.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration, progress and result types
//! - `compute`: The evolutionary search (candidates, fitness, engine, convergence)
//!
//! # Example
//!
//! ```rust,no_run
//! use maxima_ga::{Optimizer, OptimizerConfig};
//!
//! let mut config = OptimizerConfig::default();
//! config.population.size = 50;
//! config.random_seed = Some(7);
//!
//! let result = Optimizer::new(config).unwrap().run().unwrap();
//!
//! println!("Generations: {}", result.stats.generations);
//! println!("Best X and Y: {} {}", result.best.x, result.best.y);
//! println!("Best fitness: {}", result.best.fitness);
//! ```

pub mod compute;
pub mod error;
pub mod schema;

// Re-export commonly used types
pub use compute::{Candidate, Optimizer};
pub use error::OptimizerError;
pub use schema::{OptimizerConfig, RunResult};
