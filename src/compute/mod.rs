//! Compute module - The evolutionary optimizer.

pub mod evolution;

pub use evolution::{Candidate, Optimizer};
