//! Crate-level error type.

use crate::compute::evolution::DomainError;
use crate::schema::ConfigError;

/// Errors that end a run. None of them is recoverable mid-run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OptimizerError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Fitness evaluation failed: {0}")]
    Domain(#[from] DomainError),
}
