//! Schema module - Configuration and reporting types for the optimizer.

mod config;
mod report;

pub use config::*;
pub use report::*;
