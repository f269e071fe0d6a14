//! Error types shared across the simulator.

use thiserror::Error;

use crate::config::ConfigError;

/// Reasons a simulation request is rejected. No partial results are
/// produced on any of these.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Length of demand_kw ({actual}) must match length of time ({expected})")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("invalid simulation config: {}", join_errors(.0))]
    InvalidConfig(Vec<ConfigError>),
}

fn join_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
