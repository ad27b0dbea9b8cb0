//! Crate-level error types.

use thiserror::Error;

use crate::env::EpisodeState;
use crate::validation::ValidationError;

/// Entity tables could not be turned into a registry.
///
/// Carries every problem found, not just the first.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid entity tables: {}", summarize(.issues))]
pub struct ConfigurationError {
    /// All detected issues.
    pub issues: Vec<ValidationError>,
}

fn summarize(issues: &[ValidationError]) -> String {
    match issues {
        [] => "no issues".to_string(),
        [only] => only.message.clone(),
        [first, rest @ ..] => format!("{} (and {} more)", first.message, rest.len()),
    }
}

/// Misuse of the episode protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EpisodeError {
    /// `step` was called before `reset` or after the episode ended.
    #[error("step called while episode is {0:?}; call reset first")]
    NotRunning(EpisodeState),
}

/// Errors from the configuration and table surfaces.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("table row {row}: {message}")]
    Table { row: usize, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
