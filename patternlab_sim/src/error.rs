//! Error types for the simulation harness.

use patternlab_env::EnvError;
use thiserror::Error;

/// Errors raised by the harness itself. Scenario failures are not errors;
/// they are reported through `ScenarioResult`.
#[derive(Debug, Error)]
pub enum SimError {
    /// Session or progress collaborator failed
    #[error(transparent)]
    Env(#[from] EnvError),

    /// Progress was requested without a valid session
    #[error("Not authenticated")]
    Unauthenticated,

    /// Command-line options that cannot be combined
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Export file could not be written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
