//! Error types for the PatternLab environment boundary.

use thiserror::Error;

/// Errors that can occur talking to the session or progress collaborators.
#[derive(Debug, Error)]
pub enum EnvError {
    /// Request was rejected before reaching storage
    #[error("Validation error: {0}")]
    Validation(String),

    /// The backing store failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// A record or token could not be encoded/decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A session token could not be produced
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

impl EnvError {
    /// Creates a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a storage error.
    pub fn storage(msg: impl std::fmt::Display) -> Self {
        Self::Storage(msg.to_string())
    }
}

impl From<serde_json::Error> for EnvError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<sled::Error> for EnvError {
    fn from(e: sled::Error) -> Self {
        Self::Storage(e.to_string())
    }
}
