//! Error types for the pattern engines.
//!
//! Boundary conditions (undo with nothing to undo, a transition past the
//! last state, attaching the same observer twice) are not errors and never
//! show up here. They are reported through `bool` returns or ignored.

use thiserror::Error;

/// Failures surfaced by the pattern engines.
#[derive(Debug, Error)]
pub enum PatternError {
    /// A builder was asked to produce a value with mandatory fields unset.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A query was issued on a connection that is not open.
    #[error("Not connected to database")]
    NotConnected,

    /// The document's current state does not permit editing.
    #[error("Document cannot be edited in the {0} state")]
    EditLocked(&'static str),

    /// An observer callback failed while being notified.
    #[error("Observer {observer_id} failed: {source}")]
    ObserverFailed {
        observer_id: String,
        #[source]
        source: ListenerError,
    },
}

impl PatternError {
    /// Creates a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Failure reported by an observer callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ListenerError(pub String);

impl ListenerError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}
