//! The State Engine - Document Publishing Workflow
//!
//! A document moves through a fixed chain of states:
//!
//! ```text
//!   Draft  <-->  Review  <-->  Published
//! ```
//!
//! Each state decides what the document may do and which states are
//! adjacent. Transitions past either end of the chain return `None`, and the
//! owning [`Document`] keeps its current state.

use crate::error::PatternError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One state of the publishing workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DocumentState {
    #[default]
    Draft,
    Review,
    Published,
}

impl DocumentState {
    pub fn name(&self) -> &'static str {
        match self {
            DocumentState::Draft => "Draft",
            DocumentState::Review => "Review",
            DocumentState::Published => "Published",
        }
    }

    pub fn can_edit(&self) -> bool {
        matches!(self, DocumentState::Draft)
    }

    pub fn can_review(&self) -> bool {
        matches!(self, DocumentState::Draft)
    }

    pub fn can_publish(&self) -> bool {
        matches!(self, DocumentState::Review)
    }

    /// The following state, or `None` from the terminal state.
    pub fn next(&self) -> Option<DocumentState> {
        match self {
            DocumentState::Draft => Some(DocumentState::Review),
            DocumentState::Review => Some(DocumentState::Published),
            DocumentState::Published => None,
        }
    }

    /// The preceding state, or `None` from the initial state.
    pub fn previous(&self) -> Option<DocumentState> {
        match self {
            DocumentState::Draft => None,
            DocumentState::Review => Some(DocumentState::Draft),
            DocumentState::Published => Some(DocumentState::Review),
        }
    }
}

impl fmt::Display for DocumentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A document that delegates its permissions to its current state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    state: DocumentState,
    content: String,
}

impl Document {
    /// Creates an empty draft.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DocumentState {
        self.state
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Advances to the next state. Returns false (state unchanged) at the end
    /// of the chain.
    pub fn next_state(&mut self) -> bool {
        match self.state.next() {
            Some(next) => {
                self.state = next;
                true
            }
            None => false,
        }
    }

    /// Steps back to the previous state. Returns false (state unchanged) at
    /// the start of the chain.
    pub fn previous_state(&mut self) -> bool {
        match self.state.previous() {
            Some(previous) => {
                self.state = previous;
                true
            }
            None => false,
        }
    }

    /// Replaces the content if the current state allows editing.
    pub fn edit(&mut self, content: impl Into<String>) -> Result<(), PatternError> {
        if !self.state.can_edit() {
            return Err(PatternError::EditLocked(self.state.name()));
        }
        self.content = content.into();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_flags() {
        let draft = DocumentState::Draft;
        assert!(draft.can_edit() && draft.can_review() && !draft.can_publish());

        let review = DocumentState::Review;
        assert!(!review.can_edit() && !review.can_review() && review.can_publish());

        let published = DocumentState::Published;
        assert!(!published.can_edit() && !published.can_review() && !published.can_publish());
    }

    #[test]
    fn test_forward_transitions_stop_at_published() {
        let mut doc = Document::new();
        assert_eq!(doc.state(), DocumentState::Draft);

        assert!(doc.next_state());
        assert_eq!(doc.state(), DocumentState::Review);
        assert!(doc.next_state());
        assert_eq!(doc.state(), DocumentState::Published);

        assert!(!doc.next_state());
        assert_eq!(doc.state(), DocumentState::Published);
    }

    #[test]
    fn test_backward_transitions_stop_at_draft() {
        let mut doc = Document::new();
        doc.next_state();
        doc.next_state();

        assert!(doc.previous_state());
        assert!(doc.previous_state());
        assert_eq!(doc.state(), DocumentState::Draft);

        assert!(!doc.previous_state());
        assert_eq!(doc.state(), DocumentState::Draft);
    }

    #[test]
    fn test_edit_only_in_draft() {
        let mut doc = Document::new();
        doc.edit("first draft").unwrap();
        assert_eq!(doc.content(), "first draft");

        doc.next_state();
        let err = doc.edit("sneaky change").unwrap_err();
        assert!(matches!(err, PatternError::EditLocked("Review")));
        assert_eq!(doc.content(), "first draft");
    }

    #[test]
    fn test_state_names() {
        assert_eq!(DocumentState::Review.to_string(), "Review");
        assert_eq!(DocumentState::default(), DocumentState::Draft);
    }
}
