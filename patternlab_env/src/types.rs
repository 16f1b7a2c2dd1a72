//! Common types shared across the PatternLab environment boundary.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a learner account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Creates a new random UserId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a deterministic UserId from a seed (for simulation).
    pub fn from_seed(seed: u64) -> Self {
        let mut bytes = [0u8; 16];
        bytes[0..8].copy_from_slice(&seed.to_le_bytes());
        bytes[8..16].copy_from_slice(&seed.wrapping_mul(0x517cc1b727220a95).to_le_bytes());
        Self(Uuid::from_bytes(bytes))
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Show first 8 chars for readability
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// The identity returned by a successful session check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: UserId,
    pub email: String,
    pub name: String,
}

impl UserIdentity {
    pub fn new(id: UserId, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            name: name.into(),
        }
    }
}

/// How far a learner has got with one pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl std::fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ProgressStatus::NotStarted => "not-started",
            ProgressStatus::InProgress => "in-progress",
            ProgressStatus::Completed => "completed",
        };
        write!(f, "{}", label)
    }
}

/// Stored progress for one (user, pattern) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub user_id: UserId,
    pub pattern_slug: String,
    pub status: ProgressStatus,

    /// Wall-clock milliseconds when the record last became completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at_ms: Option<u64>,

    /// Wall-clock milliseconds of the last update
    pub updated_at_ms: u64,
}

impl ProgressRecord {
    /// Creates a fresh record that has not been started.
    pub fn new(user_id: UserId, pattern_slug: impl Into<String>, now_ms: u64) -> Self {
        Self {
            user_id,
            pattern_slug: pattern_slug.into(),
            status: ProgressStatus::NotStarted,
            completed_at_ms: None,
            updated_at_ms: now_ms,
        }
    }

    /// Moves the record to `status`.
    ///
    /// The completion timestamp is set when the status becomes completed,
    /// kept when an already-completed record is completed again, and cleared
    /// when the status leaves completed.
    pub fn apply(&mut self, status: ProgressStatus, now_ms: u64) {
        match (self.status, status) {
            (ProgressStatus::Completed, ProgressStatus::Completed) => {}
            (_, ProgressStatus::Completed) => self.completed_at_ms = Some(now_ms),
            _ => self.completed_at_ms = None,
        }
        self.status = status;
        self.updated_at_ms = now_ms;
    }
}
