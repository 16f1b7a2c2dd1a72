//! PatternLab Environment Boundary
//!
//! The pattern engines know nothing about users, sessions or storage. This
//! crate is the seam between them and the collaborators that do:
//!
//! - **Context**: time, sleep and key derivation behind [`LabContext`], so
//!   the same code runs against the real clock ([`TokioContext`]) or a
//!   seeded virtual one in simulation
//! - **Sessions**: [`SessionService`] issues signed tokens and answers the
//!   session check with an identity or [`SessionCheck::Unauthenticated`]
//! - **Progress**: [`ProgressStore`] upserts per-user, per-pattern status,
//!   in memory or persisted with sled
//!
//! # Example
//!
//! ```ignore
//! use patternlab_env::{InMemoryProgressStore, ProgressStatus, ProgressStore, TokioContext};
//!
//! let ctx = TokioContext::shared();
//! let store = InMemoryProgressStore::new(ctx.clone());
//! store.update(user.id, "observer", ProgressStatus::Completed).await?;
//! ```

mod context;
mod error;
mod progress;
mod session;
mod tokio_impl;
mod types;

pub use context::LabContext;
pub use error::EnvError;
pub use progress::{
    is_completed, InMemoryProgressStore, ProgressStats, ProgressStore, SledProgressStore,
};
pub use session::{SessionCheck, SessionService, SessionToken};
pub use tokio_impl::TokioContext;
pub use types::{ProgressRecord, ProgressStatus, UserId, UserIdentity};
