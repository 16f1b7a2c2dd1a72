//! PatternLab Deterministic Simulation Harness
//!
//! Runs every pattern engine through a seeded, self-checking scenario and
//! records what it saw, so a run can be reproduced exactly from its seed.
//!
//! # Core Principle: Everything From One Seed
//!
//! - **Inputs**: sequences, edit scripts, orders and payments come from the
//!   [`Oracle`], a ChaCha8 stream per scenario
//! - **Time**: playback pacing sleeps on [`SimContext`]'s virtual clock
//! - **Keys**: session signing keys are derived from the seed
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        LabWorld                          │
//! │  SimContext ── SessionService ── ProgressStore           │
//! │       │                               ▲                  │
//! │       ▼                               │ completed        │
//! │  ScenarioRunner ──► engines ──► Oracle checks            │
//! │       │                                                  │
//! │       ▼                                                  │
//! │  Playback ──► TraceExport (JSON)                         │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use patternlab_sim::{LabConfig, LabWorld, ScenarioId};
//!
//! let mut world = LabWorld::new(LabConfig { seed: 42, ..Default::default() })?;
//! world.sign_in()?;
//! let run = world.run_scenario(ScenarioId::Strategy, 42).await?;
//! assert!(run.result.passed);
//! ```

mod context;
mod error;
mod exporter;
mod oracle;
mod playback;
mod runner;
pub mod scenarios;
mod world;

pub use context::SimContext;
pub use error::SimError;
pub use exporter::{TraceEvent, TraceExport, TraceFrame};
pub use oracle::{is_permutation, verify_sort_trace, EditOp, Oracle, PizzaOrder};
pub use playback::{Playback, PlaybackSummary, DEFAULT_FRAME_DELAY};
pub use runner::{ScenarioMetrics, ScenarioResult, ScenarioRunner, ScenarioTrace};
pub use scenarios::ScenarioId;
pub use world::{LabConfig, LabWorld, WorldRun};
