//! LabWorld - the simulation composition root.
//!
//! Wires the seeded context, the session service, a progress store and the
//! shared database connection together, and runs scenarios on behalf of a
//! simulated learner.

use crate::context::SimContext;
use crate::error::SimError;
use crate::exporter::TraceExport;
use crate::playback::{Playback, PlaybackSummary, DEFAULT_FRAME_DELAY};
use crate::runner::{ScenarioResult, ScenarioRunner, DEFAULT_EDIT_OPS, DEFAULT_SEQUENCE_LEN};
use crate::scenarios::ScenarioId;

use patternlab_core::{DatabaseConnection, SortAlgorithm};
use patternlab_env::{
    is_completed, InMemoryProgressStore, ProgressRecord, ProgressStats, ProgressStatus,
    ProgressStore, SessionCheck, SessionService, SessionToken, SledProgressStore, UserId,
    UserIdentity,
};
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct LabConfig {
    /// Master seed for determinism
    pub seed: u64,

    /// Number of consecutive seeds to run, starting at `seed`
    pub seeds: usize,

    /// Length of seeded sort inputs
    pub sequence_len: usize,

    /// Steps in seeded edit scripts
    pub edit_ops: usize,

    /// Algorithm whose trace is played back and exported
    pub algorithm: SortAlgorithm,

    /// Delay between playback frames
    pub playback_delay: Duration,

    /// Persist progress with sled at this path (in memory if unset)
    pub progress_db: Option<PathBuf>,

    /// Write the trace export here
    pub export: Option<PathBuf>,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            seeds: 1,
            sequence_len: DEFAULT_SEQUENCE_LEN,
            edit_ops: DEFAULT_EDIT_OPS,
            algorithm: SortAlgorithm::Bubble,
            playback_delay: DEFAULT_FRAME_DELAY,
            progress_db: None,
            export: None,
        }
    }
}

/// Everything one scenario run produced.
#[derive(Debug, Clone)]
pub struct WorldRun {
    pub result: ScenarioResult,

    /// Result plus paced frames, ready to write
    pub export: TraceExport,

    pub playback: Option<PlaybackSummary>,

    /// Whether the pattern was marked completed for the learner
    pub progress_recorded: bool,
}

/// The LabWorld - container for the entire simulation.
pub struct LabWorld {
    /// Configuration
    pub config: LabConfig,

    /// Shared simulation context (virtual clock)
    pub context: Arc<SimContext>,

    sessions: SessionService<SimContext>,

    progress: Box<dyn ProgressStore>,

    /// The process-wide connection, injected into every runner
    connection: Arc<DatabaseConnection>,

    learner: UserIdentity,

    token: Option<SessionToken>,
}

impl LabWorld {
    /// Creates a new LabWorld with the given configuration.
    ///
    /// Opens the sled store when `progress_db` is set.
    pub fn new(config: LabConfig) -> Result<Self, SimError> {
        let context = SimContext::shared(config.seed);

        let progress: Box<dyn ProgressStore> = match &config.progress_db {
            Some(path) => {
                info!("Persisting progress to {}", path.display());
                Box::new(SledProgressStore::open(path, context.clone())?)
            }
            None => Box::new(InMemoryProgressStore::new(context.clone())),
        };

        let learner = UserIdentity::new(
            UserId::from_seed(config.seed),
            "learner@patternlab.dev",
            "Simulated Learner",
        );

        Ok(Self {
            sessions: SessionService::new(context.clone()),
            connection: DatabaseConnection::instance(),
            context,
            progress,
            learner,
            token: None,
            config,
        })
    }

    /// The simulated learner's identity.
    pub fn learner(&self) -> &UserIdentity {
        &self.learner
    }

    /// Issues a session token for the learner.
    pub fn sign_in(&mut self) -> Result<(), SimError> {
        self.token = Some(self.sessions.issue(self.learner.clone())?);
        debug!("Learner {} signed in", self.learner.id);
        Ok(())
    }

    pub fn sign_out(&mut self) {
        self.token = None;
    }

    /// Replaces the held token, e.g. with one issued elsewhere.
    pub fn use_token(&mut self, token: SessionToken) {
        self.token = Some(token);
    }

    /// Answers the session check for the held token.
    pub fn session(&self) -> SessionCheck {
        self.sessions.check(self.token.as_ref())
    }

    /// Builds a runner for `seed` from the configuration.
    pub fn runner(&self, seed: u64) -> ScenarioRunner {
        ScenarioRunner::new(seed)
            .with_sequence_len(self.config.sequence_len)
            .with_edit_ops(self.config.edit_ops)
            .with_algorithm(self.config.algorithm)
            .with_connection(Arc::clone(&self.connection))
    }

    /// Runs one scenario, plays back its trace and records progress.
    ///
    /// The pattern is marked in progress before the run and completed
    /// after a pass, both only while the session check authenticates.
    pub async fn run_scenario(
        &mut self,
        scenario: ScenarioId,
        seed: u64,
    ) -> Result<WorldRun, SimError> {
        let slug = scenario.slug();

        if let Some(identity) = self.session().identity().cloned() {
            let records = self.progress.progress_for(identity.id).await?;
            if !is_completed(&records, slug) {
                self.progress
                    .update(identity.id, slug, ProgressStatus::InProgress)
                    .await?;
            }
        }

        let result = self.runner(seed).run(scenario);
        let mut export = TraceExport::from_result(&result);

        let playback = if result.trace.frames.is_empty() {
            None
        } else {
            let summary = Playback::new(self.context.clone())
                .with_delay(self.config.playback_delay)
                .play(&result.trace.frames, |frame| {
                    export.add_frame(frame);
                    ControlFlow::Continue(())
                })
                .await;
            Some(summary)
        };

        let progress_recorded = if result.passed {
            match self.session() {
                SessionCheck::Authenticated(identity) => {
                    self.progress
                        .update(identity.id, slug, ProgressStatus::Completed)
                        .await?;
                    true
                }
                SessionCheck::Unauthenticated => {
                    warn!("{} passed but no valid session; progress not recorded", slug);
                    false
                }
            }
        } else {
            false
        };

        Ok(WorldRun {
            result,
            export,
            playback,
            progress_recorded,
        })
    }

    /// The learner's stored records. Requires a valid session.
    pub async fn records(&self) -> Result<Vec<ProgressRecord>, SimError> {
        match self.session() {
            SessionCheck::Authenticated(identity) => {
                Ok(self.progress.progress_for(identity.id).await?)
            }
            SessionCheck::Unauthenticated => Err(SimError::Unauthenticated),
        }
    }

    /// The learner's progress against the catalog. Requires a valid session.
    pub async fn progress(&self) -> Result<ProgressStats, SimError> {
        let records = self.records().await?;
        Ok(ProgressStats::from_records(&records))
    }
}
