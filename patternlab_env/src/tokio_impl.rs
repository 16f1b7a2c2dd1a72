//! Wall-clock context for real learners.

use crate::LabContext;
use async_trait::async_trait;
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

/// [`LabContext`] on the system clock.
///
/// Playback really waits between frames, progress records carry real
/// timestamps, and every session service gets a fresh key from `OsRng`,
/// so tokens do not survive a restart.
pub struct TokioContext {
    started: Instant,
}

impl TokioContext {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Shared handle for a session service and a progress store.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl Default for TokioContext {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LabContext for TokioContext {
    fn now(&self) -> Duration {
        self.started.elapsed()
    }

    fn system_time(&self) -> SystemTime {
        SystemTime::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    /// The extension is ignored; keys are never reproducible here.
    fn derive_signing_key(&self, _seed_extension: u64) -> SigningKey {
        SigningKey::generate(&mut OsRng)
    }

    fn seed(&self) -> u64 {
        0
    }
}
