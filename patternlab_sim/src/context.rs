//! Seeded clock and keys for reproducible lab runs.
//!
//! Playback pacing, session expiry and progress timestamps all read time
//! through [`LabContext`]. Under [`SimContext`] that time is a counter that
//! only moves when playback sleeps, so two runs with the same seed produce
//! the same frame times, the same session key and the same records.

use async_trait::async_trait;
use ed25519_dalek::SigningKey;
use patternlab_env::LabContext;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Wall-clock instant the lab clock starts at (2024-01-01 00:00:00 UTC).
const LAB_EPOCH_SECS: u64 = 1_704_067_200;

/// Mixes the run seed before it meets a key extension.
const KEY_MIX: u64 = 0x517c_c1b7_2722_0a95;

/// Context for simulated learners.
///
/// Clones share one clock, so the world, its session service and its
/// progress store agree on the current lab time.
#[derive(Clone)]
pub struct SimContext {
    seed: u64,

    /// Lab time elapsed since the epoch, in nanoseconds
    elapsed_ns: Arc<Mutex<u64>>,
}

impl SimContext {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            elapsed_ns: Arc::new(Mutex::new(0)),
        }
    }

    pub fn shared(seed: u64) -> Arc<Self> {
        Arc::new(Self::new(seed))
    }

    /// Moves lab time forward, e.g. to age a session token past expiry.
    pub fn advance_time(&self, duration: Duration) {
        let mut elapsed = self.elapsed();
        *elapsed = elapsed.saturating_add(duration.as_nanos() as u64);
    }

    /// Lab time in nanoseconds.
    pub fn time_ns(&self) -> u64 {
        *self.elapsed()
    }

    fn elapsed(&self) -> MutexGuard<'_, u64> {
        self.elapsed_ns
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl LabContext for SimContext {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.time_ns())
    }

    fn system_time(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(LAB_EPOCH_SECS) + self.now()
    }

    async fn sleep(&self, duration: Duration) {
        self.advance_time(duration);
    }

    fn derive_signing_key(&self, seed_extension: u64) -> SigningKey {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed.wrapping_mul(KEY_MIX) ^ seed_extension);
        SigningKey::generate(&mut rng)
    }

    fn seed(&self) -> u64 {
        self.seed
    }
}
