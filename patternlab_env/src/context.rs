//! Core environment context trait for PatternLab services.

use async_trait::async_trait;
use ed25519_dalek::SigningKey;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// The central interface for environment interaction.
///
/// Abstracts the clock and entropy so that session and progress services,
/// and the trace playback built on them, run unchanged against the real
/// world or a deterministic simulation.
///
/// # Implementations
///
/// - **Production**: `TokioContext` - wraps `tokio::time`, `OsRng`
/// - **Simulation**: `SimContext` - virtual clock, `ChaCha8Rng(seed)`
#[async_trait]
pub trait LabContext: Send + Sync + 'static {
    /// Returns the current monotonic time since context creation.
    fn now(&self) -> Duration;

    /// Returns the wall-clock time used for record timestamps.
    ///
    /// In simulation, this is derived from virtual clock + epoch offset.
    fn system_time(&self) -> SystemTime;

    /// Suspends execution for the given duration.
    ///
    /// In production: wraps `tokio::time::sleep`
    /// In simulation: advances virtual clock
    async fn sleep(&self, duration: Duration);

    /// Generates a signing key for session tokens.
    ///
    /// Simulation combines the global seed with `seed_extension` to derive
    /// reproducible keys; production ignores the extension.
    fn derive_signing_key(&self, seed_extension: u64) -> SigningKey;

    /// Returns the context's seed (0 in production).
    fn seed(&self) -> u64;

    /// Wall-clock milliseconds since the Unix epoch.
    fn unix_millis(&self) -> u64 {
        self.system_time()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}
