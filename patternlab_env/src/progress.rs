//! Per-learner progress tracking.
//!
//! Progress is an upsert keyed by (user, pattern slug). Two stores are
//! provided: an in-memory map for simulation and tests, and a sled-backed
//! store that survives restarts.

use crate::{EnvError, LabContext, ProgressRecord, ProgressStatus, UserId};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

// ============================================================================
// STORE TRAIT
// ============================================================================

/// Storage for learner progress.
///
/// Implementations must be thread-safe.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// All records for `user`, ordered by pattern slug.
    async fn progress_for(&self, user: UserId) -> Result<Vec<ProgressRecord>, EnvError>;

    /// Upserts the status of one pattern and returns the stored record.
    async fn update(
        &self,
        user: UserId,
        pattern_slug: &str,
        status: ProgressStatus,
    ) -> Result<ProgressRecord, EnvError>;
}

fn validate_slug(pattern_slug: &str) -> Result<(), EnvError> {
    if pattern_slug.trim().is_empty() {
        return Err(EnvError::validation("Pattern slug is required"));
    }
    Ok(())
}

/// Whether `slug` is marked completed in `records`.
pub fn is_completed(records: &[ProgressRecord], slug: &str) -> bool {
    records
        .iter()
        .any(|r| r.pattern_slug == slug && r.status == ProgressStatus::Completed)
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

/// Progress held in a map behind a tokio `RwLock`.
pub struct InMemoryProgressStore<C: LabContext> {
    ctx: Arc<C>,
    records: RwLock<HashMap<(UserId, String), ProgressRecord>>,
}

impl<C: LabContext> InMemoryProgressStore<C> {
    /// Creates an empty store timestamped by `ctx`.
    pub fn new(ctx: Arc<C>) -> Self {
        Self {
            ctx,
            records: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl<C: LabContext> ProgressStore for InMemoryProgressStore<C> {
    async fn progress_for(&self, user: UserId) -> Result<Vec<ProgressRecord>, EnvError> {
        let records = self.records.read().await;
        let mut found: Vec<ProgressRecord> = records
            .values()
            .filter(|r| r.user_id == user)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.pattern_slug.cmp(&b.pattern_slug));
        Ok(found)
    }

    async fn update(
        &self,
        user: UserId,
        pattern_slug: &str,
        status: ProgressStatus,
    ) -> Result<ProgressRecord, EnvError> {
        validate_slug(pattern_slug)?;
        let now_ms = self.ctx.unix_millis();

        let mut records = self.records.write().await;
        let record = records
            .entry((user, pattern_slug.to_string()))
            .or_insert_with(|| ProgressRecord::new(user, pattern_slug, now_ms));
        record.apply(status, now_ms);

        tracing::debug!(%user, slug = pattern_slug, %status, "Progress updated");
        Ok(record.clone())
    }
}

// ============================================================================
// SLED STORE
// ============================================================================

/// Sled-based persistent progress store.
///
/// Keys are the user's UUID bytes followed by the slug; values are JSON
/// encoded [`ProgressRecord`]s.
pub struct SledProgressStore<C: LabContext> {
    ctx: Arc<C>,
    db: sled::Db,
}

impl<C: LabContext> SledProgressStore<C> {
    /// Open a persistent store at the given path
    pub fn open<P: AsRef<Path>>(path: P, ctx: Arc<C>) -> Result<Self, EnvError> {
        let db = sled::open(path)
            .map_err(|e| EnvError::storage(format!("Failed to open sled DB: {}", e)))?;
        Ok(Self { ctx, db })
    }

    /// Create a temporary store (for testing)
    #[cfg(test)]
    pub fn open_temp(ctx: Arc<C>) -> Result<Self, EnvError> {
        let config = sled::Config::new().temporary(true);
        let db = config
            .open()
            .map_err(|e| EnvError::storage(format!("Failed to open temp DB: {}", e)))?;
        Ok(Self { ctx, db })
    }

    fn key(user: UserId, pattern_slug: &str) -> Vec<u8> {
        let mut key = user.as_uuid().as_bytes().to_vec();
        key.extend_from_slice(pattern_slug.as_bytes());
        key
    }
}

#[async_trait]
impl<C: LabContext> ProgressStore for SledProgressStore<C> {
    async fn progress_for(&self, user: UserId) -> Result<Vec<ProgressRecord>, EnvError> {
        // Keys sort by slug within a user prefix
        let mut found = Vec::new();
        for result in self.db.scan_prefix(user.as_uuid().as_bytes()) {
            let (_, value) =
                result.map_err(|e| EnvError::storage(format!("Iteration failed: {}", e)))?;
            found.push(serde_json::from_slice::<ProgressRecord>(&value)?);
        }
        Ok(found)
    }

    async fn update(
        &self,
        user: UserId,
        pattern_slug: &str,
        status: ProgressStatus,
    ) -> Result<ProgressRecord, EnvError> {
        validate_slug(pattern_slug)?;
        let now_ms = self.ctx.unix_millis();
        let key = Self::key(user, pattern_slug);

        // Read, apply and write in one atomic step; the closure may rerun
        let mut codec_error = None;
        let stored = self
            .db
            .update_and_fetch(&key, |old| {
                codec_error = None;
                let mut record = match old.map(serde_json::from_slice::<ProgressRecord>) {
                    Some(Ok(record)) => record,
                    Some(Err(e)) => {
                        codec_error = Some(e);
                        return old.map(|bytes| bytes.to_vec());
                    }
                    None => ProgressRecord::new(user, pattern_slug, now_ms),
                };
                record.apply(status, now_ms);
                match serde_json::to_vec(&record) {
                    Ok(bytes) => Some(bytes),
                    Err(e) => {
                        codec_error = Some(e);
                        old.map(|bytes| bytes.to_vec())
                    }
                }
            })
            .map_err(|e| EnvError::storage(format!("Update failed: {}", e)))?;
        if let Some(e) = codec_error {
            return Err(e.into());
        }
        let value = stored.ok_or_else(|| EnvError::storage("Record missing after update"))?;
        let record = serde_json::from_slice::<ProgressRecord>(&value)?;

        self.db
            .flush()
            .map_err(|e| EnvError::storage(format!("Flush failed: {}", e)))?;

        tracing::debug!(%user, slug = pattern_slug, %status, "Progress persisted");
        Ok(record)
    }
}

// ============================================================================
// STATS
// ============================================================================

/// Progress summary against the full pattern catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ProgressStats {
    pub completed: usize,
    pub in_progress: usize,
    pub not_started: usize,
    pub total: usize,
}

impl ProgressStats {
    /// Counts statuses for every catalog pattern; patterns with no record
    /// count as not started. Records for unknown slugs are ignored.
    pub fn from_records(records: &[ProgressRecord]) -> Self {
        let mut stats = Self::default();
        for pattern in patternlab_core::catalog() {
            let status = records
                .iter()
                .find(|r| r.pattern_slug == pattern.slug)
                .map(|r| r.status)
                .unwrap_or_default();
            match status {
                ProgressStatus::Completed => stats.completed += 1,
                ProgressStatus::InProgress => stats.in_progress += 1,
                ProgressStatus::NotStarted => stats.not_started += 1,
            }
            stats.total += 1;
        }
        stats
    }

    /// Completed share of the catalog, 0.0 to 100.0.
    pub fn completed_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TokioContext;

    #[tokio::test]
    async fn test_in_memory_upsert_and_query() {
        let store = InMemoryProgressStore::new(TokioContext::shared());
        let user = UserId::from_seed(1);

        store.update(user, "strategy", ProgressStatus::InProgress).await.unwrap();
        store.update(user, "observer", ProgressStatus::Completed).await.unwrap();
        store.update(user, "strategy", ProgressStatus::Completed).await.unwrap();

        let records = store.progress_for(user).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].pattern_slug, "observer");
        assert!(is_completed(&records, "strategy"));
        assert!(!is_completed(&records, "builder"));
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let store = InMemoryProgressStore::new(TokioContext::shared());
        store
            .update(UserId::from_seed(1), "state", ProgressStatus::Completed)
            .await
            .unwrap();

        let other = store.progress_for(UserId::from_seed(2)).await.unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn test_empty_slug_is_rejected() {
        let store = InMemoryProgressStore::new(TokioContext::shared());
        let result = store.update(UserId::from_seed(1), "  ", ProgressStatus::Completed).await;
        assert!(matches!(result, Err(EnvError::Validation(_))));
    }

    #[tokio::test]
    async fn test_recompleting_keeps_first_timestamp() {
        let store = InMemoryProgressStore::new(TokioContext::shared());
        let user = UserId::from_seed(3);

        let first = store.update(user, "proxy", ProgressStatus::Completed).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = store.update(user, "proxy", ProgressStatus::Completed).await.unwrap();

        assert!(first.completed_at_ms.is_some());
        assert_eq!(first.completed_at_ms, second.completed_at_ms);
    }

    #[tokio::test]
    async fn test_sled_store_persists_records() {
        let store = SledProgressStore::open_temp(TokioContext::shared()).unwrap();
        let user = UserId::from_seed(4);

        store.update(user, "factory", ProgressStatus::InProgress).await.unwrap();
        store.update(user, "builder", ProgressStatus::Completed).await.unwrap();
        let updated = store.update(user, "factory", ProgressStatus::Completed).await.unwrap();
        assert!(updated.completed_at_ms.is_some());

        let records = store.progress_for(user).await.unwrap();
        let slugs: Vec<_> = records.iter().map(|r| r.pattern_slug.as_str()).collect();
        assert_eq!(slugs, vec!["builder", "factory"]);
        assert!(is_completed(&records, "factory"));

        assert!(store.progress_for(UserId::from_seed(5)).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_sled_store_concurrent_upserts_stay_consistent() {
        let store = Arc::new(SledProgressStore::open_temp(TokioContext::shared()).unwrap());
        let user = UserId::from_seed(9);
        let slugs = ["observer", "strategy", "command", "builder"];

        let mut handles = Vec::new();
        for i in 0..64usize {
            let store = Arc::clone(&store);
            let slug = slugs[i % slugs.len()];
            let status = if i % 3 == 0 {
                ProgressStatus::InProgress
            } else {
                ProgressStatus::Completed
            };
            handles.push(tokio::spawn(async move {
                store.update(user, slug, status).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let records = store.progress_for(user).await.unwrap();
        assert_eq!(records.len(), slugs.len());
        for record in &records {
            assert_eq!(
                record.completed_at_ms.is_some(),
                record.status == ProgressStatus::Completed,
                "{:?}",
                record
            );
        }
    }

    #[tokio::test]
    async fn test_sled_store_completion_survives_later_completions() {
        let store = SledProgressStore::open_temp(TokioContext::shared()).unwrap();
        let user = UserId::from_seed(10);

        let first = store.update(user, "proxy", ProgressStatus::Completed).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let again = store.update(user, "proxy", ProgressStatus::Completed).await.unwrap();

        assert_eq!(first.completed_at_ms, again.completed_at_ms);
        assert!(again.updated_at_ms >= first.updated_at_ms);
    }

    #[tokio::test]
    async fn test_sled_store_rejects_empty_slug() {
        let store = SledProgressStore::open_temp(TokioContext::shared()).unwrap();
        let result = store.update(UserId::from_seed(4), "", ProgressStatus::Completed).await;
        assert!(matches!(result, Err(EnvError::Validation(_))));
    }

    #[test]
    fn test_stats_against_catalog() {
        let user = UserId::from_seed(6);
        let mut done = ProgressRecord::new(user, "observer", 0);
        done.apply(ProgressStatus::Completed, 1);
        let mut started = ProgressRecord::new(user, "command", 0);
        started.apply(ProgressStatus::InProgress, 1);
        let unknown = ProgressRecord::new(user, "visitor", 0);

        let stats = ProgressStats::from_records(&[done, started, unknown]);
        assert_eq!(stats.total, patternlab_core::catalog().len());
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.in_progress, 1);
        assert_eq!(stats.not_started, stats.total - 2);
        assert!((stats.completed_percent() - 10.0).abs() < 1e-9);
    }
}
