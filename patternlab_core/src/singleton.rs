//! The Singleton Engine - One Shared Database Connection
//!
//! # Lifecycle
//!
//! - The instance is created lazily by the first [`DatabaseConnection::instance`]
//!   call and lives until process exit.
//! - Every later call returns the same `Arc` (compare with [`Arc::ptr_eq`]).
//! - [`DatabaseConnection::reset_instance`] drops the held instance. It is
//!   compiled only for tests or with the `test-util` feature.
//!
//! Callers are expected to fetch the instance once at their composition
//! root and pass the `Arc` down, rather than reaching for the global from
//! deep inside other code.

use crate::error::PatternError;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;
use uuid::Uuid;

static INSTANCE: Mutex<Option<Arc<DatabaseConnection>>> = Mutex::new(None);

#[derive(Debug, Default)]
struct ConnectionState {
    connected: bool,
    queries: Vec<String>,
}

/// The process-wide connection.
#[derive(Debug)]
pub struct DatabaseConnection {
    connection_id: String,
    state: Mutex<ConnectionState>,
}

impl DatabaseConnection {
    fn create() -> Self {
        let connection_id = Uuid::new_v4().simple().to_string()[..8].to_string();
        debug!("Created database connection {}", connection_id);
        Self {
            connection_id,
            state: Mutex::new(ConnectionState::default()),
        }
    }

    /// Returns the shared instance, creating it on first use.
    pub fn instance() -> Arc<DatabaseConnection> {
        let mut slot = INSTANCE.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slot.get_or_insert_with(|| Arc::new(Self::create())))
    }

    /// Drops the shared instance so the next [`Self::instance`] call builds a
    /// fresh one. Test isolation only.
    #[cfg(any(test, feature = "test-util"))]
    pub fn reset_instance() {
        let mut slot = INSTANCE.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
    }

    /// Identity token generated when the instance was created.
    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    pub fn connect(&self) {
        self.state().connected = true;
    }

    pub fn disconnect(&self) {
        self.state().connected = false;
    }

    pub fn is_connected(&self) -> bool {
        self.state().connected
    }

    /// Records `query`. Fails when the connection is closed.
    pub fn execute_query(&self, query: &str) -> Result<(), PatternError> {
        let mut state = self.state();
        if !state.connected {
            return Err(PatternError::NotConnected);
        }
        state.queries.push(query.to_string());
        Ok(())
    }

    /// Queries executed so far, oldest first.
    pub fn queries(&self) -> Vec<String> {
        self.state().queries.clone()
    }

    fn state(&self) -> MutexGuard<'_, ConnectionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The instance is process-wide, so everything that touches it lives in a
    // single test to keep the harness's parallel runner from interleaving.
    #[test]
    fn test_singleton_lifecycle() {
        DatabaseConnection::reset_instance();

        let first = DatabaseConnection::instance();
        for _ in 0..10 {
            let again = DatabaseConnection::instance();
            assert!(Arc::ptr_eq(&first, &again));
            assert_eq!(again.connection_id(), first.connection_id());
        }

        // Disconnected by default
        assert!(!first.is_connected());
        assert!(matches!(
            first.execute_query("SELECT 1"),
            Err(PatternError::NotConnected)
        ));

        // State changes are visible through every handle
        DatabaseConnection::instance().connect();
        assert!(first.is_connected());
        first.execute_query("SELECT * FROM users").unwrap();
        assert_eq!(DatabaseConnection::instance().queries(), vec!["SELECT * FROM users"]);

        first.disconnect();
        assert!(first.execute_query("SELECT 2").is_err());
        assert_eq!(first.queries().len(), 1);

        // Reset yields a new identity
        DatabaseConnection::reset_instance();
        let fresh = DatabaseConnection::instance();
        assert!(!Arc::ptr_eq(&first, &fresh));
        assert_ne!(fresh.connection_id(), first.connection_id());
        assert!(fresh.queries().is_empty());
    }
}
