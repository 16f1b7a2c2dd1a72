//! The Observer Engine - Synchronous Publish/Subscribe
//!
//! A [`TopicSubject`] keeps a state value and a list of observers keyed by
//! id. `notify` stores the new value and then calls every observer, in the
//! order they were attached, before returning.
//!
//! # Failure semantics
//!
//! [`TopicSubject::notify`] does not isolate observers: the first callback
//! that fails stops the pass, and observers attached after it are not
//! called for that value. The error is returned to the caller.
//! [`TopicSubject::notify_isolated`] delivers to everyone and collects the
//! failures instead.

use crate::error::{ListenerError, PatternError};
use std::fmt;
use tracing::{debug, warn};

/// Receives values published by a [`Subject`].
pub trait Observer<T> {
    /// Unique registration key.
    fn id(&self) -> &str;

    fn update(&self, data: &T) -> Result<(), ListenerError>;
}

/// Registry side of the pattern.
pub trait Subject<T> {
    fn attach(&mut self, observer: Box<dyn Observer<T>>);

    fn detach(&mut self, id: &str);

    fn notify(&mut self, data: T) -> Result<(), PatternError>;
}

/// Adapts a closure into an [`Observer`].
pub struct CallbackObserver<T> {
    id: String,
    callback: Box<dyn Fn(&T) -> Result<(), ListenerError>>,
}

impl<T> CallbackObserver<T> {
    pub fn new<F>(id: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&T) -> Result<(), ListenerError> + 'static,
    {
        Self {
            id: id.into(),
            callback: Box::new(callback),
        }
    }
}

impl<T> Observer<T> for CallbackObserver<T> {
    fn id(&self) -> &str {
        &self.id
    }

    fn update(&self, data: &T) -> Result<(), ListenerError> {
        (self.callback)(data)
    }
}

impl<T> fmt::Debug for CallbackObserver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackObserver").field("id", &self.id).finish()
    }
}

/// A subject holding the last published value of type `T`.
pub struct TopicSubject<T> {
    observers: Vec<Box<dyn Observer<T>>>,
    state: T,
}

impl<T> TopicSubject<T> {
    /// Creates a subject with no observers.
    pub fn new(initial_state: T) -> Self {
        Self {
            observers: Vec::new(),
            state: initial_state,
        }
    }

    /// Last notified value, or the initial value.
    pub fn state(&self) -> &T {
        &self.state
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Ids of the attached observers in notification order.
    pub fn observer_ids(&self) -> Vec<&str> {
        self.observers.iter().map(|o| o.id()).collect()
    }

    pub fn is_attached(&self, id: &str) -> bool {
        self.observers.iter().any(|o| o.id() == id)
    }

    /// Stores `data` and delivers it to every observer even if some fail.
    ///
    /// Returns the failures in attachment order; empty when all succeeded.
    pub fn notify_isolated(&mut self, data: T) -> Vec<PatternError> {
        self.state = data;
        let mut failures = Vec::new();

        for observer in &self.observers {
            if let Err(source) = observer.update(&self.state) {
                warn!("Observer {} failed: {}", observer.id(), source);
                failures.push(PatternError::ObserverFailed {
                    observer_id: observer.id().to_string(),
                    source,
                });
            }
        }

        failures
    }
}

impl<T> Subject<T> for TopicSubject<T> {
    /// Adds `observer` unless its id is already registered.
    fn attach(&mut self, observer: Box<dyn Observer<T>>) {
        if self.is_attached(observer.id()) {
            warn!("Observer {} already attached.", observer.id());
            return;
        }
        debug!("Attached observer {}", observer.id());
        self.observers.push(observer);
    }

    fn detach(&mut self, id: &str) {
        self.observers.retain(|o| o.id() != id);
    }

    /// Stores `data`, then calls each observer in attachment order.
    ///
    /// Stops at the first failing observer and returns its error.
    fn notify(&mut self, data: T) -> Result<(), PatternError> {
        self.state = data;

        for observer in &self.observers {
            observer
                .update(&self.state)
                .map_err(|source| PatternError::ObserverFailed {
                    observer_id: observer.id().to_string(),
                    source,
                })?;
        }

        Ok(())
    }
}

impl<T: fmt::Debug> fmt::Debug for TopicSubject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TopicSubject")
            .field("observers", &self.observer_ids())
            .field("state", &self.state)
            .finish()
    }
}
