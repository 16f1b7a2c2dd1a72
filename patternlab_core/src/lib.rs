//! PatternLab Core - Runnable Design Pattern Engines
//!
//! Each module is a self-contained miniature of one classic pattern, small
//! enough to drive a step-by-step visualization:
//! 1. **Strategy**: swappable sorting algorithms that record a replayable trace
//! 2. **Command**: reversible text edits behind an undo/redo history
//! 3. **State**: a Draft → Review → Published document workflow
//! 4. **Observer**: a synchronous publish/subscribe hub
//! 5. **Proxy**: lazy, cached construction of an expensive image
//! 6. **Builder**: fluent, validated pizza assembly
//! 7. **Decorator**: stackable coffee condiments
//! 8. **Factory**: platform-matched UI component families
//! 9. **Singleton**: one shared database connection per process
//! 10. **Adapter**: a legacy payment system behind a modern interface
//!
//! The engines share no runtime state and perform no I/O. Every operation
//! runs to completion before returning; pacing a trace for animation is the
//! caller's concern.

pub mod adapter;
pub mod builder;
pub mod catalog;
pub mod command;
pub mod decorator;
pub mod document;
pub mod error;
pub mod factory;
pub mod observer;
pub mod proxy;
pub mod singleton;
pub mod sorting;

// Re-export key types for convenience
pub use adapter::{LegacyPaymentSystem, PaymentAdapter, PaymentProcessor};
pub use builder::{Crust, Pizza, PizzaBuilder, PizzaSize};
pub use catalog::{catalog, Difficulty, PatternCategory, PatternInfo};
pub use command::{Command, CommandHistory, DeleteText, InsertText, TextBuffer};
pub use decorator::{brew, Coffee, Condiment, SimpleCoffee};
pub use document::{Document, DocumentState};
pub use error::{ListenerError, PatternError};
pub use factory::{Platform, RenderedUi, UiFactory};
pub use observer::{CallbackObserver, Observer, Subject, TopicSubject};
pub use proxy::{Image, ImageProxy, RealImage};
pub use singleton::DatabaseConnection;
pub use sorting::{
    SortAlgorithm, SortContext, SortOutcome, SortStep, SortStrategy, TraceSummary,
};
