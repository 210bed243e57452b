//! Action trait for type-safe state transitions

use std::fmt::Debug;

/// Marker trait for actions that can be dispatched to a store
///
/// Actions describe an intended state change; the reducer decides what
/// that change is. They should be:
/// - Clone: Actions may be logged, replayed, or passed to middleware
/// - Debug: For debugging and logging
/// - Send + 'static: So stores can be shared across threads
///
/// Use `#[derive(Action)]` from `scoped-store-macros` to auto-implement this trait.
pub trait Action: Clone + Debug + Send + 'static {
    /// Get the action kind, used for logging, filtering and error reporting
    fn name(&self) -> &'static str;
}

/// Human-readable one-line description of an action for the action log.
///
/// The default implementation uses the `Debug` representation.
pub trait ActionSummary: Action {
    fn summary(&self) -> String {
        format!("{:?}", self)
    }
}
