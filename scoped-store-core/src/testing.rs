//! Test utilities for scoped-store reducers and stores
//!
//! - [`TestHarness`]: a store plus a channel recording every dispatched action
//! - [`assert_rejected`](TestHarness::assert_rejected): check a reducer refuses an action without touching state
//! - Assertion macros for verifying recorded actions
//!
//! # Example
//!
//! ```ignore
//! use scoped_store::testing::TestHarness;
//!
//! let mut harness = TestHarness::new(0, reducer);
//! harness.dispatch(Action::Increment).unwrap();
//! assert_eq!(*harness.state(), 1);
//!
//! let dispatched = harness.drain_emitted();
//! assert_emitted!(dispatched, Action::Increment);
//! ```

use std::fmt::Debug;

use tokio::sync::mpsc;

use crate::error::UnsupportedAction;
use crate::store::{Reducer, Store};
use crate::Action;

/// Test harness wrapping a [`Store`].
///
/// Every action passed to [`dispatch`](Self::dispatch) is also sent down an
/// unbounded channel, whether or not the reducer accepts it. Handlers under
/// test can be given [`sender`](Self::sender) to record follow-up actions
/// on the same channel.
pub struct TestHarness<S, A: Action> {
    store: Store<S, A>,
    tx: mpsc::UnboundedSender<A>,
    rx: mpsc::UnboundedReceiver<A>,
}

impl<S, A: Action> TestHarness<S, A> {
    /// Create a new test harness from a seed state and reducer.
    pub fn new(seed: S, reducer: Reducer<S, A>) -> Self {
        Self::from_store(Store::new(seed, reducer))
    }

    /// Wrap an existing store.
    pub fn from_store(store: Store<S, A>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { store, tx, rx }
    }

    /// Record and dispatch an action.
    pub fn dispatch(&mut self, action: A) -> Result<(), UnsupportedAction> {
        let _ = self.tx.send(action.clone());
        self.store.dispatch(action)
    }

    /// Current state of the wrapped store.
    pub fn state(&self) -> &S {
        self.store.state()
    }

    /// Successful dispatches so far.
    pub fn revision(&self) -> u64 {
        self.store.revision()
    }

    /// Get a clone of the action sender for passing to handlers.
    pub fn sender(&self) -> mpsc::UnboundedSender<A> {
        self.tx.clone()
    }

    /// Record an action without dispatching it.
    pub fn emit(&self, action: A) {
        let _ = self.tx.send(action);
    }

    /// Drain all recorded actions from the channel.
    pub fn drain_emitted(&mut self) -> Vec<A> {
        let mut actions = Vec::new();
        while let Ok(action) = self.rx.try_recv() {
            actions.push(action);
        }
        actions
    }

    /// Check if any actions were recorded (drains them).
    pub fn has_emitted(&mut self) -> bool {
        !self.drain_emitted().is_empty()
    }

    /// Unwrap the harness into its store.
    pub fn into_store(self) -> Store<S, A> {
        self.store
    }
}

impl<S: Clone + PartialEq + Debug, A: Action> TestHarness<S, A> {
    /// Dispatch `action` and assert the reducer rejected it without changing state.
    ///
    /// # Panics
    ///
    /// Panics if the action was applied, or if the state or revision moved.
    pub fn assert_rejected(&mut self, action: A) -> UnsupportedAction {
        let before = self.state().clone();
        let revision = self.revision();
        let description = format!("{:?}", action);

        let err = match self.dispatch(action) {
            Ok(()) => panic!("Expected {} to be rejected, but it was applied", description),
            Err(err) => err,
        };

        assert_eq!(
            self.state(),
            &before,
            "Rejected action {} changed the state",
            description
        );
        assert_eq!(self.revision(), revision);
        err
    }
}

/// Assert that a specific action was emitted.
///
/// # Example
///
/// ```ignore
/// let actions = harness.drain_emitted();
/// assert_emitted!(actions, Action::Increment);
/// assert_emitted!(actions, Action::Set(42));
/// ```
#[macro_export]
macro_rules! assert_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            $actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` to be emitted, but got: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Assert that a specific action was NOT emitted.
#[macro_export]
macro_rules! assert_not_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            !$actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` NOT to be emitted, but it was: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Find and return the first action matching a pattern.
#[macro_export]
macro_rules! find_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().find(|a| matches!(a, $pattern $(if $guard)?))
    };
}

/// Count how many actions match a pattern.
///
/// ```ignore
/// assert_eq!(count_emitted!(actions, Action::Increment), 3);
/// ```
#[macro_export]
macro_rules! count_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().filter(|a| matches!(a, $pattern $(if $guard)?)).count()
    };
}
