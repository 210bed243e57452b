//! Core traits and types for scoped-store
//!
//! This crate provides two small building blocks for application state,
//! following a Redux/Elm-inspired architecture:
//!
//! # Core Concepts
//!
//! - **Action**: Values describing an intended state change
//! - **Store**: Holds one state value and replaces it through a reducer
//! - **Context / Scope**: Publish a value once and read it anywhere nested below
//! - **SharedStore**: A cloneable store handle, the usual value to publish
//!
//! # Basic Example
//!
//! ```ignore
//! use scoped_store_core::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! enum CountAction {
//!     Increment,
//!     Decrement,
//! }
//!
//! fn reducer(count: &i32, action: CountAction) -> Result<i32, UnsupportedAction> {
//!     match action {
//!         CountAction::Increment => Ok(count + 1),
//!         CountAction::Decrement => Ok(count - 1),
//!     }
//! }
//!
//! let mut store = Store::new(0, reducer);
//! store.dispatch(CountAction::Increment)?;
//! ```
//!
//! # Sharing a Store Through a Scope
//!
//! ```ignore
//! let count = Context::<SharedStore<i32, CountAction>>::new("CountContext")
//!     .provider("CountProvider");
//!
//! fn use_count<'a>(
//!     ctx: &'a Context<SharedStore<i32, CountAction>>,
//!     scope: &'a Scope<'_>,
//! ) -> Result<&'a SharedStore<i32, CountAction>, UnscopedRead> {
//!     ctx.require(scope, "use_count")
//! }
//!
//! Scope::root().provide(&count, SharedStore::from_reducer(0, reducer), |scope| {
//!     let store = use_count(&count, scope)?;
//!     store.dispatch(CountAction::Increment)?;
//!     Ok::<_, Error>(())
//! })?;
//! ```
//!
//! Reducers reject actions they cannot interpret with [`UnsupportedAction`];
//! reads outside any publication fail with [`UnscopedRead`]. Both are
//! programmer errors and are never retried.

pub mod action;
pub mod context;
pub mod convention;
pub mod error;
pub mod logger;
pub mod shared;
pub mod store;
pub mod testing;

// Core trait exports
pub use action::{Action, ActionSummary};

// Error exports
pub use error::{Error, Result, UnscopedRead, UnsupportedAction};

// Store exports
pub use store::{
    ComposedMiddleware, Middleware, NoopMiddleware, Reducer, Store, StoreWithMiddleware,
};
pub use shared::SharedStore;

// Scoped channel exports
pub use context::{Context, Scope};

// Convention exports
pub use convention::{Merge, Partial, Patch, Replace, Step, TaggedAction, Updater};

// Logging exports
pub use logger::{
    ActionLog, ActionLogConfig, ActionLogEntry, ActionLoggerConfig, ActionLoggerMiddleware,
};

// Testing exports
pub use testing::TestHarness;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{Action, ActionSummary};
    pub use crate::context::{Context, Scope};
    pub use crate::convention::{Merge, Partial, Patch, Replace, Step, TaggedAction};
    pub use crate::error::{Error, UnscopedRead, UnsupportedAction};
    pub use crate::shared::SharedStore;
    pub use crate::store::{
        ComposedMiddleware, Middleware, NoopMiddleware, Reducer, Store, StoreWithMiddleware,
    };
}
