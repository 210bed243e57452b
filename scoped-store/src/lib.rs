//! scoped-store: reducer-driven state containers and scoped value sharing
//!
//! Like Redux's store and React's context, without a UI attached. A
//! [`Store`] replaces its state through a pure reducer; a [`Context`]
//! publishes a value through an explicit [`Scope`] hierarchy so nested code can
//! read it without parameter threading.
//!
//! # Example
//! ```ignore
//! use scoped_store::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! #[action(rename_all = "SCREAMING_SNAKE_CASE")]
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
//! let count = Context::new("CountContext").provider("CountProvider");
//! Scope::root().provide(&count, SharedStore::from_reducer(0, reducer), |scope| {
//!     count.require(scope, "use_count")?.dispatch(CountAction::Increment)?;
//!     Ok::<_, Error>(())
//! })?;
//! ```

// Re-export everything from core
pub use scoped_store_core::*;

// Re-export derive macros
pub use scoped_store_macros::Action;

/// Prelude for convenient imports
pub mod prelude {
    pub use scoped_store_core::prelude::*;

    // Derive macros
    pub use scoped_store_macros::Action;
}
