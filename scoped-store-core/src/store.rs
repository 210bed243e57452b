//! State container with reducer pattern

use crate::error::UnsupportedAction;
use crate::Action;
use std::marker::PhantomData;

/// A reducer computes the next state from the current state and an action
///
/// The current state is only borrowed, so a reducer cannot mutate it in place;
/// it returns a replacement. Actions the reducer cannot interpret must be
/// rejected with [`UnsupportedAction`] rather than ignored.
pub type Reducer<S, A> = fn(&S, A) -> Result<S, UnsupportedAction>;

/// State container with a Redux-like reducer
///
/// The store owns a single state value and replaces it on every successful
/// `dispatch`. Each replacement bumps [`revision`](Store::revision), so hosts
/// can tell that the state they rendered from is stale.
///
/// # Type Parameters
/// * `S` - The state type
/// * `A` - The action type (must implement `Action`)
///
/// # Example
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// enum CountAction {
///     Increment,
///     Decrement,
/// }
///
/// fn reducer(count: &i32, action: CountAction) -> Result<i32, UnsupportedAction> {
///     match action {
///         CountAction::Increment => Ok(count + 1),
///         CountAction::Decrement => Ok(count - 1),
///     }
/// }
///
/// let mut store = Store::new(0, reducer);
/// store.dispatch(CountAction::Increment)?;
/// assert_eq!(*store.state(), 1);
/// ```
pub struct Store<S, A: Action> {
    state: S,
    reducer: Reducer<S, A>,
    revision: u64,
    _marker: PhantomData<A>,
}

impl<S, A: Action> Store<S, A> {
    /// Create a new store whose initial state is `seed`
    pub fn new(seed: S, reducer: Reducer<S, A>) -> Self {
        Self {
            state: seed,
            reducer,
            revision: 0,
            _marker: PhantomData,
        }
    }

    /// Create a new store whose initial state is `init(seed)`
    ///
    /// `init` runs exactly once, here. Use it when building the initial
    /// state is expensive or has side effects that must not repeat.
    pub fn with_initializer<Seed>(
        seed: Seed,
        init: impl FnOnce(Seed) -> S,
        reducer: Reducer<S, A>,
    ) -> Self {
        Self::new(init(seed), reducer)
    }

    /// Dispatch an action to the store
    ///
    /// On success the state is replaced with the reducer's result. On failure
    /// the state and revision are left untouched and the error is returned.
    pub fn dispatch(&mut self, action: A) -> Result<(), UnsupportedAction> {
        let next = (self.reducer)(&self.state, action)?;
        self.state = next;
        self.revision += 1;
        Ok(())
    }

    /// Dispatch actions in order, stopping at the first rejected one
    ///
    /// Actions before the rejected one stay applied.
    pub fn dispatch_all<I>(&mut self, actions: I) -> Result<(), UnsupportedAction>
    where
        I: IntoIterator<Item = A>,
    {
        for action in actions {
            self.dispatch(action)?;
        }
        Ok(())
    }

    /// Get a reference to the current state
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Number of successful dispatches since creation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Consume the store and return its state
    pub fn into_state(self) -> S {
        self.state
    }
}

impl<S: std::fmt::Debug, A: Action> std::fmt::Debug for Store<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("revision", &self.revision)
            .finish()
    }
}

/// Store with middleware support
///
/// Wraps a `Store` and allows middleware to intercept actions
/// before and after they are processed by the reducer.
pub struct StoreWithMiddleware<S, A: Action, M: Middleware<A>> {
    store: Store<S, A>,
    middleware: M,
}

impl<S, A: Action, M: Middleware<A>> StoreWithMiddleware<S, A, M> {
    /// Create a new store with middleware
    pub fn new(seed: S, reducer: Reducer<S, A>, middleware: M) -> Self {
        Self::from_store(Store::new(seed, reducer), middleware)
    }

    /// Wrap an existing store (e.g. one built with an initializer)
    pub fn from_store(store: Store<S, A>, middleware: M) -> Self {
        Self { store, middleware }
    }

    /// Dispatch an action through middleware and store
    pub fn dispatch(&mut self, action: A) -> Result<(), UnsupportedAction> {
        self.middleware.before(&action);
        let result = self.store.dispatch(action.clone());
        self.middleware.after(&action, result.is_ok());
        result
    }

    /// Get a reference to the current state
    pub fn state(&self) -> &S {
        self.store.state()
    }

    /// Number of successful dispatches since creation
    pub fn revision(&self) -> u64 {
        self.store.revision()
    }

    /// Get a reference to the middleware
    pub fn middleware(&self) -> &M {
        &self.middleware
    }

    /// Get a mutable reference to the middleware
    pub fn middleware_mut(&mut self) -> &mut M {
        &mut self.middleware
    }

    /// Unwrap into the inner store and middleware
    pub fn into_parts(self) -> (Store<S, A>, M) {
        (self.store, self.middleware)
    }
}

/// Middleware trait for intercepting actions
///
/// Implement this trait to add logging, persistence, or other
/// cross-cutting concerns to your store.
pub trait Middleware<A: Action> {
    /// Called before the action is handed to the reducer
    fn before(&mut self, action: &A);

    /// Called after the reducer ran; `applied` is false if it rejected the action
    fn after(&mut self, action: &A, applied: bool);
}

/// A no-op middleware that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMiddleware;

impl<A: Action> Middleware<A> for NoopMiddleware {
    fn before(&mut self, _action: &A) {}
    fn after(&mut self, _action: &A, _applied: bool) {}
}

/// Compose multiple middleware into a single middleware
pub struct ComposedMiddleware<A: Action> {
    middlewares: Vec<Box<dyn Middleware<A> + Send>>,
}

impl<A: Action> std::fmt::Debug for ComposedMiddleware<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposedMiddleware")
            .field("middlewares_count", &self.middlewares.len())
            .finish()
    }
}

impl<A: Action> Default for ComposedMiddleware<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Action> ComposedMiddleware<A> {
    /// Create a new composed middleware
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    /// Add a middleware to the composition
    pub fn add<M: Middleware<A> + Send + 'static>(&mut self, middleware: M) {
        self.middlewares.push(Box::new(middleware));
    }

    /// Number of composed middlewares
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Whether no middleware has been added
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

impl<A: Action> Middleware<A> for ComposedMiddleware<A> {
    fn before(&mut self, action: &A) {
        for middleware in &mut self.middlewares {
            middleware.before(action);
        }
    }

    fn after(&mut self, action: &A, applied: bool) {
        // Call in reverse order for proper nesting
        for middleware in self.middlewares.iter_mut().rev() {
            middleware.after(action, applied);
        }
    }
}
