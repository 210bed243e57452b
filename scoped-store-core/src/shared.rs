//! Cloneable store handle for publishing through a scope

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::UnsupportedAction;
use crate::store::{Middleware, NoopMiddleware, Reducer, Store};
use crate::Action;

struct Inner<S, A: Action> {
    store: Store<S, A>,
    middleware: Box<dyn Middleware<A> + Send>,
}

/// A [`Store`] behind a lock, shared by cloning
///
/// Every clone reads and dispatches into the same store, which makes it the
/// value to publish in a [`Context`](crate::Context) when nested consumers
/// need both the current state and a way to change it. Dispatches are
/// serialized by the lock; the reducer never runs twice at once for one store.
///
/// An optional [`Middleware`] sees every dispatch made through any clone.
///
/// Do not dispatch from inside [`with_state`](Self::with_state): the lock is
/// held for the duration of the closure.
pub struct SharedStore<S, A: Action> {
    inner: Arc<Mutex<Inner<S, A>>>,
}

impl<S, A: Action> Clone for SharedStore<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, A: Action> SharedStore<S, A> {
    pub fn new(store: Store<S, A>) -> Self {
        Self::with_middleware(store, NoopMiddleware)
    }

    /// Share `store`, running `middleware` around every dispatch
    pub fn with_middleware(
        store: Store<S, A>,
        middleware: impl Middleware<A> + Send + 'static,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                store,
                middleware: Box::new(middleware),
            })),
        }
    }

    /// Shortcut for `SharedStore::new(Store::new(seed, reducer))`
    pub fn from_reducer(seed: S, reducer: Reducer<S, A>) -> Self {
        Self::new(Store::new(seed, reducer))
    }

    /// Dispatch an action to the underlying store
    pub fn dispatch(&self, action: A) -> Result<(), UnsupportedAction> {
        let name = action.name();
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        inner.middleware.before(&action);
        let result = inner.store.dispatch(action.clone());
        inner.middleware.after(&action, result.is_ok());

        // rejections are returned to the caller; ActionLoggerMiddleware warns about them
        match &result {
            Ok(()) => {
                tracing::debug!(action = %name, revision = inner.store.revision(), "dispatched")
            }
            Err(err) => tracing::debug!(action = %name, error = %err, "dispatch rejected"),
        }
        result
    }

    /// Run `f` against the current state
    pub fn with_state<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(self.inner.lock().store.state())
    }

    /// Number of successful dispatches since creation
    pub fn revision(&self) -> u64 {
        self.inner.lock().store.revision()
    }

    /// Whether two handles point at the same store
    pub fn same_store(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<S: Clone, A: Action> SharedStore<S, A> {
    /// Snapshot of the current state
    pub fn state(&self) -> S {
        self.with_state(S::clone)
    }
}

impl<S, A: Action> From<Store<S, A>> for SharedStore<S, A> {
    fn from(store: Store<S, A>) -> Self {
        Self::new(store)
    }
}

/// Never blocks: a handle formatted while the lock is held prints `<locked>`.
impl<S: std::fmt::Debug, A: Action> std::fmt::Debug for SharedStore<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tuple = f.debug_tuple("SharedStore");
        match self.inner.try_lock() {
            Some(inner) => tuple.field(&inner.store),
            None => tuple.field(&format_args!("<locked>")),
        };
        tuple.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Context, Scope};
    use crate::logger::{ActionLoggerConfig, ActionLoggerMiddleware};
    use std::thread;

    #[derive(Clone, Debug)]
    enum CountAction {
        Increment,
        Set(i32),
        Explode,
    }

    impl Action for CountAction {
        fn name(&self) -> &'static str {
            match self {
                CountAction::Increment => "Increment",
                CountAction::Set(_) => "Set",
                CountAction::Explode => "Explode",
            }
        }
    }

    fn count_reducer(count: &i32, action: CountAction) -> Result<i32, UnsupportedAction> {
        match action {
            CountAction::Increment => Ok(count + 1),
            CountAction::Set(value) => Ok(value),
            other => Err(UnsupportedAction::of(&other)),
        }
    }

    #[test]
    fn test_clones_share_state() {
        let store = SharedStore::from_reducer(0, count_reducer);
        let handle = store.clone();

        handle.dispatch(CountAction::Increment).unwrap();
        handle.dispatch(CountAction::Increment).unwrap();

        assert_eq!(store.state(), 2);
        assert_eq!(store.revision(), 2);
        assert!(store.same_store(&handle));
    }

    #[test]
    fn test_rejected_dispatch_keeps_state() {
        let store = SharedStore::from_reducer(4, count_reducer);

        let err = store.dispatch(CountAction::Explode).unwrap_err();
        assert_eq!(err.kind, "Explode");
        assert_eq!(store.state(), 4);
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_publish_store_through_scope() {
        let counter = Context::<SharedStore<i32, CountAction>>::new("CountContext")
            .provider("CountProvider");
        let store = SharedStore::from_reducer(0, count_reducer);
        let root = Scope::root();

        root.provide(&counter, store.clone(), |scope| {
            let nested = scope.publish(&Context::<u8>::new("Unrelated"), 0);
            let handle = counter.require(&nested, "use_count").unwrap();
            handle.dispatch(CountAction::Set(41)).unwrap();
            handle.dispatch(CountAction::Increment).unwrap();
        });

        assert_eq!(store.state(), 42);
    }

    #[derive(Clone, Default)]
    struct Applied(Arc<Mutex<Vec<(&'static str, bool)>>>);

    impl Middleware<CountAction> for Applied {
        fn before(&mut self, _action: &CountAction) {}

        fn after(&mut self, action: &CountAction, applied: bool) {
            self.0.lock().push((action.name(), applied));
        }
    }

    #[test]
    fn test_middleware_sees_dispatches_from_every_clone() {
        let seen = Applied::default();
        let store = SharedStore::with_middleware(Store::new(0, count_reducer), seen.clone());
        let other = store.clone();

        store.dispatch(CountAction::Increment).unwrap();
        other.dispatch(CountAction::Explode).unwrap_err();

        assert_eq!(*seen.0.lock(), vec![("Increment", true), ("Explode", false)]);
    }

    #[test]
    fn test_debug_inside_with_state_does_not_block() {
        let store = SharedStore::from_reducer(3, count_reducer);

        assert_eq!(
            format!("{:?}", store),
            "SharedStore(Store { state: 3, revision: 0 })"
        );
        let inside = store.with_state(|_| format!("{:?}", store));
        assert_eq!(inside, "SharedStore(<locked>)");
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl crate::ActionSummary for CountAction {}

    fn warnings_during(f: impl FnOnce()) -> usize {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, f);

        let output = String::from_utf8_lossy(&captured.0.lock()).into_owned();
        output.lines().filter(|line| line.contains("WARN")).count()
    }

    #[test]
    fn test_rejection_with_action_logger_warns_once() {
        let warnings = warnings_during(|| {
            let store = SharedStore::with_middleware(
                Store::new(0, count_reducer),
                ActionLoggerMiddleware::new(ActionLoggerConfig::default()),
            );
            store.dispatch(CountAction::Increment).unwrap();
            store.dispatch(CountAction::Explode).unwrap_err();
        });
        assert_eq!(warnings, 1);

        let warnings = warnings_during(|| {
            let store = SharedStore::from_reducer(0, count_reducer);
            store.dispatch(CountAction::Explode).unwrap_err();
        });
        assert_eq!(warnings, 0);
    }

    #[test]
    fn test_concurrent_dispatches_are_serialized() {
        let store = SharedStore::from_reducer(0, count_reducer);

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        store.dispatch(CountAction::Increment).unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(store.state(), 800);
        assert_eq!(store.revision(), 800);
    }
}
