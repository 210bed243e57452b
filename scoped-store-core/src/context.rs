//! Scoped value sharing
//!
//! A [`Context<T>`] defines a channel; a [`Scope`] carries publications down a
//! call hierarchy. Publishing a value creates a child scope, and every read made
//! through that child (or anything nested inside it) sees the value without it
//! being passed as a parameter. The nearest enclosing publication wins.
//!
//! Scopes are explicit values, not ambient globals: the scope is threaded
//! through calls, and a child scope cannot outlive the scope it was published
//! from.
//!
//! # Example
//!
//! ```ignore
//! use scoped_store::{Context, Scope};
//!
//! let theme = Context::<&str>::new("ThemeContext").provider("ThemeProvider");
//!
//! let root = Scope::root();
//! assert!(theme.read(&root).is_err());
//!
//! root.provide(&theme, "dark", |scope| {
//!     assert_eq!(*theme.read(scope)?, "dark");
//!     scope.provide(&theme, "light", |inner| {
//!         assert_eq!(*theme.read(inner)?, "light");
//!         Ok(())
//!     })
//! })?;
//! ```
//!
//! Channels have no mutation primitive. To share mutable state, publish a
//! [`SharedStore`](crate::SharedStore) and dispatch through it.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::UnscopedRead;

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Definition of a scoped channel carrying values of type `T`
///
/// Each `Context` has its own identity, so two contexts of the same value
/// type never see each other's publications. Keep one instance per channel
/// (e.g. in a `static LazyLock`) and share it by reference.
pub struct Context<T> {
    id: u64,
    name: &'static str,
    provider: &'static str,
    fallback: Option<T>,
}

impl<T: 'static> Context<T> {
    /// Create a channel with no fallback: unscoped reads fail
    pub fn new(name: &'static str) -> Self {
        Self {
            id: NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed),
            name,
            provider: name,
            fallback: None,
        }
    }

    /// Create a channel whose unscoped reads return `fallback`
    pub fn with_fallback(name: &'static str, fallback: T) -> Self {
        Self {
            fallback: Some(fallback),
            ..Self::new(name)
        }
    }

    /// Name the publisher expected to enclose reads (used in error messages)
    pub fn provider(mut self, provider: &'static str) -> Self {
        self.provider = provider;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider
    }

    pub fn fallback(&self) -> Option<&T> {
        self.fallback.as_ref()
    }

    /// Read the nearest value published for this channel
    pub fn read<'a>(&'a self, scope: &'a Scope<'_>) -> Result<&'a T, UnscopedRead> {
        scope.read(self)
    }

    /// Guarded read: like [`read`](Self::read), but a failure names `consumer`
    ///
    /// ```ignore
    /// fn use_count<'a>(scope: &'a Scope<'_>) -> Result<&'a SharedStore<i32, CountAction>, UnscopedRead> {
    ///     COUNT.require(scope, "use_count")
    /// }
    /// // Err: "`use_count` must be used within a `CountProvider`"
    /// ```
    pub fn require<'a>(
        &'a self,
        scope: &'a Scope<'_>,
        consumer: impl Into<Cow<'static, str>>,
    ) -> Result<&'a T, UnscopedRead> {
        self.read(scope).map_err(|err| err.consumed_by(consumer))
    }

    fn unscoped(&self) -> UnscopedRead {
        UnscopedRead {
            context: self.name,
            provider: self.provider,
            consumer: Cow::Borrowed(self.name),
        }
    }
}

impl<T> fmt::Debug for Context<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("name", &self.name)
            .field("provider", &self.provider)
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}

struct Publication {
    context_id: u64,
    context_name: &'static str,
    value: Box<dyn Any>,
}

/// A node in the scope hierarchy
///
/// The root holds nothing; every [`publish`](Scope::publish) returns a child
/// holding one value and borrowing its parent.
pub struct Scope<'p> {
    parent: Option<&'p Scope<'p>>,
    publication: Option<Publication>,
    depth: usize,
}

impl Scope<'static> {
    /// An empty top-level scope
    pub fn root() -> Self {
        Self {
            parent: None,
            publication: None,
            depth: 0,
        }
    }
}

impl Default for Scope<'static> {
    fn default() -> Self {
        Self::root()
    }
}

impl<'p> Scope<'p> {
    /// Publish `value` for `ctx`, returning the child scope that can see it
    pub fn publish<T: 'static>(&self, ctx: &Context<T>, value: T) -> Scope<'_> {
        tracing::trace!(context = ctx.name, depth = self.depth + 1, "publish");
        Scope {
            parent: Some(self),
            publication: Some(Publication {
                context_id: ctx.id,
                context_name: ctx.name,
                value: Box::new(value),
            }),
            depth: self.depth + 1,
        }
    }

    /// Publish `value` for the duration of `f`
    pub fn provide<T: 'static, R>(
        &self,
        ctx: &Context<T>,
        value: T,
        f: impl FnOnce(&Scope<'_>) -> R,
    ) -> R {
        let child = self.publish(ctx, value);
        f(&child)
    }

    /// Resolve `ctx`: nearest publication, else its fallback, else `UnscopedRead`
    pub fn read<'a, T: 'static>(&'a self, ctx: &'a Context<T>) -> Result<&'a T, UnscopedRead> {
        if let Some(value) = self.lookup(ctx) {
            return Ok(value);
        }
        match ctx.fallback.as_ref() {
            Some(fallback) => Ok(fallback),
            None => {
                tracing::debug!(
                    context = ctx.name,
                    provider = ctx.provider,
                    "read outside of any publication"
                );
                Err(ctx.unscoped())
            }
        }
    }

    /// Whether some enclosing scope published a value for `ctx`
    pub fn contains<T: 'static>(&self, ctx: &Context<T>) -> bool {
        self.lookup(ctx).is_some()
    }

    /// Number of publications between this scope and the root
    pub fn depth(&self) -> usize {
        self.depth
    }

    fn lookup<'a, T: 'static>(&'a self, ctx: &Context<T>) -> Option<&'a T> {
        let mut current: Option<&'a Scope<'a>> = Some(self);
        while let Some(scope) = current {
            if let Some(publication) = &scope.publication {
                if publication.context_id == ctx.id {
                    return publication.value.downcast_ref::<T>();
                }
            }
            current = scope.parent;
        }
        None
    }
}

impl fmt::Debug for Scope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut chain = Vec::with_capacity(self.depth);
        let mut current = Some(self);
        while let Some(scope) = current {
            if let Some(publication) = &scope.publication {
                chain.push(publication.context_name);
            }
            current = scope.parent;
        }
        f.debug_struct("Scope")
            .field("depth", &self.depth)
            .field("published", &chain)
            .finish()
    }
}
