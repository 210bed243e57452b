//! Error types for dispatch and scoped reads

use std::borrow::Cow;

use thiserror::Error;

use crate::Action;

/// A reducer was handed an action it does not know how to apply.
///
/// Always fatal to that dispatch: the store keeps its previous state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported action: `{kind}`")]
pub struct UnsupportedAction {
    /// The kind (name) of the rejected action
    pub kind: Cow<'static, str>,
}

impl UnsupportedAction {
    /// Create an error for an action kind
    pub fn new(kind: impl Into<Cow<'static, str>>) -> Self {
        Self { kind: kind.into() }
    }

    /// Create an error naming the given action
    pub fn of<A: Action>(action: &A) -> Self {
        Self::new(action.name())
    }
}

/// A context was read with no enclosing publication and no fallback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{consumer}` must be used within a `{provider}`")]
pub struct UnscopedRead {
    /// Name of the context that was read
    pub context: &'static str,
    /// Name of the publisher expected to enclose the read
    pub provider: &'static str,
    /// Who attempted the read (the context name for plain reads)
    pub consumer: Cow<'static, str>,
}

impl UnscopedRead {
    /// Re-label the failing read with a consumer name (e.g. `use_count`)
    pub fn consumed_by(mut self, consumer: impl Into<Cow<'static, str>>) -> Self {
        self.consumer = consumer.into();
        self
    }
}

/// Either of the library's failure kinds
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    UnsupportedAction(#[from] UnsupportedAction),
    #[error(transparent)]
    UnscopedRead(#[from] UnscopedRead),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
