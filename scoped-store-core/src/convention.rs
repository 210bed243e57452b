//! Ready-made action shapes and reducers
//!
//! A [`Store`](crate::Store) does not care what an action looks like; the
//! reducer owns its interpretation. This module collects the common shapes
//! so they can be used without writing a reducer by hand:
//!
//! | Convention | Action | Reducer |
//! |---|---|---|
//! | Replacement | [`Replace<S>`] | [`replace`] |
//! | Step value | [`Step<D>`] | [`accumulate`] |
//! | Partial merge | [`Partial<P>`] | [`merge`] |
//! | Partial merge or updater | [`Patch<S>`] | [`patch`] |
//! | Tagged dispatch | `#[derive(Action)]` enum, or [`TaggedAction`] | your own |
//!
//! Tagged dispatch is the preferred form: one enum variant per kind, with a
//! `match` in the reducer that the compiler checks for exhaustiveness.
//! [`TaggedAction`] covers the case where kinds arrive as data (e.g. JSON)
//! and unknown kinds have to be rejected at runtime.
//!
//! # Example
//!
//! ```ignore
//! use scoped_store::convention::{accumulate, Step};
//!
//! let mut store = Store::new(0, accumulate::<i32, i32>);
//! store.dispatch(Step(5))?;
//! store.dispatch(Step(-2))?;
//! assert_eq!(*store.state(), 3);
//! ```

use std::fmt;
use std::ops::Add;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::UnsupportedAction;
use crate::{Action, ActionSummary};

// ============================================================================
// Replacement
// ============================================================================

/// The action *is* the next state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Replace<S>(pub S);

impl<S: Clone + fmt::Debug + Send + 'static> Action for Replace<S> {
    fn name(&self) -> &'static str {
        "Replace"
    }
}

impl<S: Clone + fmt::Debug + Send + 'static> ActionSummary for Replace<S> {}

/// Reducer for [`Replace`]: discards the current state.
pub fn replace<S>(_state: &S, action: Replace<S>) -> Result<S, UnsupportedAction> {
    Ok(action.0)
}

// ============================================================================
// Step value
// ============================================================================

/// An opaque delta combined with the current state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step<D>(pub D);

impl<D: Clone + fmt::Debug + Send + 'static> Action for Step<D> {
    fn name(&self) -> &'static str {
        "Step"
    }
}

impl<D: Clone + fmt::Debug + Send + 'static> ActionSummary for Step<D> {}

/// Reducer for [`Step`]: `state + delta`.
pub fn accumulate<S, D>(state: &S, action: Step<D>) -> Result<S, UnsupportedAction>
where
    S: Clone + Add<D, Output = S>,
{
    Ok(state.clone() + action.0)
}

// ============================================================================
// Partial merge
// ============================================================================

/// A state that can absorb a partial update.
///
/// `merge` is shallow: fields present in the patch replace the matching
/// fields, every other field is carried over from `self`.
pub trait Merge: Sized {
    /// The partial form of the state (typically a struct of `Option`s)
    type Patch: Clone + fmt::Debug + Send + 'static;

    /// Produce a new state with `patch` laid over `self`
    fn merge(&self, patch: Self::Patch) -> Self;
}

/// Top-level object merge. A non-object state is replaced by the patch.
impl Merge for Value {
    type Patch = Map<String, Value>;

    fn merge(&self, patch: Self::Patch) -> Self {
        let mut merged = match self {
            Value::Object(fields) => fields.clone(),
            _ => Map::new(),
        };
        merged.extend(patch);
        Value::Object(merged)
    }
}

/// A partial state to merge over the current one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partial<P>(pub P);

impl<P: Clone + fmt::Debug + Send + 'static> Action for Partial<P> {
    fn name(&self) -> &'static str {
        "Partial"
    }
}

impl<P: Clone + fmt::Debug + Send + 'static> ActionSummary for Partial<P> {}

/// Reducer for [`Partial`]: shallow merge.
pub fn merge<S: Merge>(state: &S, action: Partial<S::Patch>) -> Result<S, UnsupportedAction> {
    Ok(state.merge(action.0))
}

// ============================================================================
// Partial merge or updater
// ============================================================================

/// Computes a patch from the state current at dispatch time.
pub struct Updater<S: Merge>(Arc<dyn Fn(&S) -> S::Patch + Send + Sync>);

impl<S: Merge> Updater<S> {
    pub fn new(f: impl Fn(&S) -> S::Patch + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn apply(&self, state: &S) -> S::Patch {
        (self.0)(state)
    }
}

impl<S: Merge> Clone for Updater<S> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<S: Merge> fmt::Debug for Updater<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Updater(..)")
    }
}

/// Either a ready patch or a function producing one from the current state.
pub enum Patch<S: Merge> {
    Partial(S::Patch),
    Update(Updater<S>),
}

impl<S: Merge> Patch<S> {
    /// Build an updater patch from a closure
    pub fn update(f: impl Fn(&S) -> S::Patch + Send + Sync + 'static) -> Self {
        Patch::Update(Updater::new(f))
    }

    /// Resolve to a concrete patch against `state`
    pub fn resolve(self, state: &S) -> S::Patch {
        match self {
            Patch::Partial(partial) => partial,
            Patch::Update(updater) => updater.apply(state),
        }
    }
}

impl<S: Merge> Clone for Patch<S> {
    fn clone(&self) -> Self {
        match self {
            Patch::Partial(partial) => Patch::Partial(partial.clone()),
            Patch::Update(updater) => Patch::Update(updater.clone()),
        }
    }
}

impl<S: Merge> fmt::Debug for Patch<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Patch::Partial(partial) => f.debug_tuple("Partial").field(partial).finish(),
            Patch::Update(updater) => f.debug_tuple("Update").field(updater).finish(),
        }
    }
}

impl<S: Merge + 'static> Action for Patch<S> {
    fn name(&self) -> &'static str {
        match self {
            Patch::Partial(_) => "Partial",
            Patch::Update(_) => "Update",
        }
    }
}

impl<S: Merge + 'static> ActionSummary for Patch<S> {}

/// Reducer for [`Patch`]: resolve the updater (if any), then shallow merge.
pub fn patch<S: Merge>(state: &S, action: Patch<S>) -> Result<S, UnsupportedAction> {
    let partial = action.resolve(state);
    Ok(state.merge(partial))
}

// ============================================================================
// Tagged dispatch (dynamic)
// ============================================================================

/// A `{ "kind": ..., ...payload }` record, for kinds that arrive as data.
///
/// ```ignore
/// let action: TaggedAction = serde_json::from_str(r#"{"kind":"add","amount":3}"#)?;
/// assert_eq!(action.kind, "add");
/// assert_eq!(action.get("amount"), Some(&json!(3)));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaggedAction {
    pub kind: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl TaggedAction {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: Map::new(),
        }
    }

    /// Add a payload field
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Look up a payload field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// The error a reducer returns when it does not handle this kind
    pub fn unsupported(&self) -> UnsupportedAction {
        UnsupportedAction::new(self.kind.clone())
    }
}

impl Action for TaggedAction {
    fn name(&self) -> &'static str {
        "Tagged"
    }
}

impl ActionSummary for TaggedAction {
    fn summary(&self) -> String {
        if self.payload.is_empty() {
            self.kind.clone()
        } else {
            format!("{} {}", self.kind, Value::Object(self.payload.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Store;
    use serde_json::json;

    #[test]
    fn test_replace_sets_state_to_action() {
        let mut store = Store::new(String::from("initial"), replace::<String>);

        for value in ["a", "", "longer value"] {
            store.dispatch(Replace(value.to_string())).unwrap();
            assert_eq!(store.state(), value);
        }
        assert_eq!(store.revision(), 3);
    }

    #[test]
    fn test_step_accumulates() {
        let mut store = Store::new(10i64, accumulate::<i64, i64>);
        store.dispatch(Step(5)).unwrap();
        store.dispatch(Step(-20)).unwrap();
        assert_eq!(*store.state(), -5);
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Profile {
        name: String,
        age: u32,
        email: String,
    }

    #[derive(Clone, Debug, Default)]
    struct ProfilePatch {
        name: Option<String>,
        age: Option<u32>,
        email: Option<String>,
    }

    impl Merge for Profile {
        type Patch = ProfilePatch;

        fn merge(&self, patch: ProfilePatch) -> Self {
            Self {
                name: patch.name.unwrap_or_else(|| self.name.clone()),
                age: patch.age.unwrap_or(self.age),
                email: patch.email.unwrap_or_else(|| self.email.clone()),
            }
        }
    }

    fn ada() -> Profile {
        Profile {
            name: "Ada".into(),
            age: 36,
            email: "ada@example.com".into(),
        }
    }

    #[test]
    fn test_partial_merge_keeps_untouched_fields() {
        let mut store = Store::new(ada(), merge::<Profile>);

        store
            .dispatch(Partial(ProfilePatch {
                age: Some(37),
                ..Default::default()
            }))
            .unwrap();

        assert_eq!(
            store.state(),
            &Profile {
                age: 37,
                ..ada()
            }
        );
    }

    #[test]
    fn test_updater_matches_eager_patch() {
        let bump_age = |p: &Profile| ProfilePatch {
            age: Some(p.age + 1),
            ..Default::default()
        };

        let mut lazy = Store::new(ada(), patch::<Profile>);
        lazy.dispatch(Patch::update(bump_age)).unwrap();

        let mut eager = Store::new(ada(), patch::<Profile>);
        let computed = bump_age(eager.state());
        eager.dispatch(Patch::Partial(computed)).unwrap();

        assert_eq!(lazy.state(), eager.state());
        assert_eq!(lazy.state().age, 37);
    }

    #[test]
    fn test_updater_sees_latest_state() {
        let mut store = Store::new(ada(), patch::<Profile>);
        let bump = Patch::update(|p: &Profile| ProfilePatch {
            age: Some(p.age + 1),
            ..Default::default()
        });

        store.dispatch(bump.clone()).unwrap();
        store.dispatch(bump).unwrap();
        assert_eq!(store.state().age, 38);
    }

    #[test]
    fn test_patch_names() {
        let partial: Patch<Profile> = Patch::Partial(ProfilePatch::default());
        let update: Patch<Profile> = Patch::update(|_| ProfilePatch::default());
        assert_eq!(partial.name(), "Partial");
        assert_eq!(update.name(), "Update");
        assert_eq!(format!("{:?}", update), "Update(Updater(..))");
    }

    #[test]
    fn test_json_value_merge() {
        let mut store = Store::new(json!({"count": 1, "label": "clicks"}), merge::<Value>);

        let mut patch = Map::new();
        patch.insert("count".into(), json!(2));
        store.dispatch(Partial(patch)).unwrap();

        assert_eq!(store.state(), &json!({"count": 2, "label": "clicks"}));
    }

    #[test]
    fn test_json_merge_over_non_object() {
        let mut patch = Map::new();
        patch.insert("ready".into(), json!(true));
        assert_eq!(Value::Null.merge(patch), json!({"ready": true}));
    }

    fn tagged_reducer(count: &i64, action: TaggedAction) -> Result<i64, UnsupportedAction> {
        match action.kind.as_str() {
            "increment" => Ok(count + 1),
            "add" => {
                let amount = action
                    .get("amount")
                    .and_then(Value::as_i64)
                    .ok_or_else(|| action.unsupported())?;
                Ok(count + amount)
            }
            _ => Err(action.unsupported()),
        }
    }

    #[test]
    fn test_tagged_action_from_json() {
        let action: TaggedAction =
            serde_json::from_value(json!({"kind": "add", "amount": 4})).unwrap();
        assert_eq!(action, TaggedAction::new("add").with("amount", 4));

        let mut store = Store::new(0, tagged_reducer);
        store.dispatch(action).unwrap();
        store.dispatch(TaggedAction::new("increment")).unwrap();
        assert_eq!(*store.state(), 5);
    }

    #[test]
    fn test_tagged_summary() {
        assert_eq!(TaggedAction::new("reset").summary(), "reset");
        assert_eq!(
            TaggedAction::new("add").with("amount", 2).summary(),
            r#"add {"amount":2}"#
        );
    }

    #[test]
    fn test_unknown_tagged_kind_is_rejected() {
        let mut store = Store::new(3, tagged_reducer);

        let err = store.dispatch(TaggedAction::new("UNKNOWN")).unwrap_err();

        assert_eq!(err.kind, "UNKNOWN");
        assert_eq!(*store.state(), 3);
        assert_eq!(store.revision(), 0);
    }
}
