//! Counter state, actions and reducer
//!
//! FRAMEWORK PATTERN: Tagged dispatch
//! - One enum variant per action kind, one reducer arm per variant
//! - Kinds that arrive as data are converted with `TryFrom<TaggedAction>`
//! - Anything the reducer cannot interpret is an `UnsupportedAction`

use scoped_store::prelude::*;
use serde_json::Value;

#[derive(Clone, Debug, PartialEq)]
pub struct CounterState {
    pub count: i64,
    pub step: i64,
}

impl CounterState {
    /// Initializer: parse the `--start` seed once, at store creation
    pub fn from_seed(seed: &str) -> Self {
        let count = seed.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(seed, "start value is not a number, using 0");
            0
        });
        Self { count, step: 1 }
    }
}

#[derive(Action, Clone, Debug, PartialEq)]
#[action(rename_all = "SCREAMING_SNAKE_CASE", summary)]
pub enum CounterAction {
    Increment,
    Decrement,
    SetStep(i64),
    Reset,
}

impl TryFrom<TaggedAction> for CounterAction {
    type Error = UnsupportedAction;

    fn try_from(action: TaggedAction) -> Result<Self, Self::Error> {
        match action.kind.as_str() {
            "INCREMENT" => Ok(Self::Increment),
            "DECREMENT" => Ok(Self::Decrement),
            "RESET" => Ok(Self::Reset),
            "SET_STEP" => action
                .get("step")
                .and_then(Value::as_i64)
                .map(Self::SetStep)
                .ok_or_else(|| action.unsupported()),
            _ => Err(action.unsupported()),
        }
    }
}

pub fn reducer(
    state: &CounterState,
    action: CounterAction,
) -> Result<CounterState, UnsupportedAction> {
    match action {
        // out-of-range counts are rejected, never wrapped
        CounterAction::Increment => match state.count.checked_add(state.step) {
            Some(count) => Ok(CounterState {
                count,
                ..state.clone()
            }),
            None => Err(UnsupportedAction::of(&action)),
        },
        CounterAction::Decrement => match state.count.checked_sub(state.step) {
            Some(count) => Ok(CounterState {
                count,
                ..state.clone()
            }),
            None => Err(UnsupportedAction::of(&action)),
        },
        // step must stay positive
        CounterAction::SetStep(step) if step > 0 => Ok(CounterState {
            step,
            ..state.clone()
        }),
        CounterAction::Reset => Ok(CounterState {
            count: 0,
            ..state.clone()
        }),
        other => Err(UnsupportedAction::of(&other)),
    }
}

pub type CounterStore = SharedStore<CounterState, CounterAction>;

pub fn counter_context() -> Context<CounterStore> {
    Context::new("CounterContext").provider("CounterProvider")
}

/// Guarded read of the published counter store
pub fn use_counter<'a>(
    ctx: &'a Context<CounterStore>,
    scope: &'a Scope<'_>,
) -> Result<&'a CounterStore, UnscopedRead> {
    ctx.require(scope, "use_counter")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoped_store::testing::TestHarness;
    use serde_json::json;

    fn tagged(value: Value) -> TaggedAction {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_from_seed() {
        assert_eq!(CounterState::from_seed(" 12 ").count, 12);
        assert_eq!(CounterState::from_seed("twelve").count, 0);
    }

    #[test]
    fn test_step_applies_to_increment_and_decrement() {
        let mut harness = TestHarness::new(CounterState::from_seed("0"), reducer);

        harness.dispatch(CounterAction::SetStep(3)).unwrap();
        harness.dispatch(CounterAction::Increment).unwrap();
        harness.dispatch(CounterAction::Increment).unwrap();
        harness.dispatch(CounterAction::Decrement).unwrap();

        assert_eq!(harness.state(), &CounterState { count: 3, step: 3 });
    }

    #[test]
    fn test_reset_keeps_step() {
        let mut harness = TestHarness::new(CounterState { count: 9, step: 2 }, reducer);
        harness.dispatch(CounterAction::Reset).unwrap();
        assert_eq!(harness.state(), &CounterState { count: 0, step: 2 });
    }

    #[test]
    fn test_non_positive_step_is_rejected() {
        let mut harness = TestHarness::new(CounterState::from_seed("1"), reducer);
        let err = harness.assert_rejected(CounterAction::SetStep(-1));
        assert_eq!(err.kind, "SET_STEP");
    }

    #[test]
    fn test_count_overflow_is_rejected() {
        let mut harness = TestHarness::new(
            CounterState {
                count: i64::MAX,
                step: 1,
            },
            reducer,
        );
        let err = harness.assert_rejected(CounterAction::Increment);
        assert_eq!(err.kind, "INCREMENT");
        harness.dispatch(CounterAction::Decrement).unwrap();
        assert_eq!(harness.state().count, i64::MAX - 1);

        let mut harness = TestHarness::new(
            CounterState {
                count: i64::MIN,
                step: 3,
            },
            reducer,
        );
        let err = harness.assert_rejected(CounterAction::Decrement);
        assert_eq!(err.kind, "DECREMENT");
    }

    #[test]
    fn test_max_seed_then_increment() {
        let mut store =
            Store::with_initializer("9223372036854775807", CounterState::from_seed, reducer);
        assert_eq!(store.state().count, i64::MAX);

        assert!(store.dispatch(CounterAction::Increment).is_err());
        assert_eq!(store.state().count, i64::MAX);
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_tagged_conversion() {
        assert_eq!(
            CounterAction::try_from(tagged(json!({"kind": "INCREMENT"}))),
            Ok(CounterAction::Increment)
        );
        assert_eq!(
            CounterAction::try_from(tagged(json!({"kind": "SET_STEP", "step": 4}))),
            Ok(CounterAction::SetStep(4))
        );

        let err = CounterAction::try_from(tagged(json!({"kind": "UNKNOWN"}))).unwrap_err();
        assert_eq!(err.kind, "UNKNOWN");

        let err = CounterAction::try_from(tagged(json!({"kind": "SET_STEP"}))).unwrap_err();
        assert_eq!(err.kind, "SET_STEP");
    }

    #[test]
    fn test_every_kind_converts() {
        for kind in CounterAction::KINDS {
            let action = TaggedAction::new(*kind).with("step", 1);
            let converted = CounterAction::try_from(action).unwrap();
            assert_eq!(converted.name(), *kind);
        }
    }

    #[test]
    fn test_use_counter_outside_provider() {
        let ctx = counter_context();
        let err = use_counter(&ctx, &Scope::root()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "`use_counter` must be used within a `CounterProvider`"
        );
    }
}
