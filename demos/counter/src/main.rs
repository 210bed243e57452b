//! Counter - a store shared through a scope
//!
//! This demo wires the two building blocks together:
//! - State/Actions/Reducer: `counter.rs`
//! - Store: built once with an initializer from `--start`
//! - Context: the store is published at the root, nested "components" read it
//!   with a guarded `use_counter` and dispatch through it
//!
//! Actions are given on the command line, either as a bare kind or as a JSON
//! record:
//!
//! ```text
//! counter --start 10 INCREMENT '{"kind":"SET_STEP","step":5}' INCREMENT
//! ```

mod counter;

use anyhow::Context as _;
use clap::Parser;
use scoped_store::logger::{ActionLoggerConfig, ActionLoggerMiddleware};
use scoped_store::{Context, Scope, SharedStore, Store, TaggedAction, UnscopedRead};
use tracing_subscriber::EnvFilter;

use crate::counter::{counter_context, reducer, use_counter, CounterAction, CounterState, CounterStore};

const DEFAULT_SCRIPT: &[&str] = &[
    "INCREMENT",
    "INCREMENT",
    r#"{"kind":"SET_STEP","step":5}"#,
    "INCREMENT",
    "DECREMENT",
];

/// Counter - scoped-store demo
#[derive(Parser, Debug)]
#[command(name = "counter")]
#[command(about = "Dispatch counter actions through a store published in a scope")]
struct Args {
    /// Initial count (parsed once by the store initializer)
    #[arg(long, short, default_value = "0")]
    start: String,

    /// Only log actions matching these comma-separated glob patterns
    #[arg(long)]
    log_actions: Option<String>,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,

    /// Actions to dispatch: a kind (`INCREMENT`) or a JSON record
    actions: Vec<String>,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose || args.log_actions.is_some());

    let script: Vec<String> = if args.actions.is_empty() {
        DEFAULT_SCRIPT.iter().map(|s| s.to_string()).collect()
    } else {
        args.actions.clone()
    };

    let logger = ActionLoggerMiddleware::new(ActionLoggerConfig::new(
        args.log_actions.as_deref(),
        None,
    ))
    .active(args.verbose || args.log_actions.is_some());

    let store = Store::with_initializer(args.start.as_str(), CounterState::from_seed, reducer);
    let store = SharedStore::with_middleware(store, logger);

    let ctx = counter_context();
    Scope::root().provide(&ctx, store.clone(), |scope| app(&ctx, scope, &script))?;

    let state = store.state();
    println!(
        "final: count = {} (step {}, {} updates)",
        state.count,
        state.step,
        store.revision()
    );
    Ok(())
}

// ============================================================================
// "Components": plain functions reading the published store
// ============================================================================

fn app(ctx: &Context<CounterStore>, scope: &Scope<'_>, script: &[String]) -> anyhow::Result<()> {
    for input in script {
        let action = parse_action(input)?;
        controls(ctx, scope, action)?;
        println!("{}", display(ctx, scope)?);
    }
    Ok(())
}

fn controls(
    ctx: &Context<CounterStore>,
    scope: &Scope<'_>,
    action: CounterAction,
) -> Result<(), scoped_store::Error> {
    use_counter(ctx, scope)?.dispatch(action)?;
    Ok(())
}

fn display(ctx: &Context<CounterStore>, scope: &Scope<'_>) -> Result<String, UnscopedRead> {
    let counter = use_counter(ctx, scope)?;
    Ok(counter.with_state(|s| format!("count = {:>4}  step = {}", s.count, s.step)))
}

fn parse_action(input: &str) -> anyhow::Result<CounterAction> {
    let input = input.trim();
    let tagged = if input.starts_with('{') {
        serde_json::from_str::<TaggedAction>(input)
            .with_context(|| format!("invalid action record: {}", input))?
    } else {
        TaggedAction::new(input)
    };
    Ok(CounterAction::try_from(tagged)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_kind_and_record() {
        assert_eq!(parse_action(" RESET ").unwrap(), CounterAction::Reset);
        assert_eq!(
            parse_action(r#"{"kind":"SET_STEP","step":2}"#).unwrap(),
            CounterAction::SetStep(2)
        );
        assert!(parse_action("{not json").is_err());
        assert!(parse_action("JUMP").is_err());
    }

    #[test]
    fn test_default_script_runs() {
        let ctx = counter_context();
        let store = SharedStore::new(Store::new(CounterState::from_seed("0"), reducer));
        let script: Vec<String> = DEFAULT_SCRIPT.iter().map(|s| s.to_string()).collect();

        Scope::root()
            .provide(&ctx, store.clone(), |scope| app(&ctx, scope, &script))
            .unwrap();

        assert_eq!(store.state(), CounterState { count: 2, step: 5 });
        assert_eq!(store.revision(), 5);
    }

    #[test]
    fn test_components_need_provider() {
        let ctx = counter_context();
        let root = Scope::root();

        let err = controls(&ctx, &root, CounterAction::Increment).unwrap_err();
        assert!(matches!(err, scoped_store::Error::UnscopedRead(_)));
        assert!(display(&ctx, &root).is_err());
    }

    #[test]
    fn test_unsupported_action_stops_script() {
        let ctx = counter_context();
        let store = SharedStore::new(Store::new(CounterState::from_seed("0"), reducer));
        let script = vec![
            "INCREMENT".to_string(),
            r#"{"kind":"SET_STEP","step":0}"#.to_string(),
            "INCREMENT".to_string(),
        ];

        let result = Scope::root().provide(&ctx, store.clone(), |scope| app(&ctx, scope, &script));

        assert!(result.is_err());
        assert_eq!(store.state().count, 1);
    }
}
