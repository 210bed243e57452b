//! Action logging for stores
//!
//! [`ActionLoggerMiddleware`] traces every dispatched action whose name passes
//! an include/exclude glob filter, warns once per rejected action, and can
//! keep the most recent entries in an [`ActionLog`] for inspection.
//!
//! ```ignore
//! use scoped_store::logger::{ActionLogConfig, ActionLoggerConfig, ActionLoggerMiddleware};
//!
//! // Tracing only, everything except step actions
//! let middleware = ActionLoggerMiddleware::new(ActionLoggerConfig::new(None, Some("Step")));
//!
//! // Tracing plus the last 100 entries
//! let mut store = StoreWithMiddleware::new(0, reducer, ActionLoggerMiddleware::with_default_log());
//! store.dispatch(Step(1))?;
//! for entry in store.middleware().log().unwrap().rejected() {
//!     println!("#{} {}", entry.sequence, entry.summary);
//! }
//! ```

use std::collections::VecDeque;

use serde::Deserialize;

use crate::action::ActionSummary;
use crate::store::Middleware;

/// Include/exclude filter over action names.
///
/// Patterns are globs: `*` matches any run of characters, `?` exactly one,
/// anything else matches itself (case-sensitive). An empty include list
/// admits every name; excludes are checked after includes.
///
/// Loadable from JSON: `{"include_patterns": ["Set*"], "exclude_patterns": ["SetTick"]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ActionLoggerConfig {
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

impl ActionLoggerConfig {
    /// Build from comma-separated pattern lists, as taken from a CLI flag
    ///
    /// ```
    /// use scoped_store_core::logger::ActionLoggerConfig;
    ///
    /// let config = ActionLoggerConfig::new(Some("Set*, Reset"), Some("SetTick"));
    /// assert!(config.should_log("SetName"));
    /// assert!(config.should_log("Reset"));
    /// assert!(!config.should_log("SetTick"));
    /// assert!(!config.should_log("Increment"));
    /// ```
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Self {
        Self {
            include_patterns: include.map(split_patterns).unwrap_or_default(),
            exclude_patterns: exclude.map(split_patterns).unwrap_or_default(),
        }
    }

    pub fn should_log(&self, action_name: &str) -> bool {
        let included = self.include_patterns.is_empty()
            || any_match(&self.include_patterns, action_name);
        included && !any_match(&self.exclude_patterns, action_name)
    }
}

fn any_match(patterns: &[String], name: &str) -> bool {
    patterns.iter().any(|p| glob_match(p, name))
}

fn split_patterns(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

// ============================================================================
// In-memory log
// ============================================================================

/// One dispatched action as recorded by an [`ActionLog`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionLogEntry {
    pub name: &'static str,
    pub summary: String,
    /// Position among all recorded actions, including evicted ones
    pub sequence: u64,
    /// `None` until the reducer has run
    pub applied: Option<bool>,
}

/// Capacity and filter of an [`ActionLog`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ActionLogConfig {
    pub capacity: usize,
    pub filter: ActionLoggerConfig,
}

impl Default for ActionLogConfig {
    fn default() -> Self {
        Self::with_capacity(100)
    }
}

impl ActionLogConfig {
    pub fn new(capacity: usize, filter: ActionLoggerConfig) -> Self {
        Self { capacity, filter }
    }

    /// Unfiltered log holding at most `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(capacity, ActionLoggerConfig::default())
    }
}

/// Bounded record of recent actions; the oldest entry is evicted first.
#[derive(Debug, Clone)]
pub struct ActionLog {
    entries: VecDeque<ActionLogEntry>,
    config: ActionLogConfig,
    recorded: u64,
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::new(ActionLogConfig::default())
    }
}

impl ActionLog {
    pub fn new(config: ActionLogConfig) -> Self {
        Self {
            entries: VecDeque::with_capacity(config.capacity),
            config,
            recorded: 0,
        }
    }

    /// Record `action`, returning its entry, or `None` if it was filtered out
    pub fn log<A: ActionSummary>(&mut self, action: &A) -> Option<&ActionLogEntry> {
        let name = action.name();
        if self.config.capacity == 0 || !self.config.filter.should_log(name) {
            return None;
        }

        if self.entries.len() == self.config.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(ActionLogEntry {
            name,
            summary: action.summary(),
            sequence: self.recorded,
            applied: None,
        });
        self.recorded += 1;
        self.entries.back()
    }

    /// Set the outcome of the newest entry
    pub fn settle_last(&mut self, applied: bool) {
        if let Some(entry) = self.entries.back_mut() {
            entry.applied = Some(applied);
        }
    }

    /// Oldest first
    pub fn entries(&self) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter()
    }

    /// Newest first, at most `count`
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter().rev().take(count)
    }

    /// Entries the reducer refused, oldest first
    pub fn rejected(&self) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter().filter(|e| e.applied == Some(false))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Middleware tracing dispatched actions, optionally recording them.
///
/// Filtered-in actions are traced at `debug` before the reducer runs; a
/// rejected one gets a single `warn` afterwards. With a log attached, each
/// recorded entry is settled with the reducer's outcome.
#[derive(Debug, Clone)]
pub struct ActionLoggerMiddleware {
    filter: ActionLoggerConfig,
    log: Option<ActionLog>,
    /// The action in flight was recorded and still needs its outcome
    pending: bool,
    active: bool,
}

impl ActionLoggerMiddleware {
    /// Tracing only
    pub fn new(filter: ActionLoggerConfig) -> Self {
        Self {
            filter,
            log: None,
            pending: false,
            active: true,
        }
    }

    /// Tracing plus an in-memory log; the log's filter is used for both
    pub fn with_log(config: ActionLogConfig) -> Self {
        let log = ActionLog::new(config.clone());
        Self {
            log: Some(log),
            ..Self::new(config.filter)
        }
    }

    pub fn with_default_log() -> Self {
        Self::with_log(ActionLogConfig::default())
    }

    /// Turn every hook into a no-op when `active` is false
    ///
    /// ```ignore
    /// let middleware = ActionLoggerMiddleware::new(config).active(args.verbose);
    /// ```
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn log(&self) -> Option<&ActionLog> {
        self.log.as_ref()
    }
}

impl<A: ActionSummary> Middleware<A> for ActionLoggerMiddleware {
    fn before(&mut self, action: &A) {
        if !self.active {
            return;
        }

        let name = action.name();
        if self.filter.should_log(name) {
            tracing::debug!(action = %name, summary = %action.summary(), "action");
        }
        self.pending = self
            .log
            .as_mut()
            .is_some_and(|log| log.log(action).is_some());
    }

    fn after(&mut self, action: &A, applied: bool) {
        if !self.active {
            return;
        }

        if !applied && self.filter.should_log(action.name()) {
            tracing::warn!(action = %action.name(), "action rejected");
        }
        if std::mem::take(&mut self.pending) {
            if let Some(log) = self.log.as_mut() {
                log.settle_last(applied);
            }
        }
    }
}

/// Glob match over whole names: `*` is any run of characters, `?` exactly one.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    matches(&pattern, &text)
}

fn matches(pattern: &[char], text: &[char]) -> bool {
    match (pattern.split_first(), text.split_first()) {
        (None, _) => text.is_empty(),
        (Some(('*', rest)), _) => {
            matches(rest, text) || (!text.is_empty() && matches(pattern, &text[1..]))
        }
        (Some(('?', rest)), Some((_, tail))) => matches(rest, tail),
        (Some((p, rest)), Some((t, tail))) if p == t => matches(rest, tail),
        _ => false,
    }
}
