//! Per-level transition history.
//!
//! When `track_history` is enabled every graph level keeps an in-memory log
//! of how its active child changed over time. Entries name children of that
//! level only; descendants keep their own logs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single change of a level's active child.
///
/// `from` is `None` when nothing was active, `to` is `None` when the level
/// was ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Name of the child that was active before
    pub from: Option<String>,
    /// Name of the child that is active after
    pub to: Option<String>,
    /// When the change happened
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of transitions at one graph level.
///
/// # Example
///
/// ```rust
/// use stategraph::config::Config;
/// use stategraph::Graph;
///
/// let graph = Graph::<()>::with_config(Config::builder().track_history(true).build());
/// graph.define("idle", |_, _| {}).unwrap();
/// graph.define("busy", |_, _| {}).unwrap();
///
/// graph.go("idle", vec![]).unwrap();
/// graph.go("busy", vec![]).unwrap();
/// graph.end();
///
/// let history = graph.history();
/// assert_eq!(history.len(), 3);
/// assert_eq!(history.get_path(), vec![None, Some("idle"), Some("busy"), None]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateHistory {
    transitions: Vec<TransitionRecord>,
}

impl StateHistory {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Append a transition.
    pub fn record(&mut self, transition: TransitionRecord) {
        self.transitions.push(transition);
    }

    /// Keep only the newest `limit` transitions.
    pub fn retain_last(&mut self, limit: usize) {
        let excess = self.transitions.len().saturating_sub(limit);
        self.transitions.drain(..excess);
    }

    pub fn clear(&mut self) {
        self.transitions.clear();
    }

    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Get the sequence of active children traversed.
    ///
    /// Starts with the `from` of the first record, then the `to` of each
    /// record. `None` marks "nothing active".
    pub fn get_path(&self) -> Vec<Option<&str>> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(first.from.as_deref());
        }
        for transition in &self.transitions {
            path.push(transition.to.as_deref());
        }
        path
    }

    /// Time between the first and last recorded transition.
    ///
    /// Returns `None` if there are no transitions.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            last.timestamp
                .signed_duration_since(first.timestamp)
                .to_std()
                .ok()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(from: Option<&str>, to: Option<&str>, timestamp: DateTime<Utc>) -> TransitionRecord {
        TransitionRecord {
            from: from.map(str::to_string),
            to: to.map(str::to_string),
            timestamp,
        }
    }

    #[test]
    fn new_history_is_empty() {
        let history = StateHistory::new();
        assert!(history.is_empty());
        assert!(history.get_path().is_empty());
        assert!(history.duration().is_none());
    }

    #[test]
    fn path_follows_recorded_order() {
        let now = Utc::now();
        let mut history = StateHistory::new();
        history.record(record(None, Some("a"), now));
        history.record(record(Some("a"), Some("b"), now));
        history.record(record(Some("b"), None, now));

        assert_eq!(history.len(), 3);
        assert_eq!(history.get_path(), vec![None, Some("a"), Some("b"), None]);
    }

    #[test]
    fn duration_spans_first_to_last() {
        let start = Utc::now();
        let mut history = StateHistory::new();
        history.record(record(None, Some("a"), start));
        history.record(record(
            Some("a"),
            Some("b"),
            start + chrono::Duration::seconds(5),
        ));

        assert_eq!(history.duration(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn retain_last_drops_oldest_first() {
        let now = Utc::now();
        let mut history = StateHistory::new();
        history.record(record(None, Some("a"), now));
        history.record(record(Some("a"), Some("b"), now));
        history.record(record(Some("b"), Some("c"), now));

        history.retain_last(5);
        assert_eq!(history.len(), 3);

        history.retain_last(1);
        assert_eq!(history.get_path(), vec![Some("b"), Some("c")]);

        history.retain_last(0);
        assert!(history.is_empty());
    }

    #[test]
    fn history_serializes_records() {
        let mut history = StateHistory::new();
        history.record(record(None, Some("a"), Utc::now()));

        let json = serde_json::to_string(&history).unwrap();
        let restored: StateHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, history);
    }
}
