//! State transition history tracking.
//!
//! Provides immutable tracking of completed transitions over time,
//! following functional programming principles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single completed transition.
///
/// `requested` is the state that was asked for; `to` is the leaf the machine
/// settled in after cascading through default substates.
///
/// # Example
///
/// ```rust
/// use stateful::core::TransitionRecord;
/// use chrono::Utc;
///
/// let record = TransitionRecord {
///     from: "off.dead".to_string(),
///     requested: "on".to_string(),
///     to: "on.idle".to_string(),
///     timestamp: Utc::now(),
/// };
/// assert!(record.cascaded());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Leaf state before the transition
    pub from: String,
    /// State named by the caller
    pub requested: String,
    /// Leaf state after the transition
    pub to: String,
    /// When the transition completed
    pub timestamp: DateTime<Utc>,
}

impl TransitionRecord {
    /// Whether the machine went deeper than the requested state.
    pub fn cascaded(&self) -> bool {
        self.requested != self.to
    }
}

/// Ordered history of completed transitions.
///
/// History is immutable - the `record` method returns a new history
/// with the transition added.
///
/// # Example
///
/// ```rust
/// use stateful::core::{StateHistory, TransitionRecord};
/// use chrono::Utc;
///
/// let history = StateHistory::new();
///
/// let history = history.record(TransitionRecord {
///     from: "_root".to_string(),
///     requested: "_root".to_string(),
///     to: "off".to_string(),
///     timestamp: Utc::now(),
/// });
///
/// let history = history.record(TransitionRecord {
///     from: "off".to_string(),
///     requested: "on".to_string(),
///     to: "on".to_string(),
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(history.get_path(), vec!["_root", "off", "on"]);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
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

    /// Record a transition, returning a new history.
    ///
    /// This does not mutate the existing history but returns a new one with
    /// the transition added.
    pub fn record(&self, transition: TransitionRecord) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// Append in place, dropping the oldest records beyond `limit`.
    pub(crate) fn push(&mut self, transition: TransitionRecord, limit: usize) {
        self.transitions.push(transition);
        let excess = self.transitions.len().saturating_sub(limit);
        self.transitions.drain(..excess);
    }

    /// Get the path of leaf states traversed.
    ///
    /// Returns the `from` state of the first transition, then the `to`
    /// state of each transition.
    pub fn get_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(first.from.as_str());
        }
        for transition in &self.transitions {
            path.push(transition.to.as_str());
        }
        path
    }

    /// Calculate total duration from first to last transition.
    ///
    /// Returns `None` if there are no transitions.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Get all transitions in order.
    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    /// Most recent transition.
    pub fn last(&self) -> Option<&TransitionRecord> {
        self.transitions.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(from: &str, to: &str) -> TransitionRecord {
        TransitionRecord {
            from: from.to_string(),
            requested: to.to_string(),
            to: to.to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn new_history_is_empty() {
        let history = StateHistory::new();
        assert_eq!(history.transitions().len(), 0);
        assert!(history.get_path().is_empty());
        assert!(history.duration().is_none());
        assert!(history.last().is_none());
    }

    #[test]
    fn record_is_immutable() {
        let history = StateHistory::new();
        let new_history = history.record(record("A", "B"));

        assert_eq!(history.transitions().len(), 0);
        assert_eq!(new_history.transitions().len(), 1);
    }

    #[test]
    fn get_path_returns_leaf_sequence() {
        let history = StateHistory::new()
            .record(record("_root", "A.B"))
            .record(record("A.B", "X"));

        assert_eq!(history.get_path(), vec!["_root", "A.B", "X"]);
        assert_eq!(history.last().unwrap().to, "X");
    }

    #[test]
    fn duration_calculates_elapsed_time() {
        let history = StateHistory::new().record(record("_root", "A"));
        std::thread::sleep(std::time::Duration::from_millis(10));
        let history = history.record(record("A", "B"));

        let duration = history.duration();
        assert!(duration.is_some());
        assert!(duration.unwrap() >= std::time::Duration::from_millis(10));
    }

    #[test]
    fn cascaded_compares_requested_and_reached_state() {
        let mut transition = record("off", "on");
        assert!(!transition.cascaded());
        transition.to = "on.idle".to_string();
        assert!(transition.cascaded());
    }

    #[test]
    fn push_drops_oldest_beyond_limit() {
        let mut history = StateHistory::new();
        history.push(record("_root", "A"), 2);
        history.push(record("A", "B"), 2);
        history.push(record("B", "C"), 2);

        assert_eq!(history.transitions().len(), 2);
        assert_eq!(history.get_path(), vec!["A", "B", "C"]);
    }

    #[test]
    fn history_serializes_correctly() {
        let history = StateHistory::new().record(record("_root", "A"));

        let json = serde_json::to_string(&history).unwrap();
        let deserialized: StateHistory = serde_json::from_str(&json).unwrap();

        assert_eq!(history.transitions(), deserialized.transitions());
    }
}
