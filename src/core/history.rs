//! Transition history tracking.
//!
//! Every transition a machine applies is appended here, including the ones
//! issued reentrantly from callbacks, in the order their state mutation
//! happened.

use super::ids::{EventId, StateId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single applied transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// The state being transitioned from
    pub from: StateId,
    /// The state being transitioned to
    pub to: StateId,
    /// The event that caused the transition
    pub event: EventId,
    /// Number of enclosing triggers still running (0 for a top-level trigger)
    pub depth: usize,
    /// When the transition was applied
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of applied transitions.
///
/// # Example
///
/// ```rust
/// use fsmgen::definition;
/// use fsmgen::runtime::Machine;
/// use std::sync::Arc;
///
/// let table = definition! {
///     door {
///         states: [closed, open],
///         events: { open: [closed] => open, close: [open] => closed }
///     }
/// }
/// .compile()
/// .unwrap();
///
/// let mut machine: Machine<()> = Machine::new(Arc::new(table), ());
/// machine.trigger("open", ()).unwrap();
/// machine.trigger("close", ()).unwrap();
///
/// let path = machine.history().path();
/// assert_eq!(path.len(), 3); // closed -> open -> closed
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionHistory {
    transitions: Vec<TransitionRecord>,
}

impl TransitionHistory {
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Append a transition.
    pub fn record(&mut self, transition: TransitionRecord) {
        self.transitions.push(transition);
    }

    /// Get the path of states traversed.
    ///
    /// The `from` of the first transition, then the `to` of each transition.
    pub fn path(&self) -> Vec<StateId> {
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        if let Some(first) = self.transitions.first() {
            path.push(first.from);
        }
        path.extend(self.transitions.iter().map(|t| t.to));
        path
    }

    /// Time elapsed between the first and last recorded transition.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.transitions.first()?, self.transitions.last()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    pub fn last(&self) -> Option<&TransitionRecord> {
        self.transitions.last()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn clear(&mut self) {
        self.transitions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(from: usize, to: usize, depth: usize) -> TransitionRecord {
        TransitionRecord {
            from: StateId::new(from),
            to: StateId::new(to),
            event: EventId::new(0),
            depth,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn new_history_is_empty() {
        let history = TransitionHistory::new();
        assert!(history.is_empty());
        assert!(history.path().is_empty());
        assert!(history.duration().is_none());
    }

    #[test]
    fn path_follows_recorded_targets() {
        let mut history = TransitionHistory::new();
        history.record(record(0, 1, 0));
        history.record(record(1, 2, 1));
        history.record(record(2, 0, 0));

        let path: Vec<usize> = history.path().into_iter().map(StateId::index).collect();
        assert_eq!(path, vec![0, 1, 2, 0]);
        assert_eq!(history.last().map(|t| t.depth), Some(0));
    }

    #[test]
    fn duration_spans_first_to_last() {
        let mut history = TransitionHistory::new();
        let start = Utc::now();
        let mut first = record(0, 1, 0);
        first.timestamp = start;
        let mut second = record(1, 2, 0);
        second.timestamp = start + chrono::Duration::milliseconds(250);

        history.record(first);
        history.record(second);

        assert_eq!(history.duration(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn clear_drops_all_records() {
        let mut history = TransitionHistory::new();
        history.record(record(0, 1, 0));
        history.clear();
        assert_eq!(history.len(), 0);
    }

    #[test]
    fn history_serializes_to_json() {
        let mut history = TransitionHistory::new();
        history.record(record(0, 1, 0));

        let json = serde_json::to_string(&history).unwrap();
        let restored: TransitionHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, history);
    }
}
