//! Compiled transition table.
//!
//! The table is a dense row-major matrix of `Option<StateId>`: one row per
//! declared state plus a trailing wildcard row, one column per distinct
//! event. Lookup is two array reads at most.

use super::ids::{EventId, StateId};
use std::collections::HashMap;

/// Label used for the wildcard row in diagnostics and definitions.
pub const WILDCARD: &str = "*";

/// A row of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Row {
    /// Rules declared for one specific source state.
    State(StateId),
    /// Rules declared "from any state".
    Wildcard,
}

/// Metadata kept per distinct event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventInfo {
    pub name: String,
    /// Opaque payload type tag, carried for generated glue.
    pub payload: Option<String>,
}

/// A concrete edge admitted by the table from a given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionEdge {
    pub from: StateId,
    pub event: EventId,
    pub to: StateId,
    /// True when the edge comes from the wildcard row.
    pub wildcard: bool,
}

/// Immutable lookup structure mapping (state, event) to a target state.
///
/// Built by [`MachineDefinition::compile`]; safe to share across threads and
/// machine instances behind an `Arc`.
///
/// [`MachineDefinition::compile`]: crate::builder::MachineDefinition::compile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    name: String,
    states: Vec<String>,
    events: Vec<EventInfo>,
    state_index: HashMap<String, StateId>,
    event_index: HashMap<String, EventId>,
    cells: Vec<Option<StateId>>,
}

impl TransitionTable {
    /// Lay out an empty table for the given (already validated) names.
    pub(crate) fn with_layout(name: &str, states: &[String], events: Vec<EventInfo>) -> Self {
        let state_index = states
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), StateId::new(i)))
            .collect();
        let event_index = events
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.clone(), EventId::new(i)))
            .collect();
        let cells = vec![None; (states.len() + 1) * events.len()];

        Self {
            name: name.to_string(),
            states: states.to_vec(),
            events,
            state_index,
            event_index,
            cells,
        }
    }

    /// Write a rule, returning the target it replaced, if any.
    pub(crate) fn insert(&mut self, row: Row, event: EventId, target: StateId) -> Option<StateId> {
        let slot = self.slot(row, event)?;
        self.cells[slot].replace(target)
    }

    fn slot(&self, row: Row, event: EventId) -> Option<usize> {
        let row = match row {
            Row::State(state) if state.index() < self.states.len() => state.index(),
            Row::State(_) => return None,
            Row::Wildcard => self.states.len(),
        };
        (event.index() < self.events.len()).then(|| row * self.events.len() + event.index())
    }

    /// Machine name from the definition.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The first declared state.
    pub fn initial_state(&self) -> StateId {
        StateId::INITIAL
    }

    /// Number of declared states.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Number of distinct events.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Resolve a state name to its id.
    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.state_index.get(name).copied()
    }

    /// Resolve an event name to its id.
    pub fn event_id(&self, name: &str) -> Option<EventId> {
        self.event_index.get(name).copied()
    }

    /// Name of a state, `None` for ids from another table.
    pub fn state_name(&self, state: StateId) -> Option<&str> {
        self.states.get(state.index()).map(String::as_str)
    }

    /// Name of an event, `None` for ids from another table.
    pub fn event_name(&self, event: EventId) -> Option<&str> {
        self.events.get(event.index()).map(|e| e.name.as_str())
    }

    /// Payload type tag declared for the event, if any.
    pub fn payload_tag(&self, event: EventId) -> Option<&str> {
        self.events.get(event.index())?.payload.as_deref()
    }

    pub(crate) fn state_label(&self, state: StateId) -> &str {
        self.state_name(state).unwrap_or("?")
    }

    pub(crate) fn event_label(&self, event: EventId) -> &str {
        self.event_name(event).unwrap_or("?")
    }

    /// Iterate declared states in order.
    pub fn states(&self) -> impl Iterator<Item = (StateId, &str)> + '_ {
        self.states
            .iter()
            .enumerate()
            .map(|(i, s)| (StateId::new(i), s.as_str()))
    }

    /// Iterate distinct events in first-declaration order.
    pub fn events(&self) -> impl Iterator<Item = (EventId, &EventInfo)> + '_ {
        self.events
            .iter()
            .enumerate()
            .map(|(i, e)| (EventId::new(i), e))
    }

    /// The rule stored in exactly this row, without wildcard fallback.
    pub fn rule(&self, row: Row, event: EventId) -> Option<StateId> {
        self.slot(row, event).and_then(|slot| self.cells[slot])
    }

    /// Resolve the target of `event` from `state`.
    ///
    /// The state's own row wins; the wildcard row is only consulted when the
    /// state has no rule for the event.
    pub fn resolve(&self, state: StateId, event: EventId) -> Option<StateId> {
        self.rule(Row::State(state), event)
            .or_else(|| self.rule(Row::Wildcard, event))
    }

    /// Events that resolve to a target from `state`.
    pub fn events_from(&self, state: StateId) -> Vec<EventId> {
        (0..self.events.len())
            .map(EventId::new)
            .filter(|&event| self.resolve(state, event).is_some())
            .collect()
    }

    /// A state with no outgoing transitions, wildcard rules included.
    pub fn is_terminal(&self, state: StateId) -> bool {
        self.events_from(state).is_empty()
    }

    /// Every terminal state in declaration order.
    pub fn terminal_states(&self) -> Vec<StateId> {
        (0..self.states.len())
            .map(StateId::new)
            .filter(|&state| self.is_terminal(state))
            .collect()
    }

    /// Every concrete edge, with wildcard rules expanded per state.
    pub fn edges(&self) -> Vec<TransitionEdge> {
        let mut edges = Vec::new();
        for from in (0..self.states.len()).map(StateId::new) {
            for event in (0..self.events.len()).map(EventId::new) {
                if let Some(to) = self.rule(Row::State(from), event) {
                    edges.push(TransitionEdge {
                        from,
                        event,
                        to,
                        wildcard: false,
                    });
                } else if let Some(to) = self.rule(Row::Wildcard, event) {
                    edges.push(TransitionEdge {
                        from,
                        event,
                        to,
                        wildcard: true,
                    });
                }
            }
        }
        edges
    }
}
