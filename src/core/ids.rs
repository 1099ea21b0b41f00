//! Dense identifiers for compiled states and events.
//!
//! Names are resolved to small integers once, at compile time. Everything
//! downstream of the compiler (lookup, hooks, history) works on these ids.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a declared state within a compiled [`TransitionTable`].
///
/// `StateId(0)` is always the initial state.
///
/// [`TransitionTable`]: crate::core::TransitionTable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(u32);

impl StateId {
    /// The initial state of every compiled table.
    pub const INITIAL: StateId = StateId(0);

    pub(crate) const fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// Position of the state in declaration order.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Index of a distinct event name within a compiled table.
///
/// Events are numbered in order of first declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(u32);

impl EventId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// Position of the event in first-declaration order.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}
