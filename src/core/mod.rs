//! Compiled state machine core.
//!
//! This module contains the pure, immutable side of the engine:
//! - Dense ids for states and events
//! - The compiled transition table with wildcard fallback
//! - Transition history records
//!
//! Nothing here owns callbacks or mutable machine data; see
//! [`runtime`](crate::runtime) for dispatch.

mod history;
mod ids;
mod table;

pub use history::{TransitionHistory, TransitionRecord};
pub use ids::{EventId, StateId};
pub use table::{EventInfo, Row, TransitionEdge, TransitionTable, WILDCARD};
