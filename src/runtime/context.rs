//! Capability handles given to callbacks.
//!
//! A [`Context`] can trigger further events on the machine that invoked the
//! callback and inspect it, but cannot assign states directly. An
//! [`ActionContext`] additionally lends mutable access to the machine data.

use crate::core::{StateId, TransitionTable};
use crate::runtime::cancel::Cancellation;
use crate::runtime::error::TriggerError;
use crate::runtime::machine::{EventKey, Machine};
use std::ops::{Deref, DerefMut};

/// Per-callback handle back into the owning machine.
pub struct Context<'m, D, P> {
    machine: &'m mut Machine<D, P>,
    cancel: Cancellation,
}

impl<'m, D, P> Context<'m, D, P> {
    pub(crate) fn new(machine: &'m mut Machine<D, P>, cancel: Cancellation) -> Self {
        Self { machine, cancel }
    }

    /// The machine's state as of now, which may differ from the state the
    /// callback was invoked for once it has triggered further events.
    pub fn current_state(&self) -> StateId {
        self.machine.current_state()
    }

    pub fn state_name(&self) -> &str {
        self.machine.state_name()
    }

    pub fn table(&self) -> &TransitionTable {
        self.machine.table()
    }

    /// The token reentrant triggers from this context will observe.
    pub fn cancellation(&self) -> &Cancellation {
        &self.cancel
    }

    /// Number of triggers currently running on this machine.
    pub fn depth(&self) -> usize {
        self.machine.depth()
    }

    /// Whether `event` would resolve from the current state.
    pub fn can_trigger(&self, event: impl EventKey) -> bool {
        self.machine.can_trigger(event)
    }
}

impl<'m, D: Clone, P> Context<'m, D, P> {
    /// Trigger `event` on the owning machine.
    ///
    /// In nested dispatch mode this runs to completion, callbacks included,
    /// before returning. In queued mode it only validates the event name and
    /// enqueues it.
    pub fn trigger(&mut self, event: impl EventKey, payload: P) -> Result<(), TriggerError> {
        let event = event.event_id(self.machine.table())?;
        self.machine.submit(event, payload, self.cancel.clone())
    }
}

/// Context handed to action callbacks.
///
/// Derefs to [`Context`] for triggering and inspection.
pub struct ActionContext<'m, D, P> {
    context: Context<'m, D, P>,
}

impl<'m, D, P> ActionContext<'m, D, P> {
    pub(crate) fn new(machine: &'m mut Machine<D, P>, cancel: Cancellation) -> Self {
        Self {
            context: Context::new(machine, cancel),
        }
    }

    pub fn data(&self) -> &D {
        self.context.machine.data()
    }

    pub fn data_mut(&mut self) -> &mut D {
        self.context.machine.data_mut()
    }
}

impl<'m, D, P> Deref for ActionContext<'m, D, P> {
    type Target = Context<'m, D, P>;

    fn deref(&self) -> &Self::Target {
        &self.context
    }
}

impl<'m, D, P> DerefMut for ActionContext<'m, D, P> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.context
    }
}
