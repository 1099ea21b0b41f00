//! Callback registry keyed by compiled ids.

use crate::core::{EventId, StateId};
use crate::runtime::context::{ActionContext, Context};
use crate::runtime::error::HookResult;
use std::fmt;
use std::sync::Arc;

/// Callback run right after a transition caused by its event.
///
/// The context lends mutable access to the machine data and can trigger
/// further events.
pub type ActionHook<D, P> =
    Arc<dyn Fn(&mut ActionContext<'_, D, P>, P) -> HookResult + Send + Sync>;

/// Callback run upon arriving at its state, with a snapshot of the data.
pub type EntryHook<D, P> = Arc<dyn Fn(&mut Context<'_, D, P>, &D) -> HookResult + Send + Sync>;

/// One optional action slot per event, one optional entry slot per state.
///
/// Lookups hand out clones of the `Arc` so a callback can run while the
/// machine that owns the registry is mutably borrowed by its context.
pub struct HookRegistry<D, P> {
    actions: Vec<Option<ActionHook<D, P>>>,
    entries: Vec<Option<EntryHook<D, P>>>,
}

impl<D, P> HookRegistry<D, P> {
    pub fn new(events: usize, states: usize) -> Self {
        Self {
            actions: vec![None; events],
            entries: vec![None; states],
        }
    }

    /// Install an action callback, returning the one it replaced.
    pub fn set_action(&mut self, event: EventId, hook: ActionHook<D, P>) -> Option<ActionHook<D, P>> {
        self.actions.get_mut(event.index())?.replace(hook)
    }

    /// Install an entry callback, returning the one it replaced.
    pub fn set_entry(&mut self, state: StateId, hook: EntryHook<D, P>) -> Option<EntryHook<D, P>> {
        self.entries.get_mut(state.index())?.replace(hook)
    }

    pub fn clear_action(&mut self, event: EventId) -> Option<ActionHook<D, P>> {
        self.actions.get_mut(event.index())?.take()
    }

    pub fn clear_entry(&mut self, state: StateId) -> Option<EntryHook<D, P>> {
        self.entries.get_mut(state.index())?.take()
    }

    pub fn action(&self, event: EventId) -> Option<ActionHook<D, P>> {
        self.actions.get(event.index())?.clone()
    }

    pub fn entry(&self, state: StateId) -> Option<EntryHook<D, P>> {
        self.entries.get(state.index())?.clone()
    }
}

impl<D, P> fmt::Debug for HookRegistry<D, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("actions", &self.actions.iter().filter(|h| h.is_some()).count())
            .field("entries", &self.entries.iter().filter(|h| h.is_some()).count())
            .finish()
    }
}
