//! Machine instances and trigger dispatch.

use crate::core::{EventId, StateId, TransitionHistory, TransitionRecord, TransitionTable};
use crate::runtime::cancel::{Cancellation, CancellationMode};
use crate::runtime::context::{ActionContext, Context};
use crate::runtime::error::{HookResult, TriggerError};
use crate::runtime::hooks::HookRegistry;
use crate::runtime::options::{DispatchMode, MachineOptions};
use chrono::Utc;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// Anything that names an event of a compiled table.
pub trait EventKey {
    fn event_id(&self, table: &TransitionTable) -> Result<EventId, TriggerError>;
}

impl EventKey for EventId {
    fn event_id(&self, table: &TransitionTable) -> Result<EventId, TriggerError> {
        if self.index() < table.event_count() {
            Ok(*self)
        } else {
            Err(TriggerError::UnknownEvent {
                event: self.to_string(),
            })
        }
    }
}

impl EventKey for str {
    fn event_id(&self, table: &TransitionTable) -> Result<EventId, TriggerError> {
        table
            .event_id(self)
            .ok_or_else(|| TriggerError::UnknownEvent {
                event: self.to_string(),
            })
    }
}

impl EventKey for String {
    fn event_id(&self, table: &TransitionTable) -> Result<EventId, TriggerError> {
        self.as_str().event_id(table)
    }
}

impl<T: EventKey + ?Sized> EventKey for &T {
    fn event_id(&self, table: &TransitionTable) -> Result<EventId, TriggerError> {
        (**self).event_id(table)
    }
}

/// Anything that names a state of a compiled table.
pub trait StateKey {
    fn state_id(&self, table: &TransitionTable) -> Result<StateId, TriggerError>;
}

impl StateKey for StateId {
    fn state_id(&self, table: &TransitionTable) -> Result<StateId, TriggerError> {
        if self.index() < table.state_count() {
            Ok(*self)
        } else {
            Err(TriggerError::UnknownState {
                state: self.to_string(),
            })
        }
    }
}

impl StateKey for str {
    fn state_id(&self, table: &TransitionTable) -> Result<StateId, TriggerError> {
        table
            .state_id(self)
            .ok_or_else(|| TriggerError::UnknownState {
                state: self.to_string(),
            })
    }
}

impl StateKey for String {
    fn state_id(&self, table: &TransitionTable) -> Result<StateId, TriggerError> {
        self.as_str().state_id(table)
    }
}

impl<T: StateKey + ?Sized> StateKey for &T {
    fn state_id(&self, table: &TransitionTable) -> Result<StateId, TriggerError> {
        (**self).state_id(table)
    }
}

/// A trigger waiting in the queue in [`DispatchMode::Queued`].
struct Pending<P> {
    event: EventId,
    payload: P,
    cancel: Cancellation,
}

/// A running instance of a compiled state machine.
///
/// `D` is the machine data mutated by action callbacks, `P` the event
/// payload type. Triggering requires `&mut self`; callbacks reach back into
/// the machine only through their [`Context`].
///
/// # Example
///
/// ```
/// use fsmgen::definition;
/// use fsmgen::runtime::Machine;
/// use std::sync::Arc;
///
/// let table = definition! {
///     init_final {
///         states: [init, running, final],
///         events: { run: [init] => running, finish: [running] => final }
///     }
/// }
/// .compile()
/// .unwrap();
///
/// let mut machine: Machine<Vec<&str>> = Machine::new(Arc::new(table), Vec::new());
/// machine
///     .on_action("run", |ctx, ()| {
///         ctx.data_mut().push("run");
///         Ok(())
///     })
///     .unwrap();
/// machine
///     .on_enter("running", |ctx, _| Ok(ctx.trigger("finish", ())?))
///     .unwrap();
///
/// machine.trigger("run", ()).unwrap();
/// assert_eq!(machine.state_name(), "final");
/// assert_eq!(machine.data(), &vec!["run"]);
/// ```
pub struct Machine<D, P = ()> {
    table: Arc<TransitionTable>,
    current: StateId,
    data: D,
    hooks: HookRegistry<D, P>,
    options: MachineOptions,
    history: TransitionHistory,
    depth: usize,
    queue: VecDeque<Pending<P>>,
    draining: bool,
}

impl<D, P> Machine<D, P> {
    /// Create an instance in the table's initial state.
    pub fn new(table: Arc<TransitionTable>, data: D) -> Self {
        Self::with_options(table, data, MachineOptions::default())
    }

    /// Create an instance configured by `options`.
    pub fn with_options(table: Arc<TransitionTable>, data: D, options: MachineOptions) -> Self {
        let hooks = HookRegistry::new(table.event_count(), table.state_count());
        Self {
            current: table.initial_state(),
            table,
            data,
            hooks,
            options,
            history: TransitionHistory::new(),
            depth: 0,
            queue: VecDeque::new(),
            draining: false,
        }
    }

    /// Register the action callback for `event`, replacing any previous one.
    pub fn on_action<F>(&mut self, event: impl EventKey, hook: F) -> Result<&mut Self, TriggerError>
    where
        F: Fn(&mut ActionContext<'_, D, P>, P) -> HookResult + Send + Sync + 'static,
    {
        let event = event.event_id(&self.table)?;
        self.hooks.set_action(event, Arc::new(hook));
        Ok(self)
    }

    /// Register the entry callback for `state`, replacing any previous one.
    pub fn on_enter<F>(&mut self, state: impl StateKey, hook: F) -> Result<&mut Self, TriggerError>
    where
        F: Fn(&mut Context<'_, D, P>, &D) -> HookResult + Send + Sync + 'static,
    {
        let state = state.state_id(&self.table)?;
        self.hooks.set_entry(state, Arc::new(hook));
        Ok(self)
    }

    /// Remove the action callback for `event`.
    pub fn clear_action(&mut self, event: impl EventKey) -> Result<&mut Self, TriggerError> {
        let event = event.event_id(&self.table)?;
        self.hooks.clear_action(event);
        Ok(self)
    }

    /// Remove the entry callback for `state`.
    pub fn clear_entry(&mut self, state: impl StateKey) -> Result<&mut Self, TriggerError> {
        let state = state.state_id(&self.table)?;
        self.hooks.clear_entry(state);
        Ok(self)
    }

    /// Id of the current state.
    pub fn current_state(&self) -> StateId {
        self.current
    }

    /// Name of the current state.
    pub fn state_name(&self) -> &str {
        self.table.state_label(self.current)
    }

    /// Whether the machine is currently in the state called `name`.
    pub fn is_in(&self, name: &str) -> bool {
        self.table.state_id(name) == Some(self.current)
    }

    /// No event resolves from the current state.
    pub fn is_terminal(&self) -> bool {
        self.table.is_terminal(self.current)
    }

    /// Whether `event` would resolve from the current state.
    pub fn can_trigger(&self, event: impl EventKey) -> bool {
        event
            .event_id(&self.table)
            .is_ok_and(|event| self.table.resolve(self.current, event).is_some())
    }

    /// The compiled table this machine runs on.
    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// The shared table, for constructing sibling instances.
    pub fn shared_table(&self) -> Arc<TransitionTable> {
        Arc::clone(&self.table)
    }

    /// Machine data as last written by action callbacks.
    pub fn data(&self) -> &D {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut D {
        &mut self.data
    }

    /// Consume the machine, returning its data.
    pub fn into_data(self) -> D {
        self.data
    }

    /// Transitions applied so far, reentrant ones included.
    pub fn history(&self) -> &TransitionHistory {
        &self.history
    }

    /// Options this machine was created with.
    pub fn options(&self) -> &MachineOptions {
        &self.options
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    fn forwarded(&self, cancel: &Cancellation) -> Cancellation {
        match self.options.cancellation {
            CancellationMode::Propagate => cancel.clone(),
            CancellationMode::Detach => Cancellation::none(),
        }
    }
}

impl<D: Clone, P> Machine<D, P> {
    /// Trigger `event` with an unbounded cancellation token.
    pub fn trigger(&mut self, event: impl EventKey, payload: P) -> Result<(), TriggerError> {
        self.trigger_with(event, payload, Cancellation::none())
    }

    /// Trigger `event`.
    ///
    /// The transition is applied before any callback runs and is not rolled
    /// back if a callback fails. Returns once every reentrant trigger issued
    /// by the callbacks has completed.
    pub fn trigger_with(
        &mut self,
        event: impl EventKey,
        payload: P,
        cancel: Cancellation,
    ) -> Result<(), TriggerError> {
        let event = event.event_id(&self.table)?;
        self.submit(event, payload, cancel)
    }

    /// Run the entry callback of the current state without a transition.
    pub fn start(&mut self) -> Result<(), TriggerError> {
        self.start_with(Cancellation::none())
    }

    /// [`start`](Self::start) with a caller-supplied cancellation token.
    pub fn start_with(&mut self, cancel: Cancellation) -> Result<(), TriggerError> {
        let table = Arc::clone(&self.table);
        match self.options.dispatch {
            DispatchMode::Queued if !self.draining => {
                self.run_queued(|machine| machine.enter(&table, &cancel))
            }
            _ => self.enter(&table, &cancel),
        }
    }

    pub(crate) fn submit(
        &mut self,
        event: EventId,
        payload: P,
        cancel: Cancellation,
    ) -> Result<(), TriggerError> {
        match self.options.dispatch {
            DispatchMode::Nested => self.dispatch(event, payload, &cancel),
            DispatchMode::Queued => {
                self.queue.push_back(Pending {
                    event,
                    payload,
                    cancel,
                });
                if self.draining {
                    tracing::trace!(
                        machine = %self.table.name(),
                        event = %self.table.event_label(event),
                        queued = self.queue.len(),
                        "deferred reentrant trigger"
                    );
                    return Ok(());
                }
                self.run_queued(|_| Ok(()))
            }
        }
    }

    /// Run `first`, then drain the queue until it is empty or a trigger
    /// fails. Whatever is left after a failure is dropped.
    fn run_queued<F>(&mut self, first: F) -> Result<(), TriggerError>
    where
        F: FnOnce(&mut Self) -> Result<(), TriggerError>,
    {
        self.draining = true;
        let mut result = first(self);
        while result.is_ok() {
            let Some(pending) = self.queue.pop_front() else {
                break;
            };
            result = self.dispatch(pending.event, pending.payload, &pending.cancel);
        }
        if !self.queue.is_empty() {
            tracing::debug!(
                machine = %self.table.name(),
                dropped = self.queue.len(),
                "dropped queued triggers after failure"
            );
            self.queue.clear();
        }
        self.draining = false;
        result
    }

    fn dispatch(
        &mut self,
        event: EventId,
        payload: P,
        cancel: &Cancellation,
    ) -> Result<(), TriggerError> {
        let table = Arc::clone(&self.table);
        let event_name = table.event_label(event);

        cancel.check(event_name)?;
        if let Some(max) = self.options.max_depth {
            if self.depth > max {
                return Err(TriggerError::DepthExceeded {
                    event: event_name.to_string(),
                    depth: max,
                });
            }
        }

        let from = self.current;
        let Some(target) = table.resolve(from, event) else {
            tracing::debug!(
                machine = %table.name(),
                state = %table.state_label(from),
                event = %event_name,
                "rejected invalid transition"
            );
            return Err(TriggerError::InvalidTransition {
                state: table.state_label(from).to_string(),
                event: event_name.to_string(),
            });
        };

        self.current = target;
        if self.options.record_history {
            self.history.record(TransitionRecord {
                from,
                to: target,
                event,
                depth: self.depth,
                timestamp: Utc::now(),
            });
        }
        tracing::debug!(
            machine = %table.name(),
            from = %table.state_label(from),
            to = %table.state_label(target),
            event = %event_name,
            depth = self.depth,
            "applied transition"
        );

        self.depth += 1;
        let result = self.run_callbacks(&table, event, payload, cancel);
        self.depth -= 1;
        result
    }

    fn run_callbacks(
        &mut self,
        table: &TransitionTable,
        event: EventId,
        payload: P,
        cancel: &Cancellation,
    ) -> Result<(), TriggerError> {
        if let Some(action) = self.hooks.action(event) {
            tracing::trace!(event = %table.event_label(event), "running action callback");
            let token = self.forwarded(cancel);
            let mut ctx = ActionContext::new(self, token);
            action(&mut ctx, payload).map_err(|source| TriggerError::Action {
                event: table.event_label(event).to_string(),
                source,
            })?;
        }
        self.enter(table, cancel)
    }

    /// Invoke the entry callback of whatever state the machine is in now.
    fn enter(&mut self, table: &TransitionTable, cancel: &Cancellation) -> Result<(), TriggerError> {
        let state = self.current;
        let Some(entry) = self.hooks.entry(state) else {
            return Ok(());
        };

        tracing::trace!(state = %table.state_label(state), "running entry callback");
        let snapshot = self.data.clone();
        let token = self.forwarded(cancel);
        let mut ctx = Context::new(self, token);
        entry(&mut ctx, &snapshot).map_err(|source| TriggerError::Entry {
            state: table.state_label(state).to_string(),
            source,
        })
    }
}

impl<D: fmt::Debug, P> fmt::Debug for Machine<D, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("name", &self.table.name())
            .field("state", &self.state_name())
            .field("data", &self.data)
            .field("hooks", &self.hooks)
            .field("options", &self.options)
            .field("depth", &self.depth)
            .finish()
    }
}
