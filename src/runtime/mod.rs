//! Dispatch runtime for compiled tables.
//!
//! A [`Machine`] pairs a shared [`TransitionTable`](crate::core::TransitionTable)
//! with its own current state, data and callbacks. Triggering an event
//! resolves the transition through the table, applies it, then runs the
//! event's action callback followed by the entry callback of the state the
//! machine ends up in. Callbacks may trigger further events through their
//! [`Context`].

mod cancel;
mod context;
mod error;
mod hooks;
mod machine;
mod options;

pub use cancel::{Cancellation, CancellationMode};
pub use context::{ActionContext, Context};
pub use error::{BoxError, HookResult, TriggerError};
pub use hooks::{ActionHook, EntryHook, HookRegistry};
pub use machine::{EventKey, Machine, StateKey};
pub use options::{DispatchMode, MachineOptions};
