//! fsmgen: finite state machines compiled to dense transition tables
//!
//! A machine is declared once as a set of named states and event rules,
//! validated, and compiled into an immutable [`TransitionTable`]. Any number
//! of [`Machine`] instances can then share that table, each holding its own
//! current state, data and callbacks.
//!
//! # Core Concepts
//!
//! - **Definition**: states plus event rules, built fluently, from JSON, or
//!   with the [`definition!`] macro
//! - **Table**: one cell per (state, event) pair plus a wildcard row that
//!   applies from any state unless the state has its own rule
//! - **Callbacks**: an action per event and an entry callback per state,
//!   both able to trigger further events reentrantly
//!
//! # Example
//!
//! ```rust
//! use fsmgen::definition;
//! use fsmgen::runtime::{Machine, TriggerError};
//! use std::sync::Arc;
//!
//! let table = definition! {
//!     audio_player {
//!         states: [init, loading, playing, paused],
//!         events: {
//!             load: * => loading,
//!             play: [loading, paused] => playing,
//!             pause: [playing] => paused,
//!             error: * => init,
//!         }
//!     }
//! }
//! .compile()?;
//!
//! let mut player: Machine<Option<String>, String> = Machine::new(Arc::new(table), None);
//! player.on_action("load", |ctx, url| {
//!     *ctx.data_mut() = Some(url);
//!     Ok(())
//! })?;
//! player.on_enter("loading", |ctx, _| Ok(ctx.trigger("play", String::new())?))?;
//!
//! player.trigger("load", "song.mp3".to_string())?;
//! assert_eq!(player.state_name(), "playing");
//! assert_eq!(player.data().as_deref(), Some("song.mp3"));
//!
//! player.trigger("pause", String::new())?;
//! let err = player.trigger("pause", String::new()).unwrap_err();
//! assert!(matches!(err, TriggerError::InvalidTransition { .. }));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod core;
pub mod runtime;

// Re-export commonly used types
pub use crate::builder::{BuildError, CompileMode, DefinitionError, EventDef, MachineDefinition};
pub use crate::core::{EventId, StateId, TransitionHistory, TransitionTable};
pub use crate::runtime::{Cancellation, Context, Machine, MachineOptions, TriggerError};
