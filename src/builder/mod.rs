//! Definition-time API: declare states and event rules, then compile them
//! into a [`TransitionTable`](crate::core::TransitionTable).
//!
//! Definitions can be built fluently, parsed from JSON, or written with the
//! [`definition!`](crate::definition) macro.

pub mod error;
pub mod event;
pub mod machine;
pub mod macros;

pub use error::{BuildError, DefinitionError};
pub use event::{EventDef, Sources};
pub use machine::{CompileMode, MachineDefinition};
