//! Runtime configuration for machine instances.
//!
//! Options are plain data with defaults for every field, so a partial JSON
//! document is enough to override a single setting.

use crate::runtime::cancel::CancellationMode;
use serde::{Deserialize, Serialize};

/// How reentrant triggers issued from callbacks are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// Run reentrant triggers immediately, on the caller's stack.
    #[default]
    Nested,
    /// Push reentrant triggers onto a FIFO drained by the outermost trigger
    /// after the current trigger's callbacks return.
    Queued,
}

/// Machine instance configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineOptions {
    pub dispatch: DispatchMode,
    pub cancellation: CancellationMode,
    /// Maximum number of enclosing triggers a reentrant trigger may run
    /// under. `0` allows top-level triggers only; `None` is unbounded.
    /// Applies to [`DispatchMode::Nested`]: queued triggers all run at
    /// depth 0 and never trip it.
    pub max_depth: Option<usize>,
    /// Record applied transitions in the machine history.
    pub record_history: bool,
}

impl Default for MachineOptions {
    fn default() -> Self {
        Self {
            dispatch: DispatchMode::Nested,
            cancellation: CancellationMode::Propagate,
            max_depth: None,
            record_history: true,
        }
    }
}

impl MachineOptions {
    /// Loads options from a JSON document; missing fields keep defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn dispatch(mut self, mode: DispatchMode) -> Self {
        self.dispatch = mode;
        self
    }

    pub fn cancellation(mut self, mode: CancellationMode) -> Self {
        self.cancellation = mode;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn record_history(mut self, record: bool) -> Self {
        self.record_history = record;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_nested_and_propagating() {
        let options = MachineOptions::default();
        assert_eq!(options.dispatch, DispatchMode::Nested);
        assert_eq!(options.cancellation, CancellationMode::Propagate);
        assert_eq!(options.max_depth, None);
        assert!(options.record_history);
    }

    #[test]
    fn partial_json_overrides_single_fields() {
        let options = MachineOptions::from_json(r#"{"dispatch": "queued", "max_depth": 8}"#).unwrap();
        assert_eq!(options.dispatch, DispatchMode::Queued);
        assert_eq!(options.max_depth, Some(8));
        assert!(options.record_history);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(MachineOptions::from_json(r#"{"cancellation": "sometimes"}"#).is_err());
    }

    #[test]
    fn builder_methods_chain() {
        let options = MachineOptions::default()
            .dispatch(DispatchMode::Queued)
            .cancellation(CancellationMode::Detach)
            .max_depth(4)
            .record_history(false);

        assert_eq!(options.cancellation, CancellationMode::Detach);
        assert_eq!(options.max_depth, Some(4));
        assert!(!options.record_history);
    }
}
