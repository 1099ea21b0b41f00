//! Errors returned by `trigger` and hook registration.

use thiserror::Error;

/// Error type callbacks may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type of action and entry callbacks.
pub type HookResult = Result<(), BoxError>;

/// Errors that can occur while triggering an event.
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("unknown event: {event}")]
    UnknownEvent { event: String },

    #[error("unknown state: {state}")]
    UnknownState { state: String },

    #[error("invalid transition: no transition target from '{state}' via '{event}'")]
    InvalidTransition { state: String, event: String },

    #[error("action for event '{event}' failed: {source}")]
    Action {
        event: String,
        #[source]
        source: BoxError,
    },

    #[error("entry into state '{state}' failed: {source}")]
    Entry {
        state: String,
        #[source]
        source: BoxError,
    },

    #[error("trigger of '{event}' cancelled")]
    Cancelled { event: String },

    #[error("deadline exceeded before triggering '{event}'")]
    DeadlineExceeded { event: String },

    #[error("reentrant trigger of '{event}' exceeds maximum depth {depth}")]
    DepthExceeded { event: String, depth: usize },
}

impl TriggerError {
    /// Returns whether a callback reported this failure.
    pub fn is_callback_error(&self) -> bool {
        matches!(self, TriggerError::Action { .. } | TriggerError::Entry { .. })
    }

    /// Follows callback failures that wrap a nested trigger's error down to
    /// the innermost `TriggerError`.
    pub fn root(&self) -> &TriggerError {
        match self {
            TriggerError::Action { source, .. } | TriggerError::Entry { source, .. } => source
                .downcast_ref::<TriggerError>()
                .map_or(self, TriggerError::root),
            _ => self,
        }
    }

    /// Returns a stable error code for logs and generated glue.
    pub fn error_code(&self) -> &'static str {
        match self {
            TriggerError::UnknownEvent { .. } => "UNKNOWN_EVENT",
            TriggerError::UnknownState { .. } => "UNKNOWN_STATE",
            TriggerError::InvalidTransition { .. } => "INVALID_TRANSITION",
            TriggerError::Action { .. } => "ACTION_FAILED",
            TriggerError::Entry { .. } => "ENTRY_FAILED",
            TriggerError::Cancelled { .. } => "CANCELLED",
            TriggerError::DeadlineExceeded { .. } => "DEADLINE_EXCEEDED",
            TriggerError::DepthExceeded { .. } => "DEPTH_EXCEEDED",
        }
    }
}
