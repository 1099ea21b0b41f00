//! Errors reported while compiling a machine definition.

use thiserror::Error;

/// A single problem found in a machine definition.
///
/// The compiler collects every problem before failing, so one
/// [`BuildError::Invalid`] can carry many of these.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("no states declared; the first declared state is the initial state")]
    NoStates,

    #[error("state '{state}' declared more than once")]
    DuplicateState { state: String },

    #[error("event name must not be empty")]
    EmptyEventName,

    #[error("event '{event}' has no target state. Call .to(state)")]
    MissingTarget { event: String },

    #[error("event '{event}' lists unknown source state '{state}'")]
    UnknownSourceState { event: String, state: String },

    #[error("event '{event}' targets unknown state '{state}'")]
    UnknownTargetState { event: String, state: String },

    #[error("duplicate rule for event '{event}' from '{state}'")]
    DuplicateRule { state: String, event: String },
}

/// Errors that can occur when building a transition table.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid machine definition: {}", render(.0))]
    Invalid(Vec<DefinitionError>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BuildError {
    /// The individual definition problems, empty for parse errors.
    pub fn problems(&self) -> &[DefinitionError] {
        match self {
            BuildError::Invalid(problems) => problems,
            BuildError::Json(_) => &[],
        }
    }
}

fn render(problems: &[DefinitionError]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_lists_every_problem() {
        let err = BuildError::Invalid(vec![
            DefinitionError::NoStates,
            DefinitionError::EmptyEventName,
        ]);

        let message = err.to_string();
        assert!(message.contains("no states declared"));
        assert!(message.contains("event name must not be empty"));
        assert_eq!(err.problems().len(), 2);
    }
}
