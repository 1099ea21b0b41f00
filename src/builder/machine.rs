//! Machine definitions and the transition table compiler.

use crate::builder::error::{BuildError, DefinitionError};
use crate::builder::event::{EventDef, Sources};
use crate::core::{EventId, EventInfo, Row, StateId, TransitionTable, WILDCARD};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Checked<T> = Validation<T, NonEmptyVec<DefinitionError>>;

/// How the compiler treats a (state, event) pair declared more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompileMode {
    /// Later declarations silently overwrite earlier ones.
    #[default]
    Permissive,
    /// Every repeated pair is reported as [`DefinitionError::DuplicateRule`].
    Strict,
}

/// Declarative description of a state machine.
///
/// The first declared state is the initial state.
///
/// # Example
///
/// ```
/// use fsmgen::builder::{EventDef, MachineDefinition};
///
/// let table = MachineDefinition::new("audio_player", ["init", "loading", "playing", "paused"])
///     .event(EventDef::new("load").from_any().to("loading"))
///     .event(EventDef::new("play").from(["loading", "paused"]).to("playing"))
///     .event(EventDef::new("pause").from(["playing"]).to("paused"))
///     .event(EventDef::new("error").from_any().to("init"))
///     .compile()
///     .unwrap();
///
/// let playing = table.state_id("playing").unwrap();
/// let pause = table.event_id("pause").unwrap();
/// assert_eq!(table.resolve(playing, pause), table.state_id("paused"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineDefinition {
    pub name: String,
    pub states: Vec<String>,
    #[serde(default)]
    pub events: Vec<EventDef>,
}

/// A rule with every name resolved to an id.
struct ResolvedRule {
    event: EventId,
    rows: Vec<Row>,
    target: StateId,
}

impl MachineDefinition {
    /// Declare a machine with its ordered states.
    pub fn new<I, S>(name: impl Into<String>, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            states: states.into_iter().map(Into::into).collect(),
            events: Vec::new(),
        }
    }

    /// Add an event rule, builder style.
    pub fn event(mut self, event: EventDef) -> Self {
        self.events.push(event);
        self
    }

    /// Add an event rule in place.
    pub fn add_event(&mut self, event: EventDef) -> &mut Self {
        self.events.push(event);
        self
    }

    /// The initial state, if any state is declared.
    pub fn initial(&self) -> Option<&str> {
        self.states.first().map(String::as_str)
    }

    /// Parses a definition from a JSON value.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, BuildError> {
        Ok(serde_json::from_value(json.clone())?)
    }

    /// Parses a definition from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, BuildError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Returns the definition as JSON.
    pub fn to_json(&self) -> Result<serde_json::Value, BuildError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Compile with last-write-wins semantics for duplicate rules.
    pub fn compile(&self) -> Result<TransitionTable, BuildError> {
        self.compile_with(CompileMode::Permissive)
    }

    /// Compile the definition into an immutable transition table.
    ///
    /// Every problem in the definition is reported at once.
    pub fn compile_with(&self, mode: CompileMode) -> Result<TransitionTable, BuildError> {
        let state_index: HashMap<&str, StateId> = self
            .states
            .iter()
            .enumerate()
            .rev()
            .map(|(i, s)| (s.as_str(), StateId::new(i)))
            .collect();
        let (events, event_index) = self.distinct_events();

        let header = self.check_states();
        let rules = Validation::all_vec(
            self.events
                .iter()
                .map(|event| self.resolve_rule(event, &state_index, &event_index))
                .collect(),
        );

        let rules = match (header, rules) {
            (Validation::Success(()), Validation::Success(rules)) => rules,
            (header, rules) => {
                let mut problems = failures(header);
                problems.extend(failures(rules));
                return Err(BuildError::Invalid(problems));
            }
        };

        let mut table = TransitionTable::with_layout(&self.name, &self.states, events);
        let mut duplicates = Vec::new();
        for rule in &rules {
            for &row in &rule.rows {
                if table.insert(row, rule.event, rule.target).is_some() {
                    duplicates.push(DefinitionError::DuplicateRule {
                        state: row_label(&table, row).to_string(),
                        event: table.event_label(rule.event).to_string(),
                    });
                }
            }
        }

        if mode == CompileMode::Strict && !duplicates.is_empty() {
            return Err(BuildError::Invalid(duplicates));
        }
        if !duplicates.is_empty() {
            tracing::debug!(
                machine = %self.name,
                overwritten = duplicates.len(),
                "duplicate rules resolved by last declaration"
            );
        }

        tracing::debug!(
            machine = %self.name,
            states = table.state_count(),
            events = table.event_count(),
            "compiled transition table"
        );
        Ok(table)
    }

    /// Distinct event names in first-declaration order.
    fn distinct_events(&self) -> (Vec<EventInfo>, HashMap<&str, EventId>) {
        let mut events: Vec<EventInfo> = Vec::new();
        let mut index = HashMap::new();
        for event in &self.events {
            if event.name.is_empty() || index.contains_key(event.name.as_str()) {
                continue;
            }
            index.insert(event.name.as_str(), EventId::new(events.len()));
            events.push(EventInfo {
                name: event.name.clone(),
                payload: event.payload.clone(),
            });
        }
        (events, index)
    }

    fn check_states(&self) -> Checked<()> {
        let mut checks: Vec<Checked<()>> = Vec::new();

        if self.states.is_empty() {
            checks.push(Validation::fail(DefinitionError::NoStates));
        }

        // Report each repeated name once, at its second occurrence.
        for (i, state) in self.states.iter().enumerate() {
            if self.states[..i].iter().filter(|s| *s == state).count() == 1 {
                checks.push(Validation::fail(DefinitionError::DuplicateState {
                    state: state.clone(),
                }));
            }
        }

        Validation::all_vec(checks).map(|_| ())
    }

    fn resolve_rule(
        &self,
        event: &EventDef,
        states: &HashMap<&str, StateId>,
        events: &HashMap<&str, EventId>,
    ) -> Checked<ResolvedRule> {
        let Some(&event_id) = events.get(event.name.as_str()) else {
            return Validation::fail(DefinitionError::EmptyEventName);
        };

        let target: Checked<StateId> = if event.to.is_empty() {
            Validation::fail(DefinitionError::MissingTarget {
                event: event.name.clone(),
            })
        } else {
            match states.get(event.to.as_str()) {
                Some(&id) => Validation::success(id),
                None => Validation::fail(DefinitionError::UnknownTargetState {
                    event: event.name.clone(),
                    state: event.to.clone(),
                }),
            }
        };

        let mut checks = vec![target];
        checks.extend(event.from.states().iter().map(|state| {
            match states.get(state.as_str()) {
                Some(&id) => Validation::success(id),
                None => Validation::fail(DefinitionError::UnknownSourceState {
                    event: event.name.clone(),
                    state: state.clone(),
                }),
            }
        }));

        let wildcard = matches!(event.from, Sources::Any);
        Validation::all_vec(checks).map(move |ids| {
            let (target, sources) = (ids[0], &ids[1..]);
            let mut rows = Vec::with_capacity(sources.len().max(1));
            if wildcard {
                rows.push(Row::Wildcard);
            }
            for &source in sources {
                let row = Row::State(source);
                if !rows.contains(&row) {
                    rows.push(row);
                }
            }
            ResolvedRule {
                event: event_id,
                rows,
                target,
            }
        })
    }
}

fn failures<T>(checked: Checked<T>) -> Vec<DefinitionError> {
    match checked {
        Validation::Success(_) => Vec::new(),
        Validation::Failure(errors) => errors.iter().cloned().collect(),
    }
}

fn row_label(table: &TransitionTable, row: Row) -> &str {
    match row {
        Row::State(state) => table.state_label(state),
        Row::Wildcard => WILDCARD,
    }
}
