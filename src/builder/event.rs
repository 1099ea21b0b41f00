//! Event rules: a name, an opaque payload tag, source states and a target.

use crate::core::WILDCARD;
use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Source states a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Sources {
    /// Any state. Stored in the wildcard row.
    #[default]
    Any,
    /// Exactly these states.
    States(Vec<String>),
}

impl Sources {
    pub fn is_any(&self) -> bool {
        matches!(self, Sources::Any)
    }

    /// Named source states; empty for [`Sources::Any`].
    pub fn states(&self) -> &[String] {
        match self {
            Sources::Any => &[],
            Sources::States(states) => states,
        }
    }
}

impl Serialize for Sources {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Sources::Any => serializer.serialize_str(WILDCARD),
            // A lone state named "*" stays a list so it does not read back as Any.
            Sources::States(states) if states.len() == 1 && states[0] != WILDCARD => {
                serializer.serialize_str(&states[0])
            }
            Sources::States(states) => {
                let mut seq = serializer.serialize_seq(Some(states.len()))?;
                for state in states {
                    seq.serialize_element(state)?;
                }
                seq.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Sources {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SourcesVisitor;

        impl<'de> Visitor<'de> for SourcesVisitor {
            type Value = Sources;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("\"*\", a state name or an array of state names")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                if v == WILDCARD {
                    Ok(Sources::Any)
                } else {
                    Ok(Sources::States(vec![v.to_string()]))
                }
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut states = Vec::new();
                while let Some(s) = seq.next_element::<String>()? {
                    states.push(s);
                }
                if states.is_empty() {
                    Ok(Sources::Any)
                } else {
                    Ok(Sources::States(states))
                }
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Sources::Any)
            }
        }

        deserializer.deserialize_any(SourcesVisitor)
    }
}

/// Declaration of one event rule.
///
/// Declaring the same event name twice merges both rules into one event; for
/// any (state, event) pair declared twice the later target wins unless the
/// definition is compiled in strict mode.
///
/// # Example
///
/// ```
/// use fsmgen::builder::EventDef;
///
/// struct Play;
///
/// let play = EventDef::new("play")
///     .payload::<Play>()
///     .from(["loading", "paused"])
///     .to("playing");
///
/// assert_eq!(play.from.states(), ["loading", "paused"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDef {
    pub name: String,

    /// Opaque payload type tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,

    #[serde(default)]
    pub from: Sources,

    #[serde(default)]
    pub to: String,
}

impl EventDef {
    /// Start a rule for `name`; it applies from any state until
    /// [`from`](Self::from) narrows it.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: None,
            from: Sources::Any,
            to: String::new(),
        }
    }

    /// Tag the payload with the Rust type name of `T`.
    pub fn payload<T: ?Sized>(self) -> Self {
        self.payload_tag(std::any::type_name::<T>())
    }

    /// Tag the payload with an arbitrary label.
    pub fn payload_tag(mut self, tag: impl Into<String>) -> Self {
        self.payload = Some(tag.into());
        self
    }

    /// Restrict the rule to these source states.
    ///
    /// An empty list means "any state", as with [`from_any`](Self::from_any).
    pub fn from<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let states: Vec<String> = states.into_iter().map(Into::into).collect();
        self.from = if states.is_empty() {
            Sources::Any
        } else {
            Sources::States(states)
        };
        self
    }

    /// Make every state a valid source.
    pub fn from_any(mut self) -> Self {
        self.from = Sources::Any;
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, state: impl Into<String>) -> Self {
        self.to = state.into();
        self
    }
}
