//! Macros for compact machine definitions.

/// Build a [`MachineDefinition`](crate::builder::MachineDefinition) from a
/// compact token form.
///
/// `*` marks a rule that applies from any state; a bracketed list names the
/// source states. The first listed state is the initial state.
///
/// # Example
///
/// ```
/// use fsmgen::definition;
///
/// let definition = definition! {
///     audio_player {
///         states: [init, loading, playing, paused],
///         events: {
///             load: * => loading,
///             play: [loading, paused] => playing,
///             pause: [playing] => paused,
///             error: * => init,
///         }
///     }
/// };
///
/// assert_eq!(definition.initial(), Some("init"));
/// assert_eq!(definition.events.len(), 4);
/// ```
#[macro_export]
macro_rules! definition {
    (@events $def:expr; ) => {
        $def
    };

    (@events $def:expr; $event:ident : * => $to:ident $(, $($rest:tt)*)?) => {
        $crate::definition!(
            @events $def.event(
                $crate::builder::EventDef::new(stringify!($event))
                    .from_any()
                    .to(stringify!($to))
            );
            $($($rest)*)?
        )
    };

    (@events $def:expr; $event:ident : [$($from:ident),+ $(,)?] => $to:ident $(, $($rest:tt)*)?) => {
        $crate::definition!(
            @events $def.event(
                $crate::builder::EventDef::new(stringify!($event))
                    .from([$(stringify!($from)),+])
                    .to(stringify!($to))
            );
            $($($rest)*)?
        )
    };

    (
        $name:ident {
            states: [$($state:ident),+ $(,)?]
            $(, events: { $($events:tt)* })?
            $(,)?
        }
    ) => {
        $crate::definition!(
            @events $crate::builder::MachineDefinition::new(
                stringify!($name),
                [$(stringify!($state)),+],
            );
            $($($events)*)?
        )
    };
}

#[cfg(test)]
mod tests {
    use crate::builder::{EventDef, MachineDefinition};

    #[test]
    fn definition_macro_matches_builder() {
        let from_macro = definition! {
            init_final {
                states: [init, running, final],
                events: {
                    run: [init] => running,
                    finish: [running] => final,
                }
            }
        };

        let from_builder = MachineDefinition::new("init_final", ["init", "running", "final"])
            .event(EventDef::new("run").from(["init"]).to("running"))
            .event(EventDef::new("finish").from(["running"]).to("final"));

        assert_eq!(from_macro, from_builder);
    }

    #[test]
    fn definition_macro_supports_wildcards() {
        let definition = definition! {
            player {
                states: [idle, busy],
                events: { reset: * => idle, work: [idle] => busy }
            }
        };

        assert!(definition.events[0].from.is_any());
        assert_eq!(definition.events[1].from.states(), ["idle"]);
    }

    #[test]
    fn definition_macro_works_without_events() {
        let definition = definition! {
            lonely {
                states: [only]
            }
        };

        assert!(definition.events.is_empty());
        assert!(definition.compile().is_ok());
    }
}
