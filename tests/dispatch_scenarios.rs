//! End-to-end dispatch scenarios over small but complete machines.

use fsmgen::builder::{CompileMode, DefinitionError, EventDef, MachineDefinition};
use fsmgen::definition;
use fsmgen::runtime::{
    Cancellation, CancellationMode, DispatchMode, Machine, MachineOptions, TriggerError,
};
use serde_json::json;
use std::sync::{Arc, Mutex};

type Log = Arc<Mutex<Vec<String>>>;

fn record(log: &Log, entry: impl Into<String>) {
    log.lock().unwrap().push(entry.into());
}

fn snapshot(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

#[derive(Clone, Debug, Default, PartialEq)]
struct Player {
    url: Option<String>,
    loads: u32,
}

fn audio_player(options: MachineOptions) -> (Machine<Player, String>, Log) {
    let table = definition! {
        audio_player {
            states: [init, loading, playing, paused],
            events: {
                load: * => loading,
                play: [loading, paused] => playing,
                pause: [playing] => paused,
                error: * => init,
            }
        }
    }
    .compile()
    .unwrap();

    let log: Log = Arc::default();
    let mut player = Machine::with_options(Arc::new(table), Player::default(), options);

    let l = Arc::clone(&log);
    player
        .on_action("load", move |ctx, url| {
            record(&l, format!("action:load:{url}"));
            let data = ctx.data_mut();
            data.url = Some(url);
            data.loads += 1;
            Ok(())
        })
        .unwrap();

    let l = Arc::clone(&log);
    player
        .on_enter("loading", move |ctx, data| {
            record(&l, "enter:loading");
            match &data.url {
                Some(_) => Ok(ctx.trigger("play", String::new())?),
                None => Ok(ctx.trigger("error", String::new())?),
            }
        })
        .unwrap();

    let l = Arc::clone(&log);
    player
        .on_enter("playing", move |_, data| {
            record(&l, format!("enter:playing:{}", data.url.as_deref().unwrap_or("")));
            Ok(())
        })
        .unwrap();

    (player, log)
}

#[test]
fn audio_player_loads_then_plays() {
    let (mut player, log) = audio_player(MachineOptions::default());

    player.trigger("load", "song.mp3".to_string()).unwrap();

    assert_eq!(player.state_name(), "playing");
    assert_eq!(player.data().url.as_deref(), Some("song.mp3"));
    assert_eq!(
        snapshot(&log),
        ["action:load:song.mp3", "enter:loading", "enter:playing:song.mp3"]
    );
    let path: Vec<&str> = player
        .history()
        .path()
        .into_iter()
        .filter_map(|s| player.table().state_name(s))
        .collect();
    assert_eq!(path, ["init", "loading", "playing"]);
}

#[test]
fn audio_player_rejects_second_pause() {
    let (mut player, _) = audio_player(MachineOptions::default());
    player.trigger("load", "song.mp3".to_string()).unwrap();

    player.trigger("pause", String::new()).unwrap();
    assert_eq!(player.state_name(), "paused");

    let err = player.trigger("pause", String::new()).unwrap_err();
    assert_eq!(err.error_code(), "INVALID_TRANSITION");
    assert_eq!(
        err.to_string(),
        "invalid transition: no transition target from 'paused' via 'pause'"
    );
    assert_eq!(player.state_name(), "paused");

    player.trigger("play", String::new()).unwrap();
    assert_eq!(player.state_name(), "playing");
}

#[test]
fn audio_player_reload_from_any_state() {
    let (mut player, _) = audio_player(MachineOptions::default());
    player.trigger("load", "a.mp3".to_string()).unwrap();
    player.trigger("pause", String::new()).unwrap();

    player.trigger("load", "b.mp3".to_string()).unwrap();

    assert_eq!(player.state_name(), "playing");
    assert_eq!(player.data().loads, 2);
    assert_eq!(player.into_data().url.as_deref(), Some("b.mp3"));
}

#[test]
fn audio_player_behaves_the_same_when_queued() {
    let (mut player, log) = audio_player(MachineOptions::default().dispatch(DispatchMode::Queued));

    player.trigger("load", "song.mp3".to_string()).unwrap();

    assert_eq!(player.state_name(), "playing");
    assert_eq!(
        snapshot(&log),
        ["action:load:song.mp3", "enter:loading", "enter:playing:song.mp3"]
    );
}

#[test]
fn start_drives_machine_to_final_state() {
    let table = definition! {
        finalstate {
            states: [init, running, final],
            events: {
                run: [init] => running,
                finish: [running] => final,
            }
        }
    }
    .compile()
    .unwrap();
    let log: Log = Arc::default();
    let mut machine: Machine<()> = Machine::new(Arc::new(table), ());

    for (state, next) in [("init", Some("run")), ("running", Some("finish")), ("final", None)] {
        let l = Arc::clone(&log);
        machine
            .on_enter(state, move |ctx, _| {
                record(&l, format!("enter:{state}"));
                match next {
                    Some(event) => Ok(ctx.trigger(event, ())?),
                    None => Ok(()),
                }
            })
            .unwrap();
    }
    for event in ["run", "finish"] {
        let l = Arc::clone(&log);
        machine
            .on_action(event, move |_, ()| {
                record(&l, format!("action:{event}"));
                Ok(())
            })
            .unwrap();
    }

    machine.start().unwrap();

    assert_eq!(machine.state_name(), "final");
    assert!(machine.is_terminal());
    assert_eq!(
        snapshot(&log),
        [
            "enter:init",
            "action:run",
            "enter:running",
            "action:finish",
            "enter:final"
        ]
    );
}

#[test]
fn deadline_in_the_past_rejects_trigger() {
    let (mut player, log) = audio_player(MachineOptions::default());
    let token = Cancellation::none().with_deadline(chrono::Utc::now() - chrono::Duration::seconds(1));

    let err = player
        .trigger_with("load", "song.mp3".to_string(), token)
        .unwrap_err();

    assert!(matches!(err, TriggerError::DeadlineExceeded { .. }));
    assert_eq!(player.state_name(), "init");
    assert!(snapshot(&log).is_empty());
}

#[test]
fn cancelling_inside_action_stops_nested_trigger() {
    let (mut player, _) = audio_player(MachineOptions::default());
    player
        .on_action("load", |ctx, url| {
            ctx.cancellation().cancel();
            ctx.data_mut().url = Some(url);
            Ok(())
        })
        .unwrap();

    let err = player
        .trigger_with("load", "song.mp3".to_string(), Cancellation::new())
        .unwrap_err();

    assert!(matches!(err.root(), TriggerError::Cancelled { event } if event == "play"));
    assert_eq!(player.state_name(), "loading");
}

#[test]
fn detached_mode_lets_nested_trigger_run_after_cancel() {
    let (mut player, _) = audio_player(
        MachineOptions::default().cancellation(CancellationMode::Detach),
    );
    let token = Cancellation::new();
    let outer = token.clone();
    player
        .on_action("load", move |ctx, url| {
            outer.cancel();
            ctx.data_mut().url = Some(url);
            Ok(())
        })
        .unwrap();

    player
        .trigger_with("load", "song.mp3".to_string(), token)
        .unwrap();
    assert_eq!(player.state_name(), "playing");
}

#[test]
fn history_records_nesting_depth() {
    let (mut player, _) = audio_player(MachineOptions::default());
    player.trigger("load", "song.mp3".to_string()).unwrap();
    player.trigger("pause", String::new()).unwrap();

    let records: Vec<(String, usize)> = player
        .history()
        .transitions()
        .iter()
        .map(|t| {
            (
                player.table().event_name(t.event).unwrap().to_string(),
                t.depth,
            )
        })
        .collect();
    assert_eq!(
        records,
        [
            ("load".to_string(), 0),
            ("play".to_string(), 1),
            ("pause".to_string(), 0)
        ]
    );
}

#[test]
fn json_definition_drives_same_machine() {
    let definition = MachineDefinition::from_json(&json!({
        "name": "audio_player",
        "states": ["init", "loading", "playing", "paused"],
        "events": [
            {"name": "load", "payload": "String", "from": "*", "to": "loading"},
            {"name": "play", "from": ["loading", "paused"], "to": "playing"},
            {"name": "pause", "from": "playing", "to": "paused"},
            {"name": "error", "to": "init"}
        ]
    }))
    .unwrap();
    let table = Arc::new(definition.compile().unwrap());
    let mut machine: Machine<(), ()> = Machine::new(Arc::clone(&table), ());

    machine.trigger("load", ()).unwrap();
    machine.trigger("play", ()).unwrap();
    machine.trigger("error", ()).unwrap();

    assert_eq!(machine.state_name(), "init");
    let load = table.event_id("load").unwrap();
    assert_eq!(table.payload_tag(load), Some("String"));
}

#[test]
fn strict_compile_reports_conflicting_rules() {
    let definition = MachineDefinition::new("conflict", ["idle", "busy"])
        .event(EventDef::new("go").from(["idle"]).to("busy"))
        .event(EventDef::new("go").from(["idle"]).to("idle"));

    assert!(definition.compile().is_ok());

    let err = definition.compile_with(CompileMode::Strict).unwrap_err();
    assert_eq!(
        err.problems(),
        [DefinitionError::DuplicateRule {
            state: "idle".into(),
            event: "go".into(),
        }]
    );
}

#[test]
fn invalid_definition_reports_every_problem() {
    let err = MachineDefinition::new("broken", ["a", "a"])
        .event(EventDef::new("go").from(["nowhere"]).to("a"))
        .event(EventDef::new("back").from(["a"]).to("missing"))
        .compile()
        .unwrap_err();

    let problems = err.problems();
    assert_eq!(problems.len(), 3);
    assert!(problems.contains(&DefinitionError::DuplicateState { state: "a".into() }));
}
