//! Audio Player State Machine
//!
//! This demo drives a small player through loading, playing and pausing.
//!
//! Key concepts:
//! - Wildcard rules (`load` and `error` apply from any state)
//! - Reentrant triggers from an entry callback
//! - Rejected transitions leave the state untouched
//!
//! Run with: RUST_LOG=debug cargo run --example audio_player

use fsmgen::definition;
use fsmgen::runtime::Machine;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug, Default)]
struct Player {
    url: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Audio Player State Machine ===\n");

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
    .compile()?;

    println!("Compiled table with {} states and {} events", table.state_count(), table.event_count());
    for edge in table.edges() {
        println!(
            "  {} --{}--> {}{}",
            table.state_name(edge.from).unwrap_or("?"),
            table.event_name(edge.event).unwrap_or("?"),
            table.state_name(edge.to).unwrap_or("?"),
            if edge.wildcard { " (any state)" } else { "" }
        );
    }

    let mut player: Machine<Player, String> = Machine::new(Arc::new(table), Player::default());
    player.on_action("load", |ctx, url| {
        println!("  loading {url}");
        ctx.data_mut().url = Some(url);
        Ok(())
    })?;
    player.on_enter("loading", |ctx, data| {
        if data.url.is_some() {
            ctx.trigger("play", String::new())?;
        }
        Ok(())
    })?;
    player.on_enter("playing", |_, data| {
        println!("  now playing {}", data.url.as_deref().unwrap_or("nothing"));
        Ok(())
    })?;

    println!("\nState: {}", player.state_name());
    player.trigger("load", "song.mp3".to_string())?;
    println!("State: {}", player.state_name());

    player.trigger("pause", String::new())?;
    println!("State: {}", player.state_name());

    match player.trigger("pause", String::new()) {
        Ok(()) => println!("unexpected: second pause accepted"),
        Err(e) => println!("Second pause rejected [{}]: {e}", e.error_code()),
    }

    println!("\nHistory:");
    for record in player.history().transitions() {
        println!(
            "  {:>8} -> {:<8} via {:<6} depth {}",
            player.table().state_name(record.from).unwrap_or("?"),
            player.table().state_name(record.to).unwrap_or("?"),
            player.table().event_name(record.event).unwrap_or("?"),
            record.depth
        );
    }

    Ok(())
}
