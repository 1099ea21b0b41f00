//! JSON Machine Definition
//!
//! This demo loads a machine definition and runtime options from JSON,
//! reports validation problems, and runs the compiled machine in queued
//! dispatch mode.
//!
//! Run with: cargo run --example json_definition

use fsmgen::builder::{CompileMode, MachineDefinition};
use fsmgen::runtime::{Machine, MachineOptions};
use serde_json::json;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== JSON Machine Definition ===\n");

    // A definition with mistakes: every problem is reported at once.
    let broken = MachineDefinition::from_json(&json!({
        "name": "order",
        "states": ["created", "paid", "paid"],
        "events": [
            {"name": "pay", "from": "created", "to": "paid"},
            {"name": "ship", "from": "packed", "to": "shipped"}
        ]
    }))?;
    if let Err(e) = broken.compile() {
        println!("Rejected definition:");
        for problem in e.problems() {
            println!("  - {problem}");
        }
    }

    let definition = MachineDefinition::from_json(&json!({
        "name": "order",
        "states": ["created", "paid", "shipped", "cancelled"],
        "events": [
            {"name": "pay", "payload": "u64", "from": "created", "to": "paid"},
            {"name": "ship", "from": "paid", "to": "shipped"},
            {"name": "cancel", "from": ["created", "paid"], "to": "cancelled"}
        ]
    }))?;
    let table = Arc::new(definition.compile_with(CompileMode::Strict)?);
    println!("\nTerminal states:");
    for state in table.terminal_states() {
        println!("  {}", table.state_name(state).unwrap_or("?"));
    }

    let options = MachineOptions::from_json(r#"{"dispatch": "queued", "max_depth": 8}"#)?;
    let mut order: Machine<u64, u64> = Machine::with_options(Arc::clone(&table), 0, options);
    order.on_action("pay", |ctx, amount| {
        *ctx.data_mut() += amount;
        Ok(())
    })?;
    order.on_enter("paid", |ctx, paid| {
        println!("  received {paid}, shipping");
        ctx.trigger("ship", 0)?;
        Ok(())
    })?;

    order.trigger("pay", 42)?;
    println!("\nFinal state: {} (total paid {})", order.state_name(), order.data());
    println!("Definition round trip:\n{}", serde_json::to_string_pretty(&definition.to_json()?)?);

    Ok(())
}
