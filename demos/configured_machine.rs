//! Configured Machine
//!
//! This example builds a machine whose initial state and history settings
//! come from a JSON document instead of code.
//!
//! Key concepts:
//! - Loading a `MachineConfig`
//! - Declaring simple states with `machine_state!`
//! - Flush versus evict history policies
//! - Reconfiguring the stack at run time
//!
//! Run with: RUST_LOG=trace cargo run --example configured_machine

use tracing_subscriber::EnvFilter;
use xtension_fsm::{machine_state, MachineConfig, MachineEvent, StackConfig, StateMachine};

machine_state! {
    context = ();
    /// Not serving anyone.
    struct Closed;
    struct Open;
    struct Busy;
    struct Cleaning;
}

const CONFIG: &str = r#"{
    "initial_state": "Closed",
    "stack": { "enabled": true, "capacity": 2, "flush_when_full": true }
}"#;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    println!("=== Configured Machine ===\n");

    let config = MachineConfig::from_json(CONFIG).unwrap();
    println!("Loaded configuration:\n{}\n", config.to_json().unwrap());

    let mut machine = StateMachine::builder(())
        .state(Closed)
        .state(Open)
        .state(Busy)
        .state(Cleaning)
        .config(config)
        .build()
        .unwrap();

    machine.subscribe(|event: &MachineEvent| {
        if let MachineEvent::StackFlushed { .. } | MachineEvent::StackPushed { .. } = event {
            println!("  {event}");
        }
    });

    machine.initialize().unwrap();

    println!("Flushing when full (capacity 2):");
    for name in ["Open", "Busy", "Open", "Cleaning", "Closed"] {
        machine.change_state_to(name, None).unwrap();
    }

    machine.configure_stack(&StackConfig {
        capacity: 3,
        ..StackConfig::default()
    });

    println!("\nEvicting the oldest entry (capacity 3):");
    for name in ["Open", "Busy", "Open", "Cleaning", "Closed"] {
        machine.change_state_to(name, None).unwrap();
    }

    println!("\nUnknown states are reported, not entered:");
    if let Err(err) = machine.change_state_to("Vacation", None) {
        println!("  {err}");
    }
    println!("  still {:?}", machine.current_state());

    println!("\n=== Example Complete ===");
}
