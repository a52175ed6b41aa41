//! Platformer Player
//!
//! This example drives a player character through idle, run, jump and fall
//! states with frame ticks and input events.
//!
//! Key concepts:
//! - States requesting changes from their own hooks
//! - A guarded transition with a side effect
//! - Wildcard transitions into a common state
//! - Observing state changes and the history stack
//!
//! Run with: RUST_LOG=debug cargo run --example platformer_player

use serde_json::json;
use tracing_subscriber::EnvFilter;
use xtension_fsm::core::MachineState;
use xtension_fsm::machine::Context;
use xtension_fsm::{Guard, MachineEvent, Parameters, StateMachine, Transition, TransitionRequest};

#[derive(Debug, Default)]
struct Player {
    height: f64,
    velocity: f64,
    speed: f64,
    stamina: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Right,
    Release,
    Jump,
}

struct Idle;
struct Run;
struct Jump;
struct Fall;

impl MachineState for Idle {
    type Context = Player;
    type Input = Input;

    fn enter(&mut self, ctx: &mut Context<Player>) {
        ctx.user.speed = 0.0;
    }

    fn handle_input(&mut self, input: &Input, ctx: &mut Context<Player>) {
        match input {
            Input::Right => ctx.change_state_to_type::<Run>(None),
            Input::Jump => {
                let parameters = stamina_left(ctx.user.stamina);
                ctx.change_state_to_type::<Jump>(Some(parameters));
            }
            Input::Release => {}
        }
    }
}

impl MachineState for Run {
    type Context = Player;
    type Input = Input;

    fn enter(&mut self, ctx: &mut Context<Player>) {
        ctx.user.speed = 5.0;
    }

    fn handle_input(&mut self, input: &Input, ctx: &mut Context<Player>) {
        match input {
            Input::Release => ctx.change_state_to_type::<Idle>(None),
            Input::Jump => {
                let parameters = stamina_left(ctx.user.stamina);
                ctx.change_state_to_type::<Jump>(Some(parameters));
            }
            Input::Right => {}
        }
    }
}

impl MachineState for Jump {
    type Context = Player;
    type Input = Input;

    fn enter(&mut self, ctx: &mut Context<Player>) {
        ctx.user.velocity = 8.0;
    }

    fn physics_update(&mut self, delta: f64, ctx: &mut Context<Player>) {
        ctx.user.height += ctx.user.velocity * delta;
        ctx.user.velocity -= 20.0 * delta;
        if ctx.user.velocity <= 0.0 {
            ctx.change_state_to_type::<Fall>(None);
        }
    }
}

impl MachineState for Fall {
    type Context = Player;
    type Input = Input;

    fn physics_update(&mut self, delta: f64, ctx: &mut Context<Player>) {
        ctx.user.velocity -= 20.0 * delta;
        ctx.user.height = (ctx.user.height + ctx.user.velocity * delta).max(0.0);
        if ctx.user.height == 0.0 {
            ctx.user.velocity = 0.0;
            ctx.change_state_to_type::<Idle>(None);
        }
    }

    fn exit(&mut self, next: &str, _ctx: &mut Context<Player>) {
        println!("  landed, heading to {next}");
    }
}

/// Jumping spends one point of the stamina reported by the caller.
struct SpendStamina;

impl Transition<Player> for SpendStamina {
    fn should_transition(&self, request: &TransitionRequest<'_>, _player: &Player) -> bool {
        request
            .parameter("stamina")
            .and_then(|value| value.as_u64())
            .is_some_and(|stamina| stamina > 0)
    }

    fn on_transition(&mut self, _request: &TransitionRequest<'_>, player: &mut Player) {
        player.stamina -= 1;
    }
}

fn stamina_left(value: u32) -> Parameters {
    let mut parameters = Parameters::new();
    parameters.insert("stamina".to_string(), json!(value));
    parameters
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    println!("=== Platformer Player ===\n");

    let mut machine = StateMachine::builder(Player {
        stamina: 1,
        ..Player::default()
    })
    .state(Idle)
    .state(Run)
    .state(Jump)
    .state(Fall)
    .initial_type::<Idle>()
    .any_transition("Jump", SpendStamina)
    .transition(
        "Fall",
        "Idle",
        Guard::new(|_, player: &Player| player.height == 0.0),
    )
    .build()
    .unwrap();

    machine.subscribe(|event: &MachineEvent| match event {
        MachineEvent::StateChanged { .. } | MachineEvent::StateChangeFailed { .. } => {
            println!("  {event}");
        }
        _ => {}
    });

    machine.initialize().unwrap();
    println!("Initial state: {:?}\n", machine.current_state());

    println!("Press right, then jump:");
    machine.unhandled_input(Input::Right);
    machine.unhandled_input(Input::Jump);

    let mut frames = 0;
    while !machine.current_state_is("idle") && frames < 120 {
        machine.physics_process(1.0 / 60.0);
        frames += 1;
    }
    println!("  back on the ground after {frames} physics frames\n");

    println!("Try to jump again without stamina:");
    machine.unhandled_input(Input::Jump);
    println!("  still {:?}\n", machine.current_state());

    println!("Recently left states: {:?}", machine.stack().names());

    println!("\n=== Example Complete ===");
}
