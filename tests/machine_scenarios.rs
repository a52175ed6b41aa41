//! End-to-end scenarios for a platformer character.

use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use xtension_fsm::core::MachineState;
use xtension_fsm::machine::Context;
use xtension_fsm::{
    ChangeOutcome, Guard, MachineEvent, Parameters, StackConfig, StateMachine, Transition,
    TransitionRequest,
};

#[derive(Debug, Default)]
struct Player {
    log: Vec<String>,
    stamina: i64,
    on_floor: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    Move,
    Jump,
}

struct Idle;
struct Run;
struct Jump;

impl MachineState for Idle {
    type Context = Player;
    type Input = Key;

    fn enter(&mut self, ctx: &mut Context<Player>) {
        ctx.user.log.push("Idle: enter".to_string());
    }

    fn exit(&mut self, next: &str, ctx: &mut Context<Player>) {
        ctx.user.log.push(format!("Idle: exit -> {next}"));
    }

    fn handle_input(&mut self, key: &Key, ctx: &mut Context<Player>) {
        if *key == Key::Move {
            ctx.change_state_to("Run", None);
        }
    }
}

impl MachineState for Run {
    type Context = Player;
    type Input = Key;

    fn enter(&mut self, ctx: &mut Context<Player>) {
        ctx.user.log.push("Run: enter".to_string());
    }

    fn exit(&mut self, next: &str, ctx: &mut Context<Player>) {
        ctx.user.log.push(format!("Run: exit -> {next}"));
    }

    fn handle_input(&mut self, key: &Key, ctx: &mut Context<Player>) {
        if *key == Key::Jump {
            let stamina = ctx.user.stamina;
            ctx.change_state_to_type::<Jump>(Some(params(stamina)));
        }
    }
}

impl MachineState for Jump {
    type Context = Player;
    type Input = Key;

    fn enter(&mut self, ctx: &mut Context<Player>) {
        ctx.user.on_floor = false;
        ctx.user.log.push("Jump: enter".to_string());
    }

    fn exit(&mut self, next: &str, ctx: &mut Context<Player>) {
        ctx.user.log.push(format!("Jump: exit -> {next}"));
    }

    fn physics_update(&mut self, _delta: f64, ctx: &mut Context<Player>) {
        if ctx.user.on_floor {
            ctx.change_state_to("Idle", None);
        }
    }
}

/// Jumping costs stamina and needs some left, as reported by the caller.
struct RunToJump;

impl Transition<Player> for RunToJump {
    fn should_transition(&self, request: &TransitionRequest<'_>, _player: &Player) -> bool {
        request
            .parameter("stamina")
            .and_then(|value| value.as_i64())
            .is_some_and(|stamina| stamina > 0)
    }

    fn on_transition(&mut self, _request: &TransitionRequest<'_>, player: &mut Player) {
        player.stamina -= 1;
    }
}

fn params(stamina: i64) -> Parameters {
    let mut parameters = Parameters::new();
    parameters.insert("stamina".to_string(), json!(stamina));
    parameters
}

fn player(stamina: i64, stack: StackConfig) -> StateMachine<Player, Key> {
    let mut machine = StateMachine::builder(Player {
        stamina,
        on_floor: true,
        ..Player::default()
    })
    .state(Idle)
    .state(Run)
    .state(Jump)
    .initial("Idle")
    .transition("Run", "Jump", RunToJump)
    .stack(stack)
    .build()
    .unwrap();
    machine.initialize().unwrap();
    machine
}

fn record(machine: &mut StateMachine<Player, Key>) -> Rc<RefCell<Vec<MachineEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    machine.subscribe(move |event: &MachineEvent| sink.borrow_mut().push(event.clone()));
    events
}

fn changed(from: &str, to: &str) -> MachineEvent {
    MachineEvent::StateChanged {
        from: from.to_string(),
        to: to.to_string(),
    }
}

#[test]
fn idle_run_jump_and_land() {
    let mut machine = player(2, StackConfig::default());
    let events = record(&mut machine);

    machine.unhandled_input(Key::Move);
    machine.unhandled_input(Key::Jump);
    assert_eq!(machine.current_state(), Some("Jump"));
    assert_eq!(machine.user().stamina, 1);

    machine.physics_process(0.016);
    assert_eq!(machine.current_state(), Some("Jump"));

    machine.user_mut().on_floor = true;
    machine.physics_process(0.016);
    assert_eq!(machine.current_state(), Some("Idle"));

    assert_eq!(machine.stack().names(), vec!["Idle", "Run", "Jump"]);
    let changes: Vec<MachineEvent> = events
        .borrow()
        .iter()
        .filter(|e| matches!(e, MachineEvent::StateChanged { .. }))
        .cloned()
        .collect();
    assert_eq!(
        changes,
        vec![
            changed("Idle", "Run"),
            changed("Run", "Jump"),
            changed("Jump", "Idle")
        ]
    );
}

#[test]
fn exit_runs_before_enter() {
    let mut machine = player(1, StackConfig::default());
    machine.user_mut().log.clear();

    machine.change_state_to("Run", None).unwrap();

    assert_eq!(machine.user().log, vec!["Idle: exit -> Run", "Run: enter"]);
}

#[test]
fn guard_rejects_jump_without_stamina() {
    let mut machine = player(0, StackConfig::default());
    machine.change_state_to("Run", None).unwrap();
    let events = record(&mut machine);
    machine.user_mut().log.clear();

    let outcome = machine.change_state_to("Jump", Some(params(0))).unwrap();

    assert_eq!(outcome, ChangeOutcome::Rejected);
    assert_eq!(machine.current_state(), Some("Run"));
    assert_eq!(machine.stack().names(), vec!["Idle"]);
    assert!(machine.user().log.is_empty());
    assert!(!machine.is_transitioning());
    assert_eq!(
        *events.borrow(),
        vec![MachineEvent::StateChangeFailed {
            from: "Run".to_string(),
            to: "Jump".to_string(),
        }]
    );
}

#[test]
fn jump_without_parameters_is_rejected() {
    let mut machine = player(5, StackConfig::default());
    machine.change_state_to("Run", None).unwrap();

    let outcome = machine.change_state_to("Jump", None).unwrap();

    assert_eq!(outcome, ChangeOutcome::Rejected);
    assert_eq!(machine.user().stamina, 5);
}

#[test]
fn evicting_stack_keeps_newest_entries() {
    let mut machine = player(
        3,
        StackConfig {
            enabled: true,
            capacity: 2,
            flush_when_full: false,
        },
    );

    machine.change_state_to("Run", None).unwrap();
    machine.change_state_to("Jump", Some(params(3))).unwrap();
    machine.change_state_to("Idle", None).unwrap();

    assert_eq!(machine.stack().names(), vec!["Run", "Jump"]);
    assert_eq!(machine.last_state().map(|e| e.name.as_str()), Some("Jump"));
}

#[test]
fn flushing_stack_starts_over_when_full() {
    let mut machine = player(
        3,
        StackConfig {
            enabled: true,
            capacity: 2,
            flush_when_full: true,
        },
    );
    let events = record(&mut machine);

    machine.change_state_to("Run", None).unwrap();
    machine.change_state_to("Jump", Some(params(3))).unwrap();
    machine.change_state_to("Idle", None).unwrap();

    assert_eq!(machine.stack().names(), vec!["Jump"]);
    let flushes: Vec<MachineEvent> = events
        .borrow()
        .iter()
        .filter(|e| matches!(e, MachineEvent::StackFlushed { .. }))
        .cloned()
        .collect();
    assert_eq!(
        flushes,
        vec![MachineEvent::StackFlushed {
            stack: vec!["Idle".to_string(), "Run".to_string()],
        }]
    );
}

#[test]
fn disabled_stack_records_nothing() {
    let mut machine = player(
        3,
        StackConfig {
            enabled: false,
            ..StackConfig::default()
        },
    );
    let events = record(&mut machine);

    machine.change_state_to("Run", None).unwrap();

    assert!(machine.stack().is_empty());
    assert!(!events
        .borrow()
        .iter()
        .any(|e| matches!(e, MachineEvent::StackPushed { .. })));
}

#[test]
fn specific_edge_beats_wildcard() {
    let mut machine = player(3, StackConfig::default());
    machine
        .register_any_transition("Idle", Guard::new(|_, _: &Player| false))
        .unwrap();
    machine
        .register_transition(
            "Run",
            "Idle",
            Guard::always().then(|_, p: &mut Player| p.log.push("Run -> Idle effect".to_string())),
        )
        .unwrap();

    machine.change_state_to("Run", None).unwrap();
    machine.user_mut().log.clear();

    assert_eq!(
        machine.change_state_to("Idle", None),
        Ok(ChangeOutcome::Changed)
    );
    assert_eq!(
        machine.user().log,
        vec!["Run -> Idle effect", "Run: exit -> Idle", "Idle: enter"]
    );
}

#[test]
fn wildcard_applies_without_specific_edge() {
    let mut machine = player(3, StackConfig::default());
    machine
        .register_any_transition("Idle", Guard::new(|_, _: &Player| false))
        .unwrap();
    machine.change_state_to("Run", None).unwrap();
    machine.change_state_to("Jump", Some(params(3))).unwrap();

    assert_eq!(
        machine.change_state_to("Idle", None),
        Ok(ChangeOutcome::Rejected)
    );
    assert_eq!(machine.current_state(), Some("Jump"));
}

#[test]
fn locked_machine_ignores_frames_and_input() {
    let mut machine = player(3, StackConfig::default());
    machine.lock();

    machine.unhandled_input(Key::Move);
    assert_eq!(machine.current_state(), Some("Idle"));

    machine.unlock();
    machine.unhandled_input(Key::Move);
    assert_eq!(machine.current_state(), Some("Run"));
}
