//! XTension FSM: a finite state machine component for game entities
//!
//! A [`StateMachine`] owns a set of named states, the transitions between
//! them and a bounded history of the states it left. The host drives it with
//! frame ticks and input events; game logic asks it to change state by name,
//! by handle or by type.
//!
//! # Core Concepts
//!
//! - **State**: A behavioral mode implementing [`MachineState`], with no-op hooks by default
//! - **Transition**: A guard plus an effect attached to an edge, see [`Transition`] and [`Guard`]
//! - **Wildcard**: A transition registered for "any state" into a target
//! - **History**: A bounded [`StateStack`] that evicts or flushes when full
//! - **Events**: [`MachineEvent`]s delivered synchronously to subscribers
//!
//! # Example
//!
//! ```rust
//! use xtension_fsm::core::MachineState;
//! use xtension_fsm::machine::Context;
//! use xtension_fsm::{Guard, MachineEvent, StateMachine};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! #[derive(Default)]
//! struct Player {
//!     stamina: u32,
//! }
//!
//! struct Idle;
//! struct Run;
//!
//! impl MachineState for Idle {
//!     type Context = Player;
//!     type Input = char;
//!
//!     fn handle_input(&mut self, key: &char, ctx: &mut Context<Player>) {
//!         if *key == 'd' {
//!             ctx.change_state_to("Run", None);
//!         }
//!     }
//! }
//!
//! impl MachineState for Run {
//!     type Context = Player;
//!     type Input = char;
//!
//!     fn update(&mut self, _delta: f64, ctx: &mut Context<Player>) {
//!         ctx.user.stamina = ctx.user.stamina.saturating_sub(1);
//!     }
//! }
//!
//! let mut machine = StateMachine::builder(Player { stamina: 10 })
//!     .state(Idle)
//!     .state(Run)
//!     .initial("Idle")
//!     .transition("Idle", "Run", Guard::new(|_, player: &Player| player.stamina > 0))
//!     .build()
//!     .unwrap();
//!
//! let changes = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&changes);
//! machine.subscribe(move |event: &MachineEvent| {
//!     if let MachineEvent::StateChanged { from, to } = event {
//!         sink.borrow_mut().push(format!("{from} -> {to}"));
//!     }
//! });
//!
//! machine.initialize().unwrap();
//! machine.unhandled_input('d');
//! machine.process(0.016);
//!
//! assert_eq!(machine.current_state(), Some("Run"));
//! assert_eq!(machine.user().stamina, 9);
//! assert_eq!(*changes.borrow(), vec!["Idle -> Run".to_string()]);
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod machine;

// Re-export commonly used types
pub use builder::{BuildError, MachineBuilder};
pub use config::{ConfigError, MachineConfig, StackConfig};
pub use crate::core::{
    Guard, MachineState, NeutralTransition, Parameters, StackEntry, StackPolicy, StateId,
    StateStack, Transition, TransitionKey, TransitionRequest,
};
pub use machine::{ChangeOutcome, Context, FsmError, MachineEvent, ObserverId, StateMachine};
