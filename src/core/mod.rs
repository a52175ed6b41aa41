//! Building blocks of the state machine.
//!
//! This module holds the pieces the driver orchestrates:
//! - States via the `MachineState` trait
//! - Transitions (guard + effect) and their typed registry keys
//! - Closure-built guards
//! - The bounded history stack

mod guard;
mod history;
mod state;
mod transition;

pub use guard::Guard;
pub use history::{PushOutcome, StackEntry, StackPolicy, StateStack};
pub use state::{short_type_name, MachineState, StateId};
pub use transition::{
    NeutralTransition, Parameters, Source, Transition, TransitionKey, TransitionRequest,
};
