//! Build errors for state machines.

use crate::machine::FsmError;
use thiserror::Error;

/// Errors that can occur when building a state machine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("No states registered. Call .state(state) before .build()")]
    NoStates,

    #[error("State '{0}' is registered more than once")]
    DuplicateState(String),

    #[error("State type '{0}' is registered more than once")]
    DuplicateStateType(String),

    #[error("Initial state '{0}' is not registered")]
    UnknownInitialState(String),

    #[error("Transition {from} -> {to} refers to unregistered state '{missing}'")]
    UnknownTransitionState {
        from: String,
        to: String,
        missing: String,
    },

    #[error("Transition {from} -> {to} is registered more than once")]
    DuplicateTransition { from: String, to: String },

    #[error("{} problems found: {}", .0.len(), join(.0))]
    Invalid(Vec<BuildError>),

    #[error(transparent)]
    Machine(#[from] FsmError),
}

fn join(errors: &[BuildError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
