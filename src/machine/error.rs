//! Run-time errors and outcomes of change requests.

use thiserror::Error;

/// How a change request that named a valid target ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// The guard accepted and the machine now points at the target.
    Changed,
    /// The target already was the current state. Nothing happened.
    Unchanged,
    /// The guard rejected the change. Only `StateChangeFailed` was emitted.
    Rejected,
}

impl ChangeOutcome {
    pub fn is_changed(self) -> bool {
        matches!(self, Self::Changed)
    }
}

/// Errors reported by a running state machine.
///
/// None of them leave the machine in a partially changed state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FsmError {
    #[error("This state machine does not have an initial state defined")]
    MissingInitialState,

    #[error("State machine is already initialized")]
    AlreadyInitialized,

    #[error("State machine is not initialized yet")]
    NotInitialized,

    #[error("The state '{0}' does not exist in this state machine")]
    UnknownState(String),

    #[error("A transition {from} -> {to} is already registered")]
    DuplicateTransition { from: String, to: String },
}
