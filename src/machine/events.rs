//! Notifications emitted by the driver and the observer list that receives them.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Something observable happened inside the machine.
///
/// Events are delivered synchronously, from within the call that caused them,
/// after the driver's own bookkeeping for that step is complete.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineEvent {
    /// The current state was swapped. Fired before the new state's `enter`.
    StateChanged { from: String, to: String },

    /// A guard rejected the change. Nothing else was touched.
    StateChangeFailed { from: String, to: String },

    /// A state was recorded on the history stack. `stack` is oldest first.
    StackPushed { state: String, stack: Vec<String> },

    /// The stack was full and cleared under the flush policy.
    StackFlushed { stack: Vec<String> },

    /// A state's `enter` hook ran, including the initial state's.
    StateEntered { state: String },
}

impl fmt::Display for MachineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StateChanged { from, to } => write!(f, "state changed {from} -> {to}"),
            Self::StateChangeFailed { from, to } => {
                write!(f, "state change {from} -> {to} rejected")
            }
            Self::StackPushed { state, stack } => {
                write!(f, "pushed {state} (stack: [{}])", stack.join(", "))
            }
            Self::StackFlushed { stack } => write!(f, "flushed [{}]", stack.join(", ")),
            Self::StateEntered { state } => write!(f, "entered {state}"),
        }
    }
}

/// Subscription handle returned by `StateMachine::subscribe`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct ObserverId(Uuid);

impl ObserverId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

type Observer = Box<dyn FnMut(&MachineEvent)>;

/// Observers in subscription order.
#[derive(Default)]
pub(crate) struct Observers {
    entries: Vec<(ObserverId, Observer)>,
}

impl Observers {
    pub(crate) fn subscribe(&mut self, observer: Observer) -> ObserverId {
        let id = ObserverId::new();
        self.entries.push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(existing, _)| *existing != id);
        self.entries.len() != before
    }

    pub(crate) fn emit(&mut self, event: &MachineEvent) {
        for (_, observer) in self.entries.iter_mut() {
            observer(event);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
