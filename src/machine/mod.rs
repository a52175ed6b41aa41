//! The driver that owns states and transitions and runs changes.
//!
//! # Key Concepts
//!
//! - **StateMachine**: registry of states, transition table, history stack
//! - **Context**: entity data handed to every hook, plus deferred change requests
//! - **Events**: synchronous notifications about changes and the stack

mod context;
mod driver;
mod error;
mod events;

pub use context::{Context, PendingChange, Target};
pub use driver::{StateMachine, MAX_CHAINED_CHANGES};
pub use error::{ChangeOutcome, FsmError};
pub use events::{MachineEvent, ObserverId};

pub(crate) use driver::{BoxedState, BoxedTransition};
