//! Builder API for ergonomic state machine construction.
//!
//! States and transitions are registered declaratively and validated
//! together when the machine is built.

pub mod error;
pub mod machine;
pub mod macros;

pub use error::BuildError;
pub use machine::MachineBuilder;
