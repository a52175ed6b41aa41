//! The `MachineState` trait implemented by every behavioral mode.
//!
//! States are owned by the driver and only ever called by it. All hooks have
//! no-op defaults so a concrete state overrides just what it needs.

use crate::machine::Context;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a state registered in a [`StateMachine`](crate::StateMachine).
///
/// Ids are assigned in registration order and stay valid for the lifetime of
/// the machine that issued them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateId(pub(crate) usize);

impl StateId {
    /// Position of the state in the registry.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Last path segment of a type's name, without generic arguments.
///
/// ```rust
/// use xtension_fsm::core::short_type_name;
///
/// struct Jump;
/// assert_eq!(short_type_name::<Jump>(), "Jump");
/// assert_eq!(short_type_name::<Vec<String>>(), "Vec");
/// ```
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// A named behavioral mode of an entity.
///
/// The driver calls the hooks in a fixed order: `ready` once when the machine
/// is initialized, `enter` when the state becomes current, `exit` when it
/// stops being current (after the transition effect, before the incoming
/// state's `enter`), and the per-frame hooks only while it is current and the
/// machine is unlocked.
///
/// A state never calls hooks of other states. To move somewhere else it
/// queues a request on the [`Context`], which the driver runs once the
/// current operation has finished.
///
/// # Example
///
/// ```rust
/// use xtension_fsm::core::MachineState;
/// use xtension_fsm::machine::Context;
///
/// #[derive(Default)]
/// struct Player {
///     on_floor: bool,
/// }
///
/// struct Falling;
///
/// impl MachineState for Falling {
///     type Context = Player;
///     type Input = ();
///
///     fn physics_update(&mut self, _delta: f64, ctx: &mut Context<Player>) {
///         if ctx.user.on_floor {
///             ctx.change_state_to("Idle", None);
///         }
///     }
/// }
///
/// assert_eq!(Falling.name(), "Falling");
/// ```
pub trait MachineState {
    /// Entity data shared by all states of one machine.
    type Context;

    /// Input event type forwarded by the host.
    type Input;

    /// Registry key of this state. Defaults to the short type name.
    fn name(&self) -> &str {
        short_type_name::<Self>()
    }

    /// One-time setup, called when the machine is initialized.
    fn ready(&mut self, _ctx: &mut Context<Self::Context>) {}

    /// Called after the outgoing state has exited and the machine points here.
    fn enter(&mut self, _ctx: &mut Context<Self::Context>) {}

    /// Called when this state stops being current. `next` is the incoming state.
    fn exit(&mut self, _next: &str, _ctx: &mut Context<Self::Context>) {}

    /// Render-rate tick.
    fn update(&mut self, _delta: f64, _ctx: &mut Context<Self::Context>) {}

    /// Physics-rate tick.
    fn physics_update(&mut self, _delta: f64, _ctx: &mut Context<Self::Context>) {}

    /// Input the host did not consume elsewhere.
    fn handle_input(&mut self, _event: &Self::Input, _ctx: &mut Context<Self::Context>) {}
}
