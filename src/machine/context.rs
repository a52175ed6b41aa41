//! Entity data plus the queue states use to ask for a change.

use crate::core::{short_type_name, MachineState, Parameters, StateId};
use std::any::TypeId;
use std::collections::VecDeque;

/// How a deferred request names its target.
#[derive(Clone, Debug, PartialEq)]
pub enum Target {
    Name(String),
    Id(StateId),
    Type { id: TypeId, name: &'static str },
}

impl Target {
    pub fn of<T: 'static>() -> Self {
        Target::Type {
            id: TypeId::of::<T>(),
            name: short_type_name::<T>(),
        }
    }
}

/// A change request queued while the machine was busy running hooks.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingChange {
    pub target: Target,
    pub parameters: Option<Parameters>,
}

/// What every hook receives: the entity data and a way to request changes.
///
/// Hooks cannot call back into the driver while it is running them, so
/// requests made here are queued and executed in order once the current
/// operation (initialization, change, frame or input dispatch) has finished.
pub struct Context<C> {
    /// Data shared by all states of the machine.
    pub user: C,
    pending: VecDeque<PendingChange>,
}

impl<C> Context<C> {
    pub fn new(user: C) -> Self {
        Self {
            user,
            pending: VecDeque::new(),
        }
    }

    /// Ask for a change to the state registered under `name`.
    pub fn change_state_to(&mut self, name: &str, parameters: Option<Parameters>) {
        self.push(Target::Name(name.to_string()), parameters);
    }

    /// Ask for a change to a state by its registry handle.
    pub fn change_state_to_id(&mut self, id: StateId, parameters: Option<Parameters>) {
        self.push(Target::Id(id), parameters);
    }

    /// Ask for a change to the state registered with type `T`.
    pub fn change_state_to_type<T>(&mut self, parameters: Option<Parameters>)
    where
        T: MachineState + 'static,
    {
        self.push(Target::of::<T>(), parameters);
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drop every queued request.
    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    pub(crate) fn take_pending(&mut self) -> Option<PendingChange> {
        self.pending.pop_front()
    }

    fn push(&mut self, target: Target, parameters: Option<Parameters>) {
        self.pending.push_back(PendingChange { target, parameters });
    }
}

impl<C: Default> Default for Context<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}
