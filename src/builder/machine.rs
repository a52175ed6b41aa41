//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::config::{MachineConfig, StackConfig};
use crate::core::{short_type_name, MachineState, Source, Transition, TransitionKey};
use crate::machine::{BoxedState, BoxedTransition, StateMachine};
use std::any::TypeId;
use std::collections::HashSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

enum InitialRef {
    Name(String),
    Type { id: TypeId, name: &'static str },
}

struct PendingTransition<C> {
    /// `None` for a wildcard edge.
    from: Option<String>,
    to: String,
    transition: BoxedTransition<C>,
}

/// Builder for constructing state machines with a fluent API.
///
/// States are registered explicitly; the first registered state is not
/// implicitly the initial one.
pub struct MachineBuilder<C, I = ()> {
    user: C,
    states: Vec<(BoxedState<C, I>, TypeId, &'static str)>,
    transitions: Vec<PendingTransition<C>>,
    initial: Option<InitialRef>,
    stack: StackConfig,
}

impl<C: 'static, I: 'static> StateMachine<C, I> {
    /// Start building a machine around the given entity data.
    pub fn builder(user: C) -> MachineBuilder<C, I> {
        MachineBuilder::new(user)
    }
}

impl<C: 'static, I: 'static> MachineBuilder<C, I> {
    /// Create a new builder.
    pub fn new(user: C) -> Self {
        Self {
            user,
            states: Vec::new(),
            transitions: Vec::new(),
            initial: None,
            stack: StackConfig::default(),
        }
    }

    /// Register a state.
    pub fn state<S>(mut self, state: S) -> Self
    where
        S: MachineState<Context = C, Input = I> + 'static,
    {
        let boxed: BoxedState<C, I> = Box::new(state);
        self.states
            .push((boxed, TypeId::of::<S>(), short_type_name::<S>()));
        self
    }

    /// Set the initial state by name.
    pub fn initial(mut self, name: &str) -> Self {
        self.initial = Some(InitialRef::Name(name.trim().to_string()));
        self
    }

    /// Set the initial state by type.
    pub fn initial_type<S: MachineState + 'static>(mut self) -> Self {
        self.initial = Some(InitialRef::Type {
            id: TypeId::of::<S>(),
            name: short_type_name::<S>(),
        });
        self
    }

    /// Register a transition for the `from -> to` edge.
    pub fn transition<T>(mut self, from: &str, to: &str, transition: T) -> Self
    where
        T: Transition<C> + 'static,
    {
        self.transitions.push(PendingTransition {
            from: Some(from.trim().to_string()),
            to: to.trim().to_string(),
            transition: Box::new(transition),
        });
        self
    }

    /// Register a transition for every edge into `to` without a specific one.
    pub fn any_transition<T>(mut self, to: &str, transition: T) -> Self
    where
        T: Transition<C> + 'static,
    {
        self.transitions.push(PendingTransition {
            from: None,
            to: to.trim().to_string(),
            transition: Box::new(transition),
        });
        self
    }

    /// Set the history stack settings.
    pub fn stack(mut self, stack: StackConfig) -> Self {
        self.stack = stack;
        self
    }

    /// Apply a loaded configuration: stack settings and, if present, the
    /// initial state.
    pub fn config(mut self, config: MachineConfig) -> Self {
        if let Some(initial) = config.initial_state.as_deref() {
            self = self.initial(initial);
        }
        self.stack(config.stack)
    }

    /// Check every registration at once, accumulating all problems.
    fn validate(&self) -> Validation<(), NonEmptyVec<BuildError>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<BuildError>>> = Vec::new();

        if self.states.is_empty() {
            checks.push(Validation::fail(BuildError::NoStates));
        }

        let mut names = HashSet::new();
        let mut types = HashSet::new();
        for (state, type_id, type_name) in &self.states {
            let name = state.name().trim();
            if !names.insert(name) {
                checks.push(Validation::fail(BuildError::DuplicateState(name.to_string())));
            }
            if !types.insert(*type_id) {
                checks.push(Validation::fail(BuildError::DuplicateStateType(
                    type_name.to_string(),
                )));
            }
        }

        match &self.initial {
            Some(InitialRef::Name(name)) if !names.contains(name.as_str()) => {
                checks.push(Validation::fail(BuildError::UnknownInitialState(name.clone())));
            }
            Some(InitialRef::Type { id, name }) if !types.contains(id) => {
                checks.push(Validation::fail(BuildError::UnknownInitialState(
                    name.to_string(),
                )));
            }
            _ => {}
        }

        let mut edges = HashSet::new();
        for pending in &self.transitions {
            let from = pending.from.as_deref().unwrap_or("Any");
            let endpoints = pending.from.iter().chain(std::iter::once(&pending.to));
            for endpoint in endpoints {
                if !names.contains(endpoint.as_str()) {
                    checks.push(Validation::fail(BuildError::UnknownTransitionState {
                        from: from.to_string(),
                        to: pending.to.clone(),
                        missing: endpoint.clone(),
                    }));
                }
            }
            if !edges.insert((pending.from.as_deref(), pending.to.as_str())) {
                checks.push(Validation::fail(BuildError::DuplicateTransition {
                    from: from.to_string(),
                    to: pending.to.clone(),
                }));
            }
        }

        Validation::all_vec(checks).map(|_| ())
    }

    /// Build the state machine.
    ///
    /// A missing initial state is not a build error: it is reported by
    /// [`StateMachine::initialize`].
    pub fn build(self) -> Result<StateMachine<C, I>, BuildError> {
        if let Validation::Failure(errors) = self.validate() {
            let mut errors: Vec<BuildError> = errors.iter().cloned().collect();
            return Err(if errors.len() == 1 {
                errors.remove(0)
            } else {
                BuildError::Invalid(errors)
            });
        }

        let mut machine = StateMachine::empty(self.user, self.stack.build_stack());
        for (state, type_id, _) in self.states {
            machine.insert_state(state, type_id);
        }

        for pending in self.transitions {
            let key = edge_key(&machine, &pending)?;
            machine.insert_transition(key, pending.transition)?;
        }

        match self.initial {
            Some(InitialRef::Name(name)) => {
                machine.set_initial_state(&name)?;
            }
            Some(InitialRef::Type { id, name }) => {
                let initial = machine
                    .state_id_by_type(id)
                    .ok_or_else(|| BuildError::UnknownInitialState(name.to_string()))?;
                machine.set_initial_id(initial);
            }
            None => {}
        }

        Ok(machine)
    }
}

fn edge_key<C: 'static, I: 'static>(
    machine: &StateMachine<C, I>,
    pending: &PendingTransition<C>,
) -> Result<TransitionKey, BuildError> {
    let missing = |name: &str| BuildError::UnknownTransitionState {
        from: pending.from.clone().unwrap_or_else(|| "Any".to_string()),
        to: pending.to.clone(),
        missing: name.to_string(),
    };

    let to = machine
        .state_id(&pending.to)
        .ok_or_else(|| missing(&pending.to))?;
    let from = match pending.from.as_deref() {
        Some(name) => Source::State(machine.state_id(name).ok_or_else(|| missing(name))?),
        None => Source::Any,
    };
    Ok(TransitionKey { from, to })
}
