//! The state registry and driver.

use crate::config::StackConfig;
use crate::core::{
    MachineState, NeutralTransition, Parameters, PushOutcome, Source, StackEntry, StateId,
    StateStack, Transition, TransitionKey, TransitionRequest,
};
use crate::machine::context::{Context, Target};
use crate::machine::error::{ChangeOutcome, FsmError};
use crate::machine::events::{MachineEvent, ObserverId, Observers};
use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use tracing::{debug, error, trace, warn};

/// Deferred requests handled in one drain before the rest is dropped.
pub const MAX_CHAINED_CHANGES: usize = 64;

pub(crate) type BoxedState<C, I> = Box<dyn MachineState<Context = C, Input = I>>;
pub(crate) type BoxedTransition<C> = Box<dyn Transition<C>>;

struct Slot<C, I> {
    state: BoxedState<C, I>,
    name: String,
    enabled: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Built,
    Ready,
    Running,
}

/// Finite state machine for one entity.
///
/// Owns the states, the transitions, the entity [`Context`] and the history
/// stack. The host calls [`process`](Self::process),
/// [`physics_process`](Self::physics_process) and
/// [`unhandled_input`](Self::unhandled_input); game logic calls the
/// `change_state_to*` methods.
///
/// A change runs in this order: guard, effect, history push, `exit` of the
/// outgoing state, enable/disable pass and pointer swap, `StateChanged`,
/// `enter` of the incoming state. A rejected guard only emits
/// `StateChangeFailed`.
///
/// # Example
///
/// ```rust
/// use xtension_fsm::{machine_state, ChangeOutcome, StateMachine};
///
/// machine_state! {
///     context = ();
///     pub struct Idle;
///     pub struct Run;
/// }
///
/// let mut machine = StateMachine::builder(())
///     .state(Idle)
///     .state(Run)
///     .initial("Idle")
///     .build()
///     .unwrap();
/// machine.initialize().unwrap();
///
/// assert_eq!(machine.change_state_to("Run", None), Ok(ChangeOutcome::Changed));
/// assert_eq!(machine.current_state(), Some("Run"));
/// assert_eq!(machine.stack().names(), vec!["Idle"]);
/// ```
pub struct StateMachine<C, I = ()> {
    slots: Vec<Slot<C, I>>,
    by_name: HashMap<String, StateId>,
    by_type: HashMap<TypeId, StateId>,
    transitions: HashMap<TransitionKey, BoxedTransition<C>>,
    fallbacks: HashSet<TransitionKey>,
    context: Context<C>,
    observers: Observers,
    stack: StateStack,
    initial: Option<StateId>,
    current: Option<StateId>,
    phase: Phase,
    transitioning: bool,
    locked: bool,
}

impl<C: 'static, I: 'static> StateMachine<C, I> {
    pub(crate) fn empty(user: C, stack: StateStack) -> Self {
        Self {
            slots: Vec::new(),
            by_name: HashMap::new(),
            by_type: HashMap::new(),
            transitions: HashMap::new(),
            fallbacks: HashSet::new(),
            context: Context::new(user),
            observers: Observers::default(),
            stack,
            initial: None,
            current: None,
            phase: Phase::Built,
            transitioning: false,
            locked: false,
        }
    }

    /// Register a state. Names are checked for uniqueness by the builder.
    pub(crate) fn insert_state(&mut self, state: BoxedState<C, I>, type_id: TypeId) -> StateId {
        let id = StateId(self.slots.len());
        let name = state.name().trim().to_string();
        self.by_name.insert(name.clone(), id);
        self.by_type.insert(type_id, id);
        self.slots.push(Slot {
            state,
            name,
            enabled: false,
        });
        id
    }

    pub(crate) fn insert_transition(
        &mut self,
        key: TransitionKey,
        transition: BoxedTransition<C>,
    ) -> Result<(), FsmError> {
        if self.transitions.contains_key(&key) && !self.fallbacks.remove(&key) {
            return Err(FsmError::DuplicateTransition {
                from: self.source_name(&key),
                to: self.slot_name(key.to),
            });
        }

        if key.is_wildcard() {
            // neutral fallbacks installed earlier would shadow the new wildcard
            let shadowing: Vec<TransitionKey> = self
                .fallbacks
                .iter()
                .filter(|fallback| fallback.to == key.to)
                .copied()
                .collect();
            for fallback in shadowing {
                self.fallbacks.remove(&fallback);
                self.transitions.remove(&fallback);
            }
        }

        self.transitions.insert(key, transition);
        Ok(())
    }

    /// Run every state's `ready` hook, then enter the initial state.
    ///
    /// Without an initial state the error is logged and returned and no state
    /// is entered; the machine can be initialized again once
    /// [`set_initial_state`](Self::set_initial_state) has been called.
    pub fn initialize(&mut self) -> Result<(), FsmError> {
        if self.phase == Phase::Running {
            return Err(FsmError::AlreadyInitialized);
        }

        if self.phase == Phase::Built {
            for slot in self.slots.iter_mut() {
                slot.state.ready(&mut self.context);
            }
            self.phase = Phase::Ready;
        }

        let Some(initial) = self.initial else {
            error!("This state machine does not have an initial state defined");
            return Err(FsmError::MissingInitialState);
        };

        self.phase = Phase::Running;
        self.install(initial);
        debug!(state = %self.slots[initial.0].name, "state machine initialized");
        self.enter(initial);
        self.drain_pending();
        Ok(())
    }

    /// Configure the state entered by [`initialize`](Self::initialize).
    pub fn set_initial_state(&mut self, name: &str) -> Result<StateId, FsmError> {
        let id = self.lookup(&Target::Name(name.to_string()))?;
        self.initial = Some(id);
        Ok(id)
    }

    pub(crate) fn set_initial_id(&mut self, id: StateId) {
        self.initial = Some(id);
    }

    /// Request a change to the state registered under `name`.
    pub fn change_state_to(
        &mut self,
        name: &str,
        parameters: Option<Parameters>,
    ) -> Result<ChangeOutcome, FsmError> {
        self.request(Target::Name(name.to_string()), parameters)
    }

    /// Request a change to a state by its registry handle.
    pub fn change_state_to_id(
        &mut self,
        id: StateId,
        parameters: Option<Parameters>,
    ) -> Result<ChangeOutcome, FsmError> {
        self.request(Target::Id(id), parameters)
    }

    /// Request a change to the state registered with type `T`.
    pub fn change_state_to_type<T>(
        &mut self,
        parameters: Option<Parameters>,
    ) -> Result<ChangeOutcome, FsmError>
    where
        T: MachineState + 'static,
    {
        self.request(Target::of::<T>(), parameters)
    }

    fn request(
        &mut self,
        target: Target,
        parameters: Option<Parameters>,
    ) -> Result<ChangeOutcome, FsmError> {
        let outcome = self
            .lookup(&target)
            .and_then(|id| self.run_change(id, parameters.as_ref()));

        if let Err(err) = &outcome {
            error!(%err, "The change of state cannot be done");
        }

        self.drain_pending();
        outcome
    }

    fn lookup(&self, target: &Target) -> Result<StateId, FsmError> {
        match target {
            Target::Name(name) => self
                .state_id(name)
                .ok_or_else(|| FsmError::UnknownState(name.clone())),
            Target::Id(id) => {
                if id.0 < self.slots.len() {
                    Ok(*id)
                } else {
                    Err(FsmError::UnknownState(id.to_string()))
                }
            }
            Target::Type { id, name } => self
                .by_type
                .get(id)
                .copied()
                .ok_or_else(|| FsmError::UnknownState((*name).to_string())),
        }
    }

    fn run_change(
        &mut self,
        target: StateId,
        parameters: Option<&Parameters>,
    ) -> Result<ChangeOutcome, FsmError> {
        let from = self.current.ok_or(FsmError::NotInitialized)?;
        if from == target {
            return Ok(ChangeOutcome::Unchanged);
        }

        let key = self.resolve_transition(from, target);
        let from_name = self.slot_name(from);
        let to_name = self.slot_name(target);

        self.transitioning = true;
        let request = TransitionRequest::new(&from_name, &to_name, parameters);
        let transition = self
            .transitions
            .entry(key)
            .or_insert_with(|| Box::new(NeutralTransition) as BoxedTransition<C>);

        if !transition.should_transition(&request, &self.context.user) {
            self.transitioning = false;
            debug!(from = %from_name, to = %to_name, "transition rejected by guard");
            self.observers.emit(&MachineEvent::StateChangeFailed {
                from: from_name,
                to: to_name,
            });
            return Ok(ChangeOutcome::Rejected);
        }

        transition.on_transition(&request, &mut self.context.user);

        self.push_to_stack(from, &from_name);
        self.slots[from.0].state.exit(&to_name, &mut self.context);
        self.install(target);
        self.transitioning = false;

        debug!(from = %from_name, to = %to_name, "state changed");
        self.observers.emit(&MachineEvent::StateChanged {
            from: from_name,
            to: to_name,
        });

        self.enter(target);
        Ok(ChangeOutcome::Changed)
    }

    /// Specific edge first, then the wildcard, then a neutral fallback
    /// registered under the specific key.
    fn resolve_transition(&mut self, from: StateId, to: StateId) -> TransitionKey {
        let specific = TransitionKey::between(from, to);
        if self.transitions.contains_key(&specific) {
            return specific;
        }

        let wildcard = TransitionKey::any_to(to);
        if self.transitions.contains_key(&wildcard) {
            return wildcard;
        }

        trace!(edge = %specific, "no transition registered, using neutral fallback");
        self.fallbacks.insert(specific);
        specific
    }

    fn install(&mut self, id: StateId) {
        for slot in self.slots.iter_mut() {
            slot.enabled = false;
        }
        self.current = Some(id);
        self.slots[id.0].enabled = true;
    }

    fn enter(&mut self, id: StateId) {
        self.slots[id.0].state.enter(&mut self.context);
        let state = self.slot_name(id);
        self.observers.emit(&MachineEvent::StateEntered { state });
    }

    fn push_to_stack(&mut self, id: StateId, name: &str) {
        match self.stack.push(StackEntry::new(id, name)) {
            PushOutcome::Skipped => return,
            PushOutcome::Flushed { cleared } => {
                debug!(size = cleared.len(), "history stack full, flushed");
                let stack = cleared.into_iter().map(|entry| entry.name).collect();
                self.observers.emit(&MachineEvent::StackFlushed { stack });
            }
            PushOutcome::Pushed { evicted: Some(oldest) } => {
                trace!(state = %oldest.name, "evicted oldest history entry");
            }
            PushOutcome::Pushed { evicted: None } => {}
        }

        self.observers.emit(&MachineEvent::StackPushed {
            state: name.to_string(),
            stack: self.stack.names(),
        });
    }

    /// Run requests queued through the [`Context`] until the queue is empty.
    fn drain_pending(&mut self) {
        if self.phase != Phase::Running {
            return;
        }

        let mut handled = 0;
        while let Some(pending) = self.context.take_pending() {
            if handled == MAX_CHAINED_CHANGES {
                self.context.clear_pending();
                warn!(
                    limit = MAX_CHAINED_CHANGES,
                    "too many chained state changes, dropping the remaining requests"
                );
                return;
            }
            handled += 1;

            let outcome = self
                .lookup(&pending.target)
                .and_then(|id| self.run_change(id, pending.parameters.as_ref()));
            if let Err(err) = outcome {
                error!(%err, "The deferred change of state cannot be done");
            }
        }
    }

    /// Render-rate tick, forwarded to the current state only.
    pub fn process(&mut self, delta: f64) {
        if let Some(id) = self.active() {
            self.slots[id.0].state.update(delta, &mut self.context);
            self.drain_pending();
        }
    }

    /// Physics-rate tick, forwarded to the current state only.
    pub fn physics_process(&mut self, delta: f64) {
        if let Some(id) = self.active() {
            self.slots[id.0].state.physics_update(delta, &mut self.context);
            self.drain_pending();
        }
    }

    /// Forward an unhandled input event to the current state.
    ///
    /// The event is consumed: it is dropped once the state has seen it.
    pub fn unhandled_input(&mut self, event: I) {
        if let Some(id) = self.active() {
            self.slots[id.0].state.handle_input(&event, &mut self.context);
            drop(event);
            self.drain_pending();
        }
    }

    fn active(&self) -> Option<StateId> {
        if self.locked {
            None
        } else {
            self.current
        }
    }

    /// Stop forwarding frames and input, e.g. during a cutscene.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_initialized(&self) -> bool {
        self.phase == Phase::Running
    }

    /// True only while a change is between its guard and its swap.
    ///
    /// The flag is cleared inside the change routine before any event is
    /// emitted, and hooks cannot reach the driver, so every caller outside
    /// the driver reads `false`. Requests made while a change runs are queued
    /// on the [`Context`] instead of being refused.
    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    /// Register a transition for the `from -> to` edge.
    pub fn register_transition<T>(&mut self, from: &str, to: &str, transition: T) -> Result<(), FsmError>
    where
        T: Transition<C> + 'static,
    {
        let from = self.lookup(&Target::Name(from.to_string()))?;
        let to = self.lookup(&Target::Name(to.to_string()))?;
        self.insert_transition(TransitionKey::between(from, to), Box::new(transition))
    }

    /// Register a transition used for any edge into `to` without a specific one.
    pub fn register_any_transition<T>(&mut self, to: &str, transition: T) -> Result<(), FsmError>
    where
        T: Transition<C> + 'static,
    {
        let to = self.lookup(&Target::Name(to.to_string()))?;
        self.insert_transition(TransitionKey::any_to(to), Box::new(transition))
    }

    /// Whether an explicit transition (not a neutral fallback) exists for `key`.
    pub fn has_transition(&self, key: TransitionKey) -> bool {
        self.transitions.contains_key(&key) && !self.fallbacks.contains(&key)
    }

    /// Subscribe to [`MachineEvent`]s. Observers run in subscription order.
    pub fn subscribe<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&MachineEvent) + 'static,
    {
        self.observers.subscribe(Box::new(observer))
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Apply stack settings at run time. Entries above a lowered capacity are dropped.
    pub fn configure_stack(&mut self, config: &StackConfig) {
        self.stack.set_enabled(config.enabled);
        self.stack.set_policy(config.policy());
        self.stack.set_capacity(config.capacity);
    }

    pub fn current_state(&self) -> Option<&str> {
        self.current.map(|id| self.slots[id.0].name.as_str())
    }

    pub fn current_state_id(&self) -> Option<StateId> {
        self.current
    }

    /// Compare the current state's name, ignoring case and surrounding whitespace.
    pub fn current_state_is(&self, name: &str) -> bool {
        self.current_state()
            .is_some_and(|current| current.to_lowercase() == name.trim().to_lowercase())
    }

    pub fn current_state_is_not(&self, names: &[&str]) -> bool {
        !names.iter().any(|name| self.current_state_is(name))
    }

    pub fn state_exists(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.by_name.get(name).copied()
    }

    pub fn state_id_of<T: 'static>(&self) -> Option<StateId> {
        self.state_id_by_type(TypeId::of::<T>())
    }

    pub(crate) fn state_id_by_type(&self, type_id: TypeId) -> Option<StateId> {
        self.by_type.get(&type_id).copied()
    }

    pub fn state_name(&self, id: StateId) -> Option<&str> {
        self.slots.get(id.0).map(|slot| slot.name.as_str())
    }

    pub fn state(&self, name: &str) -> Option<&dyn MachineState<Context = C, Input = I>> {
        self.state_id(name)
            .map(|id| self.slots[id.0].state.as_ref())
    }

    /// Names in registration order.
    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|slot| slot.name.as_str())
    }

    pub fn state_count(&self) -> usize {
        self.slots.len()
    }

    /// Whether the state receives hooks. Only the current state is enabled.
    pub fn is_enabled(&self, id: StateId) -> bool {
        self.slots.get(id.0).is_some_and(|slot| slot.enabled)
    }

    /// The state the machine was in before the current one, if recorded.
    pub fn last_state(&self) -> Option<&StackEntry> {
        self.stack.last()
    }

    pub fn stack(&self) -> &StateStack {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut StateStack {
        &mut self.stack
    }

    pub fn context(&self) -> &Context<C> {
        &self.context
    }

    /// Requests queued here run on the next change, frame or input call.
    pub fn context_mut(&mut self) -> &mut Context<C> {
        &mut self.context
    }

    pub fn user(&self) -> &C {
        &self.context.user
    }

    pub fn user_mut(&mut self) -> &mut C {
        &mut self.context.user
    }

    fn slot_name(&self, id: StateId) -> String {
        self.slots[id.0].name.clone()
    }

    fn source_name(&self, key: &TransitionKey) -> String {
        match key.from {
            Source::State(from) => self.slot_name(from),
            Source::Any => "Any".to_string(),
        }
    }
}
