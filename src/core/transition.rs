//! Transition objects: the guard and effect attached to a state-change edge.

use super::state::StateId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Caller-supplied values handed to a transition's guard and effect.
pub type Parameters = HashMap<String, Value>;

/// Origin side of a transition edge.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Source {
    /// Applies only when leaving this state.
    State(StateId),
    /// Applies when leaving any state that has no specific edge to the target.
    Any,
}

/// Registry key of a transition.
///
/// A specific `(State(from), to)` key always wins over the `(Any, to)`
/// wildcard during resolution.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct TransitionKey {
    pub from: Source,
    pub to: StateId,
}

impl TransitionKey {
    pub fn between(from: StateId, to: StateId) -> Self {
        Self {
            from: Source::State(from),
            to,
        }
    }

    pub fn any_to(to: StateId) -> Self {
        Self {
            from: Source::Any,
            to,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self.from, Source::Any)
    }
}

impl fmt::Display for TransitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.from {
            Source::State(from) => write!(f, "{from} -> {}", self.to),
            Source::Any => write!(f, "* -> {}", self.to),
        }
    }
}

/// One change attempt, built fresh for every call.
///
/// Guards and effects read the edge and the parameters from here instead of
/// from fields on the (long-lived, reused) transition object.
#[derive(Clone, Copy, Debug)]
pub struct TransitionRequest<'a> {
    /// Name of the current state.
    pub from: &'a str,
    /// Name of the requested state.
    pub to: &'a str,
    /// Values passed by the caller of the change, if any.
    pub parameters: Option<&'a Parameters>,
}

impl<'a> TransitionRequest<'a> {
    pub fn new(from: &'a str, to: &'a str, parameters: Option<&'a Parameters>) -> Self {
        Self {
            from,
            to,
            parameters,
        }
    }

    /// Look up a single parameter.
    pub fn parameter(&self, key: &str) -> Option<&'a Value> {
        self.parameters.and_then(|params| params.get(key))
    }
}

/// Guard and effect of a state-change edge.
///
/// `should_transition` only gets shared access to the entity context and to
/// itself, so evaluating it has no side effects and can be repeated.
/// `on_transition` runs exactly once per accepted attempt, before the
/// outgoing state exits.
///
/// # Example
///
/// ```rust
/// use xtension_fsm::core::{Transition, TransitionRequest};
///
/// struct Stats {
///     stamina: u32,
/// }
///
/// struct RunToJump;
///
/// impl Transition<Stats> for RunToJump {
///     fn should_transition(&self, _request: &TransitionRequest<'_>, stats: &Stats) -> bool {
///         stats.stamina > 0
///     }
///
///     fn on_transition(&mut self, _request: &TransitionRequest<'_>, stats: &mut Stats) {
///         stats.stamina -= 1;
///     }
/// }
///
/// let mut stats = Stats { stamina: 1 };
/// let request = TransitionRequest::new("Run", "Jump", None);
/// let mut transition = RunToJump;
///
/// assert!(transition.should_transition(&request, &stats));
/// transition.on_transition(&request, &mut stats);
/// assert!(!transition.should_transition(&request, &stats));
/// ```
pub trait Transition<C> {
    /// Decide whether the change may happen.
    fn should_transition(&self, _request: &TransitionRequest<'_>, _context: &C) -> bool {
        true
    }

    /// Side effects of an accepted change.
    fn on_transition(&mut self, _request: &TransitionRequest<'_>, _context: &mut C) {}
}

/// Always accepts and does nothing.
///
/// Installed for every edge that has neither a specific nor a wildcard
/// transition, so unconfigured changes never block the machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NeutralTransition;

impl<C> Transition<C> for NeutralTransition {}
