//! Closure-built transitions.
//!
//! Most edges need a one-line predicate and maybe a small effect. `Guard`
//! wraps both closures so they can be registered without a dedicated type.

use super::transition::{Transition, TransitionRequest};

type Predicate<C> = Box<dyn Fn(&TransitionRequest<'_>, &C) -> bool>;
type Effect<C> = Box<dyn FnMut(&TransitionRequest<'_>, &mut C)>;

/// Transition made of a pure predicate and an optional effect.
///
/// # Example
///
/// ```rust
/// use xtension_fsm::core::{Guard, Transition, TransitionRequest};
///
/// struct Player {
///     stamina: i64,
///     jumps: u32,
/// }
///
/// let mut jump = Guard::new(|_req: &TransitionRequest<'_>, p: &Player| p.stamina > 0)
///     .then(|_req, p: &mut Player| p.jumps += 1);
///
/// let mut player = Player { stamina: 2, jumps: 0 };
/// let request = TransitionRequest::new("Run", "Jump", None);
///
/// assert!(jump.should_transition(&request, &player));
/// jump.on_transition(&request, &mut player);
/// assert_eq!(player.jumps, 1);
///
/// player.stamina = 0;
/// assert!(!jump.should_transition(&request, &player));
/// ```
pub struct Guard<C> {
    predicate: Predicate<C>,
    effect: Option<Effect<C>>,
}

impl<C> Guard<C> {
    /// Create a guard from a predicate.
    ///
    /// The predicate must be deterministic: the driver may evaluate it more
    /// than once for the same attempt.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&TransitionRequest<'_>, &C) -> bool + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
            effect: None,
        }
    }

    /// A guard that always passes, useful when only the effect matters.
    pub fn always() -> Self {
        Self::new(|_, _| true)
    }

    /// Attach the effect run after the predicate accepted.
    pub fn then<F>(mut self, effect: F) -> Self
    where
        F: FnMut(&TransitionRequest<'_>, &mut C) + 'static,
    {
        self.effect = Some(Box::new(effect));
        self
    }

    /// Evaluate the predicate.
    pub fn check(&self, request: &TransitionRequest<'_>, context: &C) -> bool {
        (self.predicate)(request, context)
    }
}

impl<C> Transition<C> for Guard<C> {
    fn should_transition(&self, request: &TransitionRequest<'_>, context: &C) -> bool {
        self.check(request, context)
    }

    fn on_transition(&mut self, request: &TransitionRequest<'_>, context: &mut C) {
        if let Some(effect) = self.effect.as_mut() {
            effect(request, context);
        }
    }
}
