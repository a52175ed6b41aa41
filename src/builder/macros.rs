//! Macros for ergonomic state declaration.

/// Declare unit-struct states that only need the default (no-op) hooks.
///
/// The input type defaults to `()` when omitted.
///
/// # Example
///
/// ```
/// use xtension_fsm::machine_state;
/// use xtension_fsm::core::MachineState;
///
/// #[derive(Default)]
/// pub struct Player {
///     pub health: u32,
/// }
///
/// machine_state! {
///     context = Player;
///     /// Standing still.
///     pub struct Idle;
///     pub struct Dead;
/// }
///
/// assert_eq!(Idle.name(), "Idle");
/// assert_eq!(Dead.name(), "Dead");
/// ```
#[macro_export]
macro_rules! machine_state {
    (
        context = $context:ty;
        input = $input:ty;
        $(
            $(#[$meta:meta])*
            $vis:vis struct $name:ident;
        )+
    ) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
            $vis struct $name;

            impl $crate::core::MachineState for $name {
                type Context = $context;
                type Input = $input;
            }
        )+
    };

    (
        context = $context:ty;
        $($rest:tt)+
    ) => {
        $crate::machine_state! {
            context = $context;
            input = ();
            $($rest)+
        }
    };
}
