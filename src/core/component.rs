//! The section contract every screen region implements.

use crate::core::input::InputEvent;
use crate::state::State;

/// A horizontal band of the frame.
///
/// `build` returns exactly the lines the section wants on screen this tick;
/// the caller decides how many of them fit. `handle` is offered every input
/// event in screen order and returns `true` when the event was consumed,
/// which stops further routing for that event.
pub trait Section {
    fn build(&mut self, state: &mut State, width: usize) -> Vec<String>;

    fn handle(&mut self, _state: &mut State, _event: &InputEvent) -> bool {
        false
    }
}
