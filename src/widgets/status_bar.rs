//! Bottom status line: project, mode, model.

use crate::core::component::Section;
use crate::render::screen::{bold, dim};
use crate::state::State;

#[derive(Default)]
pub struct StatusBar;

impl Section for StatusBar {
    fn build(&mut self, state: &mut State, width: usize) -> Vec<String> {
        let left = format!("{} · {}", state.project_name, state.model);
        let mode = format!("⇧⇥ {}", state.mode.label());
        let gap = width
            .saturating_sub(left.chars().count() + mode.chars().count())
            .max(1);
        vec![format!("{}{}{}", dim(&left), " ".repeat(gap), bold(&mode))]
    }
}
