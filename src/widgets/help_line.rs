//! One dimmed line of key hints above the input box.

use crate::core::component::Section;
use crate::render::screen::dim;
use crate::state::State;

pub struct HelpLine {
    text: &'static str,
}

impl HelpLine {
    pub fn new(text: &'static str) -> HelpLine {
        HelpLine { text }
    }
}

impl Section for HelpLine {
    fn build(&mut self, _state: &mut State, _width: usize) -> Vec<String> {
        vec![dim(self.text)]
    }
}

#[cfg(test)]
mod tests {
    use super::HelpLine;
    use crate::core::component::Section;
    use crate::state::State;

    #[test]
    fn renders_the_hint_text_dimmed() {
        let mut state = State::new();
        let mut help = HelpLine::new("Ctrl+D = submit");
        let lines = help.build(&mut state, 80);
        assert_eq!(lines, vec![format!("\x1b[2mCtrl+D = submit\x1b[22m")]);
    }
}
