//! Multi-line soft-wrapped input box.
//!
//! The buffer lives in [`State`]; this section owns only presentation and
//! key routing. At most [`INPUT_MAX_VISIBLE_LINES`] wrapped lines are shown,
//! windowed so the caret always stays on screen.

use crate::core::component::Section;
use crate::core::input::{InputEvent, Key};
use crate::core::text::{pad_to_width, sanitize_paste, wrap_text_and_locate_caret};
use crate::render::screen::dim;
use crate::sched::now_ms;
use crate::state::{State, INPUT_MAX_VISIBLE_LINES};

/// Second Escape within this window clears the buffer.
const ESCAPE_CLEAR_WINDOW_MS: u64 = 500;

pub struct InputBox {
    last_width: usize,
    last_escape_at_ms: Option<u64>,
}

impl InputBox {
    pub fn new() -> InputBox {
        InputBox {
            last_width: 80,
            last_escape_at_ms: None,
        }
    }

    fn inner_width(width: usize) -> usize {
        width.saturating_sub(4).max(1)
    }

    /// Caret cell relative to this section's first line, columns 0-based.
    pub fn caret_cell(&self, state: &State, width: usize) -> (usize, usize) {
        let inner = Self::inner_width(width);
        let (_, caret_line, caret_col) =
            wrap_text_and_locate_caret(&state.input, state.caret_index, inner);
        let row = 1 + caret_line.saturating_sub(state.input_scroll_top);
        (row, 2 + caret_col)
    }

    fn handle_escape(&mut self, state: &mut State, now: u64) {
        if let Some(last) = self.last_escape_at_ms {
            if now.saturating_sub(last) < ESCAPE_CLEAR_WINDOW_MS {
                state.clear_input();
                self.last_escape_at_ms = None;
                return;
            }
        }
        self.last_escape_at_ms = Some(now);
    }
}

impl Default for InputBox {
    fn default() -> InputBox {
        InputBox::new()
    }
}

impl Section for InputBox {
    fn build(&mut self, state: &mut State, width: usize) -> Vec<String> {
        self.last_width = width;
        let inner = Self::inner_width(width);
        state.ensure_caret_visible(inner);

        let (lines, _, _) = wrap_text_and_locate_caret(&state.input, state.caret_index, inner);
        let visible = lines
            .iter()
            .skip(state.input_scroll_top)
            .take(INPUT_MAX_VISIBLE_LINES);

        let mut out = Vec::new();
        out.push(dim(&format!("╭{}╮", "─".repeat(inner + 2))));
        for line in visible {
            out.push(format!(
                "{} {} {}",
                dim("│"),
                pad_to_width(line, inner),
                dim("│")
            ));
        }
        out.push(dim(&format!("╰{}╯", "─".repeat(inner + 2))));
        out
    }

    fn handle(&mut self, state: &mut State, event: &InputEvent) -> bool {
        let inner = Self::inner_width(self.last_width);
        let consumed = match event {
            InputEvent::Text(text) => {
                state.insert_text(&sanitize_paste(text));
                true
            }
            InputEvent::Paste(text) => {
                state.insert_text(&sanitize_paste(text));
                true
            }
            InputEvent::Key(Key::Enter) => {
                state.insert_text("\n");
                true
            }
            InputEvent::Key(Key::Backspace) => {
                state.delete_char_left();
                true
            }
            InputEvent::Key(Key::Delete) => {
                state.delete_char_right();
                true
            }
            InputEvent::Key(Key::Ctrl('y')) => {
                state.delete_current_line();
                true
            }
            InputEvent::Key(Key::Left) => {
                state.move_left();
                true
            }
            InputEvent::Key(Key::Right) => {
                state.move_right();
                true
            }
            InputEvent::Key(Key::Up) => {
                state.move_up();
                true
            }
            InputEvent::Key(Key::Down) => {
                state.move_down();
                true
            }
            InputEvent::Key(Key::Home) => {
                state.move_home();
                true
            }
            InputEvent::Key(Key::End) => {
                state.move_end();
                true
            }
            InputEvent::Key(Key::Escape) => {
                self.handle_escape(state, now_ms());
                true
            }
            _ => false,
        };
        if consumed {
            state.ensure_caret_visible(inner);
        }
        consumed
    }
}
