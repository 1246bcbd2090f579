//! Shared UI state threaded through every section each tick.
//!
//! All editing primitives live here so the input box, the autocomplete and
//! the application loop mutate the buffer through one set of operations.
//! Caret positions are char indices; the buffer is kept to printable ASCII,
//! tab and newline by the paste sanitizer, so char and column math agree.

use crate::core::text::{caret_line_col, line_indexing, wrap_text_and_locate_caret};
use crate::widgets::content_item::ContentItem;
use crate::widgets::island::IslandWidget;

/// Most wrapped lines the input box ever shows at once.
pub const INPUT_MAX_VISIBLE_LINES: usize = 5;

/// Conversation mode, cycled by Shift+Tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Chat,
    Plan,
    Execution,
}

impl Mode {
    pub fn next(self) -> Mode {
        match self {
            Mode::Chat => Mode::Plan,
            Mode::Plan => Mode::Execution,
            Mode::Execution => Mode::Chat,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Chat => "chat",
            Mode::Plan => "plan",
            Mode::Execution => "execution",
        }
    }
}

pub struct State {
    pub model: String,
    pub small_model: String,
    pub mode: Mode,
    pub project_name: String,
    pub project_workdir: String,

    /// Raw input buffer, hard newlines included.
    pub input: String,
    /// Caret as a char offset into `input`.
    pub caret_index: usize,
    /// First wrapped input line currently shown.
    pub input_scroll_top: usize,
    /// Preferred column for vertical caret movement across hard lines.
    pub sticky_col: usize,

    pub autocomplete_open: bool,
    pub content_viewport_height: usize,
    pub content_items: Vec<ContentItem>,
    pub island: Option<IslandWidget>,

    /// Forces a frame even on ticks with no input events.
    pub require_redraw: bool,
}

impl State {
    pub fn new() -> State {
        State {
            model: String::new(),
            small_model: String::new(),
            mode: Mode::Chat,
            project_name: String::new(),
            project_workdir: String::new(),
            input: String::new(),
            caret_index: 0,
            input_scroll_top: 0,
            sticky_col: 0,
            autocomplete_open: false,
            content_viewport_height: 0,
            content_items: Vec::new(),
            island: None,
            require_redraw: true,
        }
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    pub fn char_count(&self) -> usize {
        self.input.chars().count()
    }

    pub fn insert_text(&mut self, text: &str) {
        let at = self.byte_index(self.caret_index);
        self.input.insert_str(at, text);
        self.caret_index += text.chars().count();
        self.update_sticky_from_caret();
    }

    pub fn delete_char_left(&mut self) {
        if self.caret_index == 0 {
            return;
        }
        let start = self.byte_index(self.caret_index - 1);
        let end = self.byte_index(self.caret_index);
        self.input.replace_range(start..end, "");
        self.caret_index -= 1;
        self.update_sticky_from_caret();
    }

    pub fn delete_char_right(&mut self) {
        if self.caret_index >= self.char_count() {
            return;
        }
        let start = self.byte_index(self.caret_index);
        let end = self.byte_index(self.caret_index + 1);
        self.input.replace_range(start..end, "");
        self.update_sticky_from_caret();
    }

    /// Remove the hard line the caret sits on, joining its neighbors.
    pub fn delete_current_line(&mut self) {
        let (starts, lines) = line_indexing(&self.input);
        let (line, _) = caret_line_col(&starts, self.caret_index);
        let mut kept: Vec<String> = lines;
        kept.remove(line);
        self.input = kept.join("\n");
        let line = line.min(kept.len().saturating_sub(1));
        let (starts, lines) = line_indexing(&self.input);
        let col = self.sticky_col.min(lines[line].chars().count());
        self.caret_index = starts[line] + col;
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
        self.caret_index = 0;
        self.input_scroll_top = 0;
        self.sticky_col = 0;
    }

    pub fn move_left(&mut self) {
        if self.caret_index > 0 {
            self.caret_index -= 1;
            self.update_sticky_from_caret();
        }
    }

    pub fn move_right(&mut self) {
        if self.caret_index < self.char_count() {
            self.caret_index += 1;
            self.update_sticky_from_caret();
        }
    }

    pub fn move_home(&mut self) {
        let (starts, _) = line_indexing(&self.input);
        let (line, _) = caret_line_col(&starts, self.caret_index);
        self.caret_index = starts[line];
        self.update_sticky_from_caret();
    }

    pub fn move_end(&mut self) {
        let (starts, lines) = line_indexing(&self.input);
        let (line, _) = caret_line_col(&starts, self.caret_index);
        self.caret_index = starts[line] + lines[line].chars().count();
        self.update_sticky_from_caret();
    }

    /// Vertical movement across hard lines, clamping to the sticky column.
    pub fn move_up(&mut self) {
        let (starts, lines) = line_indexing(&self.input);
        let (line, _) = caret_line_col(&starts, self.caret_index);
        if line == 0 {
            return;
        }
        let target = line - 1;
        let col = self.sticky_col.min(lines[target].chars().count());
        self.caret_index = starts[target] + col;
    }

    pub fn move_down(&mut self) {
        let (starts, lines) = line_indexing(&self.input);
        let (line, _) = caret_line_col(&starts, self.caret_index);
        if line + 1 >= lines.len() {
            return;
        }
        let target = line + 1;
        let col = self.sticky_col.min(lines[target].chars().count());
        self.caret_index = starts[target] + col;
    }

    /// Reset the preferred column after any horizontal edit or move.
    pub fn update_sticky_from_caret(&mut self) {
        let (starts, _) = line_indexing(&self.input);
        let (_, col) = caret_line_col(&starts, self.caret_index);
        self.sticky_col = col;
    }

    /// Scroll the input window so the caret's wrapped line is visible.
    pub fn ensure_caret_visible(&mut self, width: usize) {
        let (lines, caret_line, _) =
            wrap_text_and_locate_caret(&self.input, self.caret_index, width);
        if caret_line < self.input_scroll_top {
            self.input_scroll_top = caret_line;
        }
        let bottom = self.input_scroll_top + INPUT_MAX_VISIBLE_LINES - 1;
        if caret_line > bottom {
            self.input_scroll_top = caret_line - (INPUT_MAX_VISIBLE_LINES - 1);
        }
        let max_top = lines.len().saturating_sub(INPUT_MAX_VISIBLE_LINES);
        self.input_scroll_top = self.input_scroll_top.min(max_top);
    }

    /// Append a card, or replace the card at `at` in place. Returns the
    /// card's index either way.
    pub fn push_content_item(&mut self, item: ContentItem, at: Option<usize>) -> usize {
        self.require_redraw = true;
        match at {
            Some(index) if index < self.content_items.len() => {
                self.content_items[index] = item;
                index
            }
            _ => {
                self.content_items.push(item);
                self.content_items.len() - 1
            }
        }
    }

    pub fn set_island(&mut self, island: IslandWidget) {
        self.island = Some(island);
        self.require_redraw = true;
    }

    pub fn clear_island(&mut self) {
        if self.island.is_some() {
            self.island = None;
            self.require_redraw = true;
        }
    }
}

impl Default for State {
    fn default() -> State {
        State::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Mode, State, INPUT_MAX_VISIBLE_LINES};
    use crate::widgets::content_item::ContentItem;
    use pretty_assertions::assert_eq;

    #[test]
    fn mode_cycles_through_all_three() {
        assert_eq!(Mode::Chat.next(), Mode::Plan);
        assert_eq!(Mode::Plan.next(), Mode::Execution);
        assert_eq!(Mode::Execution.next(), Mode::Chat);
    }

    #[test]
    fn insert_and_delete_move_the_caret() {
        let mut state = State::new();
        state.insert_text("hello");
        assert_eq!(state.caret_index, 5);
        state.caret_index = 2;
        state.insert_text("XY");
        assert_eq!(state.input, "heXYllo");
        assert_eq!(state.caret_index, 4);
        state.delete_char_left();
        assert_eq!(state.input, "heXllo");
        assert_eq!(state.caret_index, 3);
    }

    #[test]
    fn delete_right_removes_under_the_caret() {
        let mut state = State::new();
        state.insert_text("abc");
        state.caret_index = 1;
        state.delete_char_right();
        assert_eq!(state.input, "ac");
        assert_eq!(state.caret_index, 1);
        state.caret_index = 2;
        // Nothing to the right of the end.
        state.delete_char_right();
        assert_eq!(state.input, "ac");
    }

    #[test]
    fn vertical_movement_keeps_sticky_column() {
        let mut state = State::new();
        state.insert_text("a long line\nxy\nanother long one");
        state.caret_index = 8; // col 8 on the first hard line
        state.update_sticky_from_caret();
        state.move_down();
        // Short middle line clamps to its end without losing the column.
        assert_eq!(state.caret_index, 12 + 2);
        state.move_down();
        let (starts, _) = crate::core::text::line_indexing(&state.input);
        assert_eq!(state.caret_index, starts[2] + 8);
    }

    #[test]
    fn delete_current_line_joins_neighbors() {
        let mut state = State::new();
        state.insert_text("one\ntwo\nthree");
        state.caret_index = 5; // inside "two"
        state.update_sticky_from_caret();
        state.delete_current_line();
        assert_eq!(state.input, "one\nthree");
    }

    #[test]
    fn delete_only_line_leaves_empty_buffer() {
        let mut state = State::new();
        state.insert_text("solo");
        state.caret_index = 2;
        state.update_sticky_from_caret();
        state.delete_current_line();
        assert_eq!(state.input, "");
        assert_eq!(state.caret_index, 0);
    }

    #[test]
    fn caret_scrolls_the_input_window() {
        let mut state = State::new();
        state.insert_text("1\n2\n3\n4\n5\n6\n7");
        state.caret_index = state.char_count();
        state.ensure_caret_visible(40);
        // Seven wrapped lines, caret on the last one.
        assert_eq!(state.input_scroll_top, 7 - INPUT_MAX_VISIBLE_LINES);
        state.caret_index = 0;
        state.ensure_caret_visible(40);
        assert_eq!(state.input_scroll_top, 0);
    }

    #[test]
    fn push_content_item_replaces_in_place() {
        let mut state = State::new();
        let first = state.push_content_item(ContentItem::response_card("a"), None);
        let second = state.push_content_item(ContentItem::response_card("b"), None);
        assert_eq!((first, second), (0, 1));
        let replaced = state.push_content_item(ContentItem::response_card("ab"), Some(0));
        assert_eq!(replaced, 0);
        assert_eq!(state.content_items.len(), 2);
        assert_eq!(state.content_items[0].text, "ab");
    }
}
