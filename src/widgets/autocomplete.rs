//! Slash-command autocomplete.
//!
//! Opens whenever the input buffer is a single line starting with `/` and at
//! least one row matches. Two row sources: the top-level command list
//! filtered by substring against name or description, and a command's
//! follow-up arguments once an exactly-matching base plus a space is in the
//! buffer. A matched base without follow-ups falls back to the top-level
//! list so suggestions stay visible while a longer name is still being
//! typed.

use crate::core::component::Section;
use crate::core::input::{InputEvent, Key};
use crate::core::text::pad_to_width;
use crate::render::screen::{bold, dim};
use crate::state::State;

pub const MAX_ROWS_VISIBLE: usize = 5;

/// A slash command and the follow-up arguments it completes.
pub struct CommandSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub followups: &'static [(&'static str, &'static str)],
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Row {
    label: String,
    description: String,
    /// Full input value this row completes to.
    value: String,
}

pub struct Autocomplete {
    commands: &'static [CommandSpec],
    rows: Vec<Row>,
    title: String,
    selected: usize,
    offset: usize,
}

impl Autocomplete {
    pub fn new(commands: &'static [CommandSpec]) -> Autocomplete {
        Autocomplete {
            commands,
            rows: Vec::new(),
            title: String::new(),
            selected: 0,
            offset: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        !self.rows.is_empty()
    }

    pub fn selected_value(&self) -> Option<&str> {
        self.rows.get(self.selected).map(|row| row.value.as_str())
    }

    fn top_level_rows(&self, filter: &str) -> Vec<Row> {
        let filter = filter.to_lowercase();
        self.commands
            .iter()
            .filter(|command| {
                command.name.to_lowercase().contains(&filter)
                    || command.description.to_lowercase().contains(&filter)
            })
            .map(|command| Row {
                label: command.name.to_string(),
                description: command.description.to_string(),
                value: command.name.to_string(),
            })
            .collect()
    }

    fn matching_rows(&self, input: &str) -> (String, Vec<Row>) {
        let base = input.split_whitespace().next().unwrap_or(input);
        let tail = input
            .strip_prefix(base)
            .unwrap_or("")
            .split_whitespace()
            .next()
            .unwrap_or("");

        let matched = self
            .commands
            .iter()
            .find(|command| command.name.eq_ignore_ascii_case(base));

        match matched {
            Some(command) if !command.followups.is_empty() => {
                let filter = tail.to_lowercase();
                let rows = command
                    .followups
                    .iter()
                    .filter(|(argument, description)| {
                        argument.to_lowercase().contains(&filter)
                            || description.to_lowercase().contains(&filter)
                    })
                    .map(|(argument, description)| Row {
                        label: format!("{base} {argument}"),
                        description: description.to_string(),
                        value: format!("{base} {argument}"),
                    })
                    .collect();
                (command.description.to_string(), rows)
            }
            // Unknown base, or a known command with nothing to follow:
            // keep suggesting from the top-level list.
            _ => {
                let filter = base.trim_start_matches('/');
                ("Commands".to_string(), self.top_level_rows(filter))
            }
        }
    }

    /// Rebuild the row list from the buffer; the selection returns to the
    /// top row.
    pub fn recompute(&mut self, state: &mut State) {
        let eligible = state.input.starts_with('/') && !state.input.contains('\n');
        if !eligible {
            self.rows.clear();
        } else {
            let (title, rows) = self.matching_rows(&state.input);
            self.title = title;
            self.rows = rows;
        }

        self.selected = 0;
        self.offset = 0;
        state.autocomplete_open = self.is_open();
        state.require_redraw = true;
    }

    /// Replace the buffer with the selected row. A value ending in `#`
    /// expects a number next, so no trailing space is added.
    pub fn accept(&mut self, state: &mut State) {
        let Some(value) = self.selected_value().map(str::to_string) else {
            return;
        };
        let replacement = if value.ends_with('#') {
            value
        } else {
            format!("{value} ")
        };
        state.clear_input();
        state.insert_text(&replacement);
        self.recompute(state);
    }

    fn move_selection(&mut self, delta: isize) {
        if self.rows.is_empty() {
            return;
        }
        let last = self.rows.len() - 1;
        self.selected = if delta < 0 {
            self.selected.saturating_sub(delta.unsigned_abs())
        } else {
            (self.selected + delta as usize).min(last)
        };
        self.clamp_offset();
    }

    fn clamp_offset(&mut self) {
        if self.selected < self.offset {
            self.offset = self.selected;
        }
        let bottom = self.offset + MAX_ROWS_VISIBLE - 1;
        if self.selected > bottom {
            self.offset = self.selected - (MAX_ROWS_VISIBLE - 1);
        }
    }
}

impl Section for Autocomplete {
    fn build(&mut self, _state: &mut State, width: usize) -> Vec<String> {
        if !self.is_open() {
            return Vec::new();
        }
        let label_width = self
            .rows
            .iter()
            .map(|row| row.label.chars().count())
            .max()
            .unwrap_or(0);

        let mut out = vec![dim(&self.title)];
        let visible = self
            .rows
            .iter()
            .enumerate()
            .skip(self.offset)
            .take(MAX_ROWS_VISIBLE);
        for (index, row) in visible {
            let label = pad_to_width(&row.label, label_width.min(width));
            let line = if index == self.selected {
                format!("› {} {}", bold(&label), dim(&row.description))
            } else {
                format!("  {label} {}", dim(&row.description))
            };
            out.push(line);
        }
        out
    }

    fn handle(&mut self, state: &mut State, event: &InputEvent) -> bool {
        if !self.is_open() {
            return false;
        }
        match event {
            InputEvent::Key(Key::Up) => {
                self.move_selection(-1);
                state.require_redraw = true;
                true
            }
            InputEvent::Key(Key::Down) => {
                self.move_selection(1);
                state.require_redraw = true;
                true
            }
            InputEvent::Key(Key::Enter) | InputEvent::Key(Key::Tab) => {
                self.accept(state);
                true
            }
            InputEvent::Key(Key::Escape) => {
                // Buffer and panel close together while a command is being
                // composed.
                state.clear_input();
                self.recompute(state);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Autocomplete, CommandSpec, MAX_ROWS_VISIBLE};
    use crate::core::component::Section;
    use crate::core::input::{InputEvent, Key};
    use crate::state::State;
    use pretty_assertions::assert_eq;

    static COMMANDS: &[CommandSpec] = &[
        CommandSpec {
            name: "/chat",
            description: "Manage saved chats",
            followups: &[
                ("list", "List saved chats"),
                ("delete #", "Delete a chat by number"),
                ("restore #", "Restore a chat by number"),
            ],
        },
        CommandSpec {
            name: "/chat-x",
            description: "Experimental chat tools",
            followups: &[],
        },
        CommandSpec {
            name: "/quit",
            description: "Leave the session",
            followups: &[],
        },
    ];

    fn open_with(input: &str) -> (Autocomplete, State) {
        let mut state = State::new();
        state.insert_text(input);
        let mut ac = Autocomplete::new(COMMANDS);
        ac.recompute(&mut state);
        (ac, state)
    }

    #[test]
    fn bare_slash_lists_every_command() {
        let (ac, state) = open_with("/");
        assert!(state.autocomplete_open);
        assert_eq!(ac.rows.len(), 3);
    }

    #[test]
    fn substring_filter_keeps_declaration_order() {
        let (ac, _) = open_with("/ch");
        assert_eq!(ac.rows.len(), 2);
        assert_eq!(ac.rows[0].value, "/chat");
        assert_eq!(ac.rows[1].value, "/chat-x");
    }

    #[test]
    fn description_text_also_matches() {
        let (ac, _) = open_with("/session");
        assert_eq!(ac.rows.len(), 1);
        assert_eq!(ac.selected_value(), Some("/quit"));
    }

    #[test]
    fn exact_base_with_followups_switches_to_them() {
        let (ac, _) = open_with("/chat ");
        assert_eq!(ac.rows.len(), 3);
        assert_eq!(ac.selected_value(), Some("/chat list"));
        let (ac, _) = open_with("/chat de");
        assert_eq!(ac.selected_value(), Some("/chat delete #"));
    }

    #[test]
    fn exact_base_without_followups_falls_back_to_top_level() {
        let (ac, _) = open_with("/quit");
        assert_eq!(ac.rows.len(), 1);
        assert_eq!(ac.selected_value(), Some("/quit"));
    }

    #[test]
    fn multiline_input_stays_closed() {
        let (ac, state) = open_with("/chat\nx");
        assert!(!ac.is_open());
        assert!(!state.autocomplete_open);
    }

    #[test]
    fn accept_appends_a_space_except_for_numbered_followups() {
        let (mut ac, mut state) = open_with("/ch");
        ac.accept(&mut state);
        assert_eq!(state.input, "/chat ");
        assert_eq!(state.caret_index, 6);

        let (mut ac, mut state) = open_with("/chat de");
        ac.accept(&mut state);
        assert_eq!(state.input, "/chat delete #");
    }

    #[test]
    fn escape_clears_the_buffer_with_the_panel() {
        let (mut ac, mut state) = open_with("/ch");
        assert!(ac.handle(&mut state, &InputEvent::Key(Key::Escape)));
        assert!(!ac.is_open());
        assert_eq!(state.input, "");
        assert!(!state.autocomplete_open);
    }

    #[test]
    fn selection_moves_and_clamps() {
        let (mut ac, mut state) = open_with("/");
        ac.handle(&mut state, &InputEvent::Key(Key::Down));
        ac.handle(&mut state, &InputEvent::Key(Key::Down));
        ac.handle(&mut state, &InputEvent::Key(Key::Down));
        assert_eq!(ac.selected, 2);
        ac.handle(&mut state, &InputEvent::Key(Key::Up));
        assert_eq!(ac.selected, 1);
    }

    #[test]
    fn window_offset_follows_the_selection() {
        let (mut ac, mut state) = open_with("/chat ");
        assert!(ac.rows.len() <= MAX_ROWS_VISIBLE);
        ac.handle(&mut state, &InputEvent::Key(Key::Down));
        ac.handle(&mut state, &InputEvent::Key(Key::Down));
        assert_eq!(ac.offset, 0);
    }
}
