//! Single-threaded fixed-tick TUI runtime for card-scrollback chat clients.
//!
//! Invariant: all state mutation happens inside `Scheduler::tick()` — the
//! runtime is fully cooperative and needs no locks.
//!
//! # Public API Overview
//! - Drive periodic work with [`Scheduler`], [`Timer`] and [`LoopRunner`].
//! - Compose the screen from [`Section`] widgets over one shared [`State`].
//! - Wrap and edit text with the helpers in [`core::text`].
//! - Talk to the terminal through [`Terminal`] and [`ProcessTerminal`].

pub mod config;
pub mod logging;

pub mod core;
pub mod platform;
pub mod render;
pub mod sched;
pub mod state;
pub mod widgets;

/// Scheduler primitives.
pub use crate::sched::{now_ms, LoopRunner, Scheduler, Timer, TimerProvider};

/// Signal taxonomy shared by commands, workers and the tick loop.
pub use crate::core::signal::{Interrupt, Signal};

/// Section (widget) behavior contract.
pub use crate::core::component::Section;

/// Keyboard input parsing.
pub use crate::core::input::{parse_input_events, InputEvent, Key};

/// Text wrapping and caret math.
pub use crate::core::text::{sanitize_paste, soft_wrap, wrap_text_and_locate_caret};

/// Shared render state and the card model.
pub use crate::state::{Mode, State, INPUT_MAX_VISIBLE_LINES};
pub use crate::widgets::content_item::{ContentItem, Style};
pub use crate::widgets::island::{IslandHost, IslandWidget};

/// Screen sections.
pub use crate::widgets::autocomplete::{Autocomplete, CommandSpec, MAX_ROWS_VISIBLE};
pub use crate::widgets::help_line::HelpLine;
pub use crate::widgets::input_box::InputBox;
pub use crate::widgets::status_bar::StatusBar;
pub use crate::widgets::windowed_content::WindowedContent;

/// Frame serialization.
pub use crate::render::screen::{draw_frame, place_caret};

/// Terminal interfaces and the process-backed implementation.
pub use crate::platform::process_terminal::ProcessTerminal;
pub use crate::platform::terminal::{HeadlessTerminal, Terminal, TerminalGuard};
