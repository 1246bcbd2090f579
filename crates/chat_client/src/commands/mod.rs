//! Slash-command dispatch.

mod builtin;
mod wizard;

pub use builtin::{
    ChatCommand, ClearCommand, CompactCommand, CopyCommand, ExitCommand, HelpCommand,
    ProjectCommand, ToolsCommand,
};
pub use wizard::Wizard;

use thiserror::Error;
use tick_tui::{CommandSpec, Interrupt, Signal, State};

use crate::history::{HistoryService, ProjectService};

/// Key hints shown above the input box.
pub const HELP_TEXT: &str = "Enter = newline/accept · Ctrl+D = submit · Arrows ←→↑↓ · \
    Ctrl+C quits · Ctrl+Y = delete line · Esc+Esc = clear · PgUp/PgDown = scroll content";

/// Autocomplete table, one entry per command.
pub static COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "/chat",
        description: "Manage saved chats",
        followups: &[
            ("list", "List saved chats"),
            ("clear", "Forget every chat"),
            ("delete #", "Delete a chat by number"),
            ("restore #", "Resume a chat with its latest exchange"),
            ("restore-full #", "Resume a chat with its full transcript"),
        ],
    },
    CommandSpec {
        name: "/clear",
        description: "Clear the scrollback",
        followups: &[],
    },
    CommandSpec {
        name: "/compact",
        description: "Compact the active chat's context",
        followups: &[],
    },
    CommandSpec {
        name: "/copy",
        description: "Copy the last response to the clipboard",
        followups: &[],
    },
    CommandSpec {
        name: "/exit",
        description: "Quit",
        followups: &[],
    },
    CommandSpec {
        name: "/help",
        description: "Show commands and keys",
        followups: &[],
    },
    CommandSpec {
        name: "/project",
        description: "Show project details",
        followups: &[
            ("list", "List known projects"),
            ("change", "Switch the active project"),
            ("create", "Register a new project"),
            ("edit", "Move a project's working directory"),
            ("delete", "Remove a project"),
        ],
    },
    CommandSpec {
        name: "/tools",
        description: "Show configured worker commands",
        followups: &[],
    },
];

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Signal(#[from] Signal),
    #[error(transparent)]
    Interrupt(#[from] Interrupt),
}

/// Everything a command handler may touch.
pub struct CommandCtx<'a> {
    pub state: &'a mut State,
    pub history: &'a mut dyn HistoryService,
    pub projects: &'a mut dyn ProjectService,
    pub active_chat: &'a mut Option<i64>,
    pub answer_command: &'a [String],
    pub consumer_command: &'a [String],
    /// Set by `/copy`; the caller forwards it to the terminal clipboard.
    pub clipboard_payload: Option<String>,
}

pub trait CommandHandler {
    fn supports(&self, base: &str) -> bool;
    fn execute(&self, input: &str, ctx: &mut CommandCtx) -> Result<(), DispatchError>;
}

pub struct Dispatcher {
    handlers: Vec<Box<dyn CommandHandler>>,
}

impl Dispatcher {
    pub fn new(handlers: Vec<Box<dyn CommandHandler>>) -> Dispatcher {
        Dispatcher { handlers }
    }

    pub fn with_default_commands() -> Dispatcher {
        Dispatcher::new(vec![
            Box::new(ChatCommand),
            Box::new(ClearCommand),
            Box::new(CompactCommand),
            Box::new(CopyCommand),
            Box::new(ExitCommand),
            Box::new(HelpCommand),
            Box::new(ProjectCommand),
            Box::new(ToolsCommand),
        ])
    }

    /// Route `input` (starting with `/`) to the first handler that claims
    /// its base token.
    pub fn dispatch(&self, input: &str, ctx: &mut CommandCtx) -> Result<(), DispatchError> {
        let base = input.split_whitespace().next().unwrap_or(input);
        for handler in &self.handlers {
            if handler.supports(base) {
                return handler.execute(input, ctx);
            }
        }
        Err(Signal::problem("No supported commands found").into())
    }
}
