//! Two-channel error taxonomy for the tick loop.
//!
//! `Signal` is recoverable: it is raised by command execution and worker
//! polls, caught at the provider/dispatch boundary, and rendered as an
//! overlay. `Interrupt` is fatal: it propagates out of `Scheduler::tick()`
//! and terminates the outer driver loop.

use thiserror::Error;

/// Recoverable, typed flow-control signal.
///
/// A single catch site can branch on the kind without special-casing call
/// sites: `Problem` becomes a dismissible overlay, `Followup` advances a
/// multi-step command wizard, `Complete` acknowledges a finished command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Signal {
    #[error("{0}")]
    Problem(String),
    #[error("follow-up required: {0}")]
    Followup(String),
    #[error("{0}")]
    Complete(String),
}

impl Signal {
    pub fn problem(message: impl Into<String>) -> Self {
        Self::Problem(message.into())
    }

    pub fn followup(prompt: impl Into<String>) -> Self {
        Self::Followup(prompt.into())
    }

    pub fn complete(summary: impl Into<String>) -> Self {
        Self::Complete(summary.into())
    }

    /// Returns the human-readable payload regardless of kind.
    pub fn message(&self) -> &str {
        match self {
            Self::Problem(message) | Self::Followup(message) | Self::Complete(message) => message,
        }
    }

    pub fn is_problem(&self) -> bool {
        matches!(self, Self::Problem(_))
    }
}

/// Fatal interrupt that unwinds the driver loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Interrupt {
    #[error("interrupt key received, bye!")]
    UserQuit,
    #[error("/exit received, bye!")]
    ExitRequested,
}
