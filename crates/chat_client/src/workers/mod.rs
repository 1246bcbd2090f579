//! Subprocess workers and their supervision contract.

pub mod child;
pub mod consumer;
pub mod question;

pub use child::ChildHandle;
pub use consumer::ConsumerWorker;
pub use question::QuestionWorker;

use tick_tui::{Signal, State};

use crate::history::AssistantTurn;

/// What one poll pass produced.
#[derive(Debug, Default)]
pub struct PollOutcome {
    /// The worker finished its request and can be dropped.
    pub detach: bool,
    /// A completed assistant turn to forward to history.
    pub completed: Option<AssistantTurn>,
    /// A user-facing problem that does not end the session.
    pub problem: Option<String>,
}

/// A supervised subprocess driven from the worker poll timer.
///
/// `poll` must never block: it drains whatever the pipes hold and returns.
/// An `Err` is fatal for the worker; the supervisor stops it and surfaces
/// the signal's message.
pub trait Worker {
    fn start(&mut self, request_id: &str) -> Result<(), Signal>;
    fn poll(&mut self, request_id: &str, state: &mut State) -> Result<PollOutcome, Signal>;
    fn stop(&mut self) -> Result<(), Signal>;
    fn is_running(&mut self) -> bool;
}
