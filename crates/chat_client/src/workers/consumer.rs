//! Long-lived consumer process kept alive for the whole session.
//!
//! The consumer drains server-side work (queued notifications, background
//! jobs) on its own; the client only supervises it. Crashes are respawned
//! and reported, never fatal.

use tick_tui::{Signal, State};

use crate::workers::child::ChildHandle;
use crate::workers::{PollOutcome, Worker};

pub struct ConsumerWorker {
    command: Vec<String>,
    child: Option<ChildHandle>,
}

impl ConsumerWorker {
    pub fn new(command: Vec<String>) -> ConsumerWorker {
        ConsumerWorker {
            command,
            child: None,
        }
    }

    fn spawn(&mut self) -> Result<(), Signal> {
        let child = ChildHandle::spawn(&self.command, None)
            .map_err(|err| Signal::problem(format!("spawn consumer: {err}")))?;
        self.child = Some(child);
        Ok(())
    }
}

impl Worker for ConsumerWorker {
    /// Idempotent: a consumer that is already running is left alone.
    fn start(&mut self, _request_id: &str) -> Result<(), Signal> {
        if self.is_running() {
            return Ok(());
        }
        self.spawn()
    }

    fn poll(&mut self, _request_id: &str, _state: &mut State) -> Result<PollOutcome, Signal> {
        let mut outcome = PollOutcome::default();
        let Some(child) = self.child.as_mut() else {
            return Ok(outcome);
        };

        // Keep the pipes drained so the consumer never blocks on a full
        // buffer; its output is not part of the UI.
        let _ = child.read_available_stdout();
        let _ = child.read_available_stderr();

        if !child.is_running() {
            self.spawn()?;
            outcome.problem = Some("Consumer restarted".to_string());
        }
        Ok(outcome)
    }

    fn stop(&mut self) -> Result<(), Signal> {
        if let Some(mut child) = self.child.take() {
            child
                .terminate()
                .map_err(|err| Signal::problem(format!("stop consumer: {err}")))?;
        }
        Ok(())
    }

    fn is_running(&mut self) -> bool {
        self.child
            .as_mut()
            .map(|child| child.is_running())
            .unwrap_or(false)
    }
}
