//! Per-question worker: one subprocess streaming one answer.
//!
//! The worker receives a `StartQuestion` line on stdin and streams NDJSON on
//! stdout. Deltas accumulate into a single response card that is replaced in
//! place, so the card grows under the user's eyes without duplicating
//! history. `Done` and `Error` detach the worker; stderr output is fatal.

use serde_json::to_string as to_json;
use tick_tui::{ContentItem, IslandWidget, Mode, Signal, State};
use worker_protocol::{HostMessage, LineBuffer, WorkerMessage};

use crate::history::AssistantTurn;
use crate::workers::child::ChildHandle;
use crate::workers::{PollOutcome, Worker};

pub struct QuestionWorker {
    command: Vec<String>,
    question: String,
    chat_id: Option<i64>,
    mode: Mode,
    child: Option<ChildHandle>,
    lines: LineBuffer,
    response: String,
    card_index: Option<usize>,
    saw_terminal: bool,
    restarted: bool,
}

impl QuestionWorker {
    pub fn new(
        command: Vec<String>,
        question: &str,
        chat_id: Option<i64>,
        mode: Mode,
    ) -> QuestionWorker {
        QuestionWorker {
            command,
            question: question.to_string(),
            chat_id,
            mode,
            child: None,
            lines: LineBuffer::new(),
            response: String::new(),
            card_index: None,
            saw_terminal: false,
            restarted: false,
        }
    }

    fn apply_message(
        &mut self,
        message: WorkerMessage,
        state: &mut State,
        outcome: &mut PollOutcome,
    ) {
        match message {
            WorkerMessage::Ack { .. } => {}
            WorkerMessage::Progress { phase, .. } => {
                state.set_island(IslandWidget::progress(&phase));
            }
            WorkerMessage::StreamDelta { delta, .. } => {
                self.response.push_str(&delta);
                let card = ContentItem::response_card(&self.response);
                self.card_index = Some(state.push_content_item(card, self.card_index));
            }
            WorkerMessage::Citations { .. } => {}
            WorkerMessage::Done {
                request_id,
                finish_reason,
                usage,
                ..
            } => {
                self.saw_terminal = true;
                outcome.detach = true;
                let usage = usage.unwrap_or(worker_protocol::Usage {
                    prompt_tokens: 0,
                    completion_tokens: 0,
                    total_tokens: 0,
                });
                state.set_island(IslandWidget::summary(
                    "Done",
                    &format!("{finish_reason} · {} tokens", usage.total_tokens),
                ));
                outcome.completed = Some(AssistantTurn {
                    request_id,
                    chat_id: self.chat_id,
                    response: std::mem::take(&mut self.response),
                    mode: self.mode,
                    finish_reason,
                    prompt_tokens: usage.prompt_tokens,
                    completion_tokens: usage.completion_tokens,
                    total_tokens: usage.total_tokens,
                });
            }
            WorkerMessage::Error { code, message, .. } => {
                self.saw_terminal = true;
                outcome.detach = true;
                outcome.problem = Some(format!("{code}: {message}"));
            }
        }
    }

    /// A worker that died before producing anything gets exactly one fresh
    /// start; anything else is a hard failure.
    fn handle_exit(&mut self, request_id: &str) -> Result<PollOutcome, Signal> {
        let clean_slate =
            self.response.is_empty() && self.lines.pending().is_empty() && !self.restarted;
        if clean_slate {
            self.restarted = true;
            self.start(request_id)?;
            return Ok(PollOutcome {
                problem: Some("Question worker restarted".to_string()),
                ..PollOutcome::default()
            });
        }
        Err(Signal::problem("Question worker exited unexpectedly"))
    }
}

impl Worker for QuestionWorker {
    fn start(&mut self, request_id: &str) -> Result<(), Signal> {
        let payload = to_json(&HostMessage::StartQuestion {
            request_id: request_id.to_string(),
            question: self.question.clone(),
            chat_id: self.chat_id,
        })
        .map_err(|err| Signal::problem(format!("encode StartQuestion: {err}")))?;

        let child = ChildHandle::spawn(&self.command, Some(&payload))
            .map_err(|err| Signal::problem(format!("spawn question worker: {err}")))?;
        self.child = Some(child);
        Ok(())
    }

    fn poll(&mut self, request_id: &str, state: &mut State) -> Result<PollOutcome, Signal> {
        let mut outcome = PollOutcome::default();
        let Some(child) = self.child.as_mut() else {
            outcome.detach = true;
            return Ok(outcome);
        };

        let noise = child
            .read_available_stderr()
            .map_err(|err| Signal::problem(format!("question worker stderr: {err}")))?;
        if !noise.trim().is_empty() {
            return Err(Signal::problem(format!(
                "Question worker failed: {}",
                noise.trim()
            )));
        }

        // Exit check first: a child that already exited has flushed all it
        // will ever write, so the read below cannot miss trailing output.
        let exited = !child.is_running();
        let chunk = child
            .read_available_stdout()
            .map_err(|err| Signal::problem(format!("question worker stdout: {err}")))?;

        self.lines.push(&chunk);
        for message in self.lines.drain_messages() {
            if message.request_id() != request_id {
                continue;
            }
            self.apply_message(message, state, &mut outcome);
            if self.saw_terminal {
                break;
            }
        }

        if self.saw_terminal {
            return Ok(outcome);
        }
        if exited {
            return self.handle_exit(request_id);
        }
        Ok(outcome)
    }

    /// Terminate a live child and detach. Stopping a running worker raises
    /// `Signal::Complete` so the caller can report the cut-short turn.
    fn stop(&mut self) -> Result<(), Signal> {
        if let Some(mut child) = self.child.take() {
            let was_running = child.is_running();
            child
                .terminate()
                .map_err(|err| Signal::problem(format!("stop question worker: {err}")))?;
            if was_running {
                return Err(Signal::complete("Question worker stopped"));
            }
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
