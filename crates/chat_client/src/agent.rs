//! Worker supervision and history bookkeeping for the chat session.
//!
//! One question worker at most runs at a time; the consumer runs for the
//! whole session. All polling happens on scheduler timers, so everything
//! here takes `&mut` and never blocks.

use std::collections::HashMap;
use std::rc::Rc;

use tick_tui::logging::DebugLogger;
use tick_tui::{IslandWidget, Mode, Signal, State};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::history::{HistoryService, ProjectService};
use crate::workers::{ConsumerWorker, QuestionWorker, Worker};

pub struct Agent {
    answer_command: Vec<String>,
    consumer: ConsumerWorker,
    attachments: HashMap<String, Box<dyn Worker>>,
    pub history: Box<dyn HistoryService>,
    pub projects: Box<dyn ProjectService>,
    pub active_chat: Option<i64>,
    logger: Rc<DebugLogger>,
}

impl Agent {
    pub fn new(
        config: &AppConfig,
        history: Box<dyn HistoryService>,
        projects: Box<dyn ProjectService>,
        logger: Rc<DebugLogger>,
    ) -> Agent {
        Agent {
            answer_command: config.answer_command.clone(),
            consumer: ConsumerWorker::new(config.consumer_command.clone()),
            attachments: HashMap::new(),
            history,
            projects,
            active_chat: None,
            logger,
        }
    }

    pub fn has_active_question(&self) -> bool {
        !self.attachments.is_empty()
    }

    fn ensure_chat(&mut self, question: &str) -> i64 {
        if let Some(chat_id) = self.active_chat {
            return chat_id;
        }
        let title: String = question.chars().take(40).collect();
        let chat_id = self.history.create_chat(title.trim());
        self.active_chat = Some(chat_id);
        chat_id
    }

    /// Dispatch a question to a fresh worker. Returns the request id the
    /// worker will stamp on every message.
    pub fn ask(&mut self, question: &str, mode: Mode) -> Result<String, Signal> {
        if self.has_active_question() {
            return Err(Signal::problem(
                "Question handling process is already running.",
            ));
        }

        let chat_id = self.ensure_chat(question);
        self.history.record_question(chat_id, question);

        let request_id = Uuid::new_v4().to_string();
        let mut worker = Box::new(QuestionWorker::new(
            self.answer_command.clone(),
            question,
            Some(chat_id),
            mode,
        ));
        worker.start(&request_id)?;
        self.logger
            .log(&format!("question dispatched request_id={request_id}"));
        self.attach(&request_id, worker)?;
        Ok(request_id)
    }

    fn attach(&mut self, request_id: &str, mut worker: Box<dyn Worker>) -> Result<(), Signal> {
        if self.attachments.contains_key(request_id) {
            let _ = worker.stop();
            return Err(Signal::problem(
                "A worker is already attached under this request id.",
            ));
        }
        self.attachments.insert(request_id.to_string(), worker);
        Ok(())
    }

    /// Drain every attached question worker once.
    pub fn poll_workers(&mut self, state: &mut State) -> Result<(), Signal> {
        let mut finished = Vec::new();
        let mut failed = Vec::new();

        for (request_id, worker) in self.attachments.iter_mut() {
            match worker.poll(request_id, state) {
                Ok(outcome) => {
                    if let Some(turn) = outcome.completed {
                        self.logger.log(&format!(
                            "turn complete request_id={request_id} reason={}",
                            turn.finish_reason
                        ));
                        self.history.record_turn(turn);
                    }
                    if let Some(problem) = outcome.problem {
                        self.logger.log(&format!("worker problem: {problem}"));
                        state.set_island(IslandWidget::problem(&problem));
                    }
                    if outcome.detach {
                        finished.push(request_id.clone());
                    }
                }
                Err(signal) => {
                    self.logger
                        .log(&format!("worker failed request_id={request_id}: {signal}"));
                    failed.push((request_id.clone(), signal.message().to_string()));
                }
            }
        }

        for request_id in finished {
            self.attachments.remove(&request_id);
        }
        for (request_id, message) in failed {
            if let Some(mut worker) = self.attachments.remove(&request_id) {
                let _ = worker.stop();
            }
            state.set_island(IslandWidget::problem(&message));
        }
        Ok(())
    }

    pub fn start_consumer(&mut self) -> Result<(), Signal> {
        self.consumer.start("session")
    }

    pub fn poll_consumer(&mut self, state: &mut State) -> Result<(), Signal> {
        let outcome = self.consumer.poll("session", state)?;
        if let Some(problem) = outcome.problem {
            self.logger.log(&problem);
            state.set_island(IslandWidget::problem(&problem));
        }
        Ok(())
    }

    /// Stop everything; called once on the way out.
    pub fn shutdown(&mut self) {
        for (_, mut worker) in self.attachments.drain() {
            let _ = worker.stop();
        }
        let _ = self.consumer.stop();
        self.logger.log("agent shut down");
    }
}
