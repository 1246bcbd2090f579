//! Terminal chat client over the fixed-tick runtime.
//!
//! Questions are answered by a per-request worker subprocess speaking
//! NDJSON; a long-lived consumer subprocess is supervised alongside it.
//! Slash commands, history and project lookup round out the session.

pub mod agent;
pub mod app;
pub mod commands;
pub mod config;
pub mod history;
pub mod providers;
pub mod workers;

pub use agent::Agent;
pub use app::Application;
pub use commands::{CommandCtx, CommandHandler, DispatchError, Dispatcher};
pub use config::AppConfig;
pub use history::{AssistantTurn, HistoryService, InMemoryHistory, InMemoryProjects, ProjectService};
pub use providers::{ConsumerPollTimerProvider, UiTimerProvider, WorkerPollTimerProvider};
pub use workers::{ConsumerWorker, PollOutcome, QuestionWorker, Worker};
