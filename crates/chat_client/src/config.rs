//! Process configuration from the environment.

use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Command line for the per-question worker, program first.
    pub answer_command: Vec<String>,
    /// Command line for the long-lived consumer, program first.
    pub consumer_command: Vec<String>,
    pub model: String,
    pub small_model: String,
    pub project_name: String,
    pub project_workdir: String,
}

fn command_from_env(key: &str, default: &str) -> Vec<String> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.split_whitespace().map(str::to_string).collect()
}

fn string_from_env(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => default.to_string(),
    }
}

impl AppConfig {
    pub fn from_env() -> AppConfig {
        let workdir = env::current_dir()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|_| ".".to_string());
        let default_name = workdir
            .rsplit('/')
            .next()
            .unwrap_or("project")
            .to_string();

        AppConfig {
            answer_command: command_from_env("CHAT_CLIENT_ANSWER_CMD", "chat-answer-worker"),
            consumer_command: command_from_env("CHAT_CLIENT_CONSUMER_CMD", "chat-consumer"),
            model: string_from_env("CHAT_CLIENT_MODEL", "gpt-large"),
            small_model: string_from_env("CHAT_CLIENT_SMALL_MODEL", "gpt-small"),
            project_name: string_from_env("CHAT_CLIENT_PROJECT", &default_name),
            project_workdir: workdir,
        }
    }
}
