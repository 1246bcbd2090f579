//! Multi-step command flows.
//!
//! A command that needs more input raises `Signal::Followup` with a prompt.
//! The wizard keeps the command line accumulated so far plus the prompt
//! trail, folds each subsequently submitted line into the command, and hands
//! it back for re-dispatch until the command completes or fails.

use tick_tui::IslandWidget;

pub struct Wizard {
    title: String,
    command: String,
    steps: Vec<(String, bool)>,
}

impl Wizard {
    pub fn begin(command: &str, prompt: &str) -> Wizard {
        let title: String = command
            .split_whitespace()
            .take(2)
            .collect::<Vec<&str>>()
            .join(" ");
        Wizard {
            title,
            command: command.trim().to_string(),
            steps: vec![(prompt.to_string(), false)],
        }
    }

    /// Fold a submitted line into the command and mark the pending prompt
    /// answered. Returns the command line to re-dispatch.
    pub fn answer(&mut self, text: &str) -> String {
        if let Some(step) = self.steps.last_mut() {
            step.1 = true;
        }
        self.command = format!("{} {}", self.command, text.trim());
        self.command.clone()
    }

    /// The re-dispatched command asked for yet another input.
    pub fn push_prompt(&mut self, prompt: &str) {
        self.steps.push((prompt.to_string(), false));
    }

    pub fn island(&self) -> IslandWidget {
        IslandWidget::Steps {
            title: self.title.clone(),
            steps: self.steps.clone(),
        }
    }
}
