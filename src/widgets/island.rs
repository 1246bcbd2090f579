//! The island: a transient strip rendered directly above the input box.
//!
//! Workers park progress and summaries here; errors land here too. Only one
//! island exists at a time and replacing it is how workers report motion.

use crate::core::component::Section;
use crate::core::input::InputEvent;
use crate::core::text::{pad_to_width, soft_wrap};
use crate::render::screen::{dim, red, yellow};
use crate::state::State;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IslandWidget {
    /// A worker phase, replaced as phases advance.
    Progress { label: String },
    /// A recoverable error; dismissed by the next keypress.
    Problem { message: String },
    /// Terminal result of a finished turn.
    Summary { label: String, detail: String },
    /// Ordered checklist, one row per step.
    Steps { title: String, steps: Vec<(String, bool)> },
    /// Two-column listing, label then value.
    Table { title: String, rows: Vec<(String, String)> },
}

impl IslandWidget {
    pub fn progress(label: &str) -> IslandWidget {
        IslandWidget::Progress {
            label: label.to_string(),
        }
    }

    pub fn problem(message: &str) -> IslandWidget {
        IslandWidget::Problem {
            message: message.to_string(),
        }
    }

    pub fn summary(label: &str, detail: &str) -> IslandWidget {
        IslandWidget::Summary {
            label: label.to_string(),
            detail: detail.to_string(),
        }
    }

    pub fn is_problem(&self) -> bool {
        matches!(self, IslandWidget::Problem { .. })
    }

    pub fn build_lines(&self, width: usize) -> Vec<String> {
        let inner = width.saturating_sub(2).max(1);
        match self {
            IslandWidget::Progress { label } => {
                vec![yellow(&pad_to_width(&format!("◐ {label}"), inner))]
            }
            IslandWidget::Problem { message } => {
                // Problems get full box chrome so they read as an overlay,
                // not another status row.
                let boxed = width.saturating_sub(4).max(1);
                let mut out = vec![red(&format!("╭{}╮", "─".repeat(boxed + 2)))];
                for line in soft_wrap(&format!("✗ {message}"), boxed) {
                    out.push(format!(
                        "{} {} {}",
                        red("│"),
                        red(&pad_to_width(&line, boxed)),
                        red("│")
                    ));
                }
                out.push(red(&format!("╰{}╯", "─".repeat(boxed + 2))));
                out
            }
            IslandWidget::Summary { label, detail } => {
                vec![format!("{label} {}", dim(detail))]
            }
            IslandWidget::Steps { title, steps } => {
                let mut out = vec![dim(title)];
                for (step, done) in steps {
                    let mark = if *done { "✓" } else { "•" };
                    out.push(format!("  {mark} {step}"));
                }
                out
            }
            IslandWidget::Table { title, rows } => {
                let label_width = rows
                    .iter()
                    .map(|(label, _)| label.chars().count())
                    .max()
                    .unwrap_or(0);
                let mut out = vec![dim(title)];
                for (label, value) in rows {
                    out.push(format!("  {} {value}", pad_to_width(label, label_width)));
                }
                out
            }
        }
    }
}

/// Section wrapper that renders whatever island the state holds.
#[derive(Default)]
pub struct IslandHost;

impl Section for IslandHost {
    fn build(&mut self, state: &mut State, width: usize) -> Vec<String> {
        match &state.island {
            Some(island) => island.build_lines(width),
            None => Vec::new(),
        }
    }

    fn handle(&mut self, _state: &mut State, _event: &InputEvent) -> bool {
        false
    }
}
