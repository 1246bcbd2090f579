//! Chat history and project lookup behind trait seams.
//!
//! The UI talks to `HistoryService` and `ProjectService` so command handlers
//! can be exercised against the in-memory implementations in tests and
//! swapped for persistent backends without touching the tick loop.

use tick_tui::Mode;

/// Rough token estimate for text without provider usage data.
pub const CHARS_PER_TOKEN: u64 = 4;

pub fn estimate_tokens(text: &str) -> u64 {
    (text.chars().count() as u64).div_ceil(CHARS_PER_TOKEN)
}

/// Completed assistant turn forwarded from a finished question worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantTurn {
    pub request_id: String,
    pub chat_id: Option<i64>,
    pub response: String,
    pub mode: Mode,
    pub finish_reason: String,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSummary {
    pub id: i64,
    pub title: String,
    pub turns: usize,
    pub total_tokens: u64,
}

pub trait HistoryService {
    fn create_chat(&mut self, title: &str) -> i64;
    fn record_question(&mut self, chat_id: i64, question: &str);
    fn record_turn(&mut self, turn: AssistantTurn);
    fn list_chats(&self) -> Vec<ChatSummary>;
    fn delete_chat(&mut self, chat_id: i64) -> bool;
    /// Conversation text for a chat. `full` includes every exchange;
    /// otherwise only the most recent one.
    fn transcript(&self, chat_id: i64, full: bool) -> Option<String>;
    /// Drop all exchanges from a chat but keep the chat itself.
    fn compact_chat(&mut self, chat_id: i64) -> u64;
    fn clear(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    pub name: String,
    pub workdir: String,
}

pub trait ProjectService {
    fn current(&self) -> ProjectInfo;
    fn list(&self) -> Vec<ProjectInfo>;
    /// Make `name` the current project. False when unknown.
    fn select(&mut self, name: &str) -> bool;
    /// Register a new project. False when the name is already taken.
    fn create(&mut self, name: &str, workdir: &str) -> bool;
    /// Point an existing project at a new working directory.
    fn update(&mut self, name: &str, workdir: &str) -> bool;
    /// Remove a project. False when unknown or currently selected.
    fn delete(&mut self, name: &str) -> bool;
}

#[derive(Debug, Clone)]
struct Exchange {
    question: String,
    answer: String,
    tokens: u64,
}

#[derive(Debug, Clone)]
struct Chat {
    id: i64,
    title: String,
    exchanges: Vec<Exchange>,
}

/// Process-lifetime history store.
#[derive(Debug, Default)]
pub struct InMemoryHistory {
    chats: Vec<Chat>,
    next_id: i64,
}

impl InMemoryHistory {
    pub fn new() -> InMemoryHistory {
        InMemoryHistory {
            chats: Vec::new(),
            next_id: 1,
        }
    }

    fn chat_mut(&mut self, chat_id: i64) -> Option<&mut Chat> {
        self.chats.iter_mut().find(|chat| chat.id == chat_id)
    }

    fn chat(&self, chat_id: i64) -> Option<&Chat> {
        self.chats.iter().find(|chat| chat.id == chat_id)
    }
}

impl HistoryService for InMemoryHistory {
    fn create_chat(&mut self, title: &str) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        self.chats.push(Chat {
            id,
            title: title.to_string(),
            exchanges: Vec::new(),
        });
        id
    }

    fn record_question(&mut self, chat_id: i64, question: &str) {
        let tokens = estimate_tokens(question);
        if let Some(chat) = self.chat_mut(chat_id) {
            chat.exchanges.push(Exchange {
                question: question.to_string(),
                answer: String::new(),
                tokens,
            });
        }
    }

    fn record_turn(&mut self, turn: AssistantTurn) {
        let Some(chat_id) = turn.chat_id else {
            return;
        };
        let fallback = estimate_tokens(&turn.response);
        if let Some(chat) = self.chat_mut(chat_id) {
            if let Some(exchange) = chat.exchanges.last_mut() {
                if exchange.answer.is_empty() {
                    exchange.answer = turn.response;
                    exchange.tokens += if turn.total_tokens > 0 {
                        turn.total_tokens
                    } else {
                        fallback
                    };
                    return;
                }
            }
            chat.exchanges.push(Exchange {
                question: String::new(),
                answer: turn.response,
                tokens: if turn.total_tokens > 0 {
                    turn.total_tokens
                } else {
                    fallback
                },
            });
        }
    }

    fn list_chats(&self) -> Vec<ChatSummary> {
        self.chats
            .iter()
            .map(|chat| ChatSummary {
                id: chat.id,
                title: chat.title.clone(),
                turns: chat.exchanges.len(),
                total_tokens: chat.exchanges.iter().map(|exchange| exchange.tokens).sum(),
            })
            .collect()
    }

    fn delete_chat(&mut self, chat_id: i64) -> bool {
        let before = self.chats.len();
        self.chats.retain(|chat| chat.id != chat_id);
        self.chats.len() != before
    }

    fn transcript(&self, chat_id: i64, full: bool) -> Option<String> {
        let chat = self.chat(chat_id)?;
        let exchanges: Vec<&Exchange> = if full {
            chat.exchanges.iter().collect()
        } else {
            chat.exchanges.iter().rev().take(1).collect()
        };
        let mut out = String::new();
        for exchange in exchanges {
            if !exchange.question.is_empty() {
                out.push_str(&format!("You: {}\n", exchange.question));
            }
            if !exchange.answer.is_empty() {
                out.push_str(&format!("Assistant: {}\n", exchange.answer));
            }
        }
        Some(out)
    }

    fn compact_chat(&mut self, chat_id: i64) -> u64 {
        let Some(chat) = self.chat_mut(chat_id) else {
            return 0;
        };
        let freed: u64 = chat.exchanges.iter().map(|exchange| exchange.tokens).sum();
        chat.exchanges.clear();
        freed
    }

    fn clear(&mut self) {
        self.chats.clear();
    }
}

/// Process-lifetime project registry, seeded with the project from the
/// environment as the current one.
#[derive(Debug, Clone)]
pub struct InMemoryProjects {
    projects: Vec<ProjectInfo>,
    current: usize,
}

impl InMemoryProjects {
    pub fn new(name: &str, workdir: &str) -> InMemoryProjects {
        InMemoryProjects {
            projects: vec![ProjectInfo {
                name: name.to_string(),
                workdir: workdir.to_string(),
            }],
            current: 0,
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.projects.iter().position(|project| project.name == name)
    }
}

impl ProjectService for InMemoryProjects {
    fn current(&self) -> ProjectInfo {
        self.projects[self.current].clone()
    }

    fn list(&self) -> Vec<ProjectInfo> {
        self.projects.clone()
    }

    fn select(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(index) => {
                self.current = index;
                true
            }
            None => false,
        }
    }

    fn create(&mut self, name: &str, workdir: &str) -> bool {
        if name.is_empty() || self.position(name).is_some() {
            return false;
        }
        self.projects.push(ProjectInfo {
            name: name.to_string(),
            workdir: workdir.to_string(),
        });
        true
    }

    fn update(&mut self, name: &str, workdir: &str) -> bool {
        match self.position(name) {
            Some(index) => {
                self.projects[index].workdir = workdir.to_string();
                true
            }
            None => false,
        }
    }

    fn delete(&mut self, name: &str) -> bool {
        let Some(index) = self.position(name) else {
            return false;
        };
        if index == self.current {
            return false;
        }
        self.projects.remove(index);
        if index < self.current {
            self.current -= 1;
        }
        true
    }
}
