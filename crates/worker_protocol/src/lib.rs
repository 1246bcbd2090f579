//! NDJSON wire contract between the chat client and its worker processes.
//!
//! This crate intentionally defines only the message types and the line
//! buffer that frames them. Transport (pipes, spawning, supervision) lives
//! with the host; workers only need these shapes and `serde_json`.
//!
//! Framing: one JSON object per `\n`-terminated line. A partial line stays
//! buffered until its newline arrives. Empty lines and lines that fail to
//! parse are dropped; a worker that emits garbage loses that line, nothing
//! else.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Token accounting attached to a finished turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Messages the host writes to a worker's stdin, one per line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum HostMessage {
    StartQuestion {
        request_id: String,
        question: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        chat_id: Option<i64>,
    },
}

/// Messages a worker writes to its stdout, one per line.
///
/// `Done` and `Error` are terminal: nothing after them is read for that
/// request and the host detaches the worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum WorkerMessage {
    Ack {
        request_id: String,
    },
    Progress {
        request_id: String,
        phase: String,
    },
    StreamDelta {
        request_id: String,
        delta: String,
    },
    Citations {
        request_id: String,
        items: Vec<Value>,
    },
    Done {
        request_id: String,
        finish_reason: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        usage: Option<Usage>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool: Option<Value>,
    },
    Error {
        request_id: String,
        code: String,
        message: String,
    },
}

impl WorkerMessage {
    pub fn request_id(&self) -> &str {
        match self {
            WorkerMessage::Ack { request_id }
            | WorkerMessage::Progress { request_id, .. }
            | WorkerMessage::StreamDelta { request_id, .. }
            | WorkerMessage::Citations { request_id, .. }
            | WorkerMessage::Done { request_id, .. }
            | WorkerMessage::Error { request_id, .. } => request_id,
        }
    }

    /// True for the messages that end a request.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkerMessage::Done { .. } | WorkerMessage::Error { .. }
        )
    }
}

/// Accumulates raw stdout bytes and yields complete parsed messages.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: String,
}

impl LineBuffer {
    pub fn new() -> LineBuffer {
        LineBuffer::default()
    }

    pub fn push(&mut self, chunk: &str) {
        self.buf.push_str(chunk);
    }

    /// Bytes received since the last complete line.
    pub fn pending(&self) -> &str {
        &self.buf
    }

    /// Parse and drain every complete line currently buffered.
    pub fn drain_messages(&mut self) -> Vec<WorkerMessage> {
        let mut out = Vec::new();
        while let Some(newline) = self.buf.find('\n') {
            let line: String = self.buf.drain(..=newline).collect();
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Ok(message) = serde_json::from_str::<WorkerMessage>(line) {
                out.push(message);
            }
        }
        out
    }
}
