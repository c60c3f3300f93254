use serde::{Deserialize, Serialize};

use crate::assist::prompt::describe;
use crate::http::client::Transport;
use crate::http::error::TransportError;
use crate::http::request::Request;

pub const CHAT_ENDPOINT: &str = "/assistant/chat";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: &'a [ChatMessage],
    path: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    reply: Option<String>,
}

/// Chat panel: append-only transcript, sent in full on every turn.
///
/// Failure apologies are assistant turns like any other reply, so the next
/// request still alternates user and assistant entries.
#[derive(Debug, Clone, Default)]
pub struct ChatPanel {
    transcript: Vec<ChatMessage>,
    last_turn_failed: bool,
}

impl ChatPanel {
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Whether the most recent turn ended in an apology.
    pub fn last_turn_failed(&self) -> bool {
        self.last_turn_failed
    }

    fn push(&mut self, role: Role, content: &str) {
        self.transcript.push(ChatMessage {
            role,
            content: content.to_string(),
        });
    }

    /// One turn. Blank input is ignored. Returns the line appended for the
    /// assistant, if any.
    pub fn send(&mut self, text: &str, path: &str, transport: &dyn Transport) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        self.push(Role::User, text);

        let line = match self.exchange(path, transport) {
            Ok(reply) => {
                self.last_turn_failed = false;
                reply
            }
            Err(e) => {
                log::debug!("chat turn failed: {}", e);
                self.last_turn_failed = true;
                format!("Could not reach the assistant: {}", describe(&e))
            }
        };
        self.push(Role::Assistant, &line);
        Some(line)
    }

    fn exchange(&self, path: &str, transport: &dyn Transport) -> Result<String, TransportError> {
        let request = Request::json(
            CHAT_ENDPOINT,
            &ChatRequest {
                messages: &self.transcript,
                path,
            },
        )?;
        let value = transport.send(&request, None)?;

        Ok(serde_json::from_value::<ChatResponse>(value)
            .ok()
            .and_then(|r| r.reply)
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| "(no reply)".to_string()))
    }
}
