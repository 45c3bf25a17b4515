// Provider-agnostic request and response types

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// One stateless completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

impl CompletionRequest {
    /// The two-message turn every speaker receives: its standing initial
    /// prompt followed by this round's slot prompt.
    pub fn turn(
        model: impl Into<String>,
        initial_prompt: impl Into<String>,
        slot_prompt: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            model: model.into(),
            messages: vec![
                ChatMessage::user(initial_prompt),
                ChatMessage::user(slot_prompt),
            ],
            temperature,
        }
    }

    /// Content of the final message.
    pub fn slot_prompt(&self) -> &str {
        self.messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }
}
