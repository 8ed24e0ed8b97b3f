use serde::{Deserialize, Serialize};

use crate::LlmError;

/// Message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One unit of message content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    /// Text span
    Text { text: String },
    /// Image reference, usually a data URL
    Image { url: String },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self::Image { url: url.into() }
    }
}

/// A single conversation turn
///
/// Block order is significant: the model reads content in sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl ChatMessage {
    /// Create a user message
    pub const fn user(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content,
        }
    }
}

/// Provider-agnostic chat-completion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

impl ChatRequest {
    /// Check the request locally before anything goes over the wire
    ///
    /// # Errors
    ///
    /// Returns `LlmError::InvalidRequest` for an empty model, no messages,
    /// or a message without content.
    pub fn validate(&self) -> Result<(), LlmError> {
        if self.model.trim().is_empty() {
            return Err(LlmError::InvalidRequest("model must be a non-empty string".to_owned()));
        }

        if self.messages.is_empty() {
            return Err(LlmError::InvalidRequest("messages must not be empty".to_owned()));
        }

        if let Some(index) = self.messages.iter().position(|m| m.content.is_empty()) {
            return Err(LlmError::InvalidRequest(format!(
                "message {index} has no content"
            )));
        }

        Ok(())
    }
}

/// Chat-completion response or streamed chunk
///
/// Parsed leniently: every field is optional on the wire so partial
/// stream chunks deserialize into the same shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub created: u64,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl ChatResponse {
    /// Whether the first choice finished with `stop`
    pub fn is_terminal(&self) -> bool {
        self.choices
            .first()
            .and_then(|c| c.finish_reason.as_deref())
            .is_some_and(|reason| reason == "stop")
    }

    /// Text of the first choice's message, if any
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
    }
}

/// One completion alternative
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    /// Full message on non-streaming responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<ChoiceMessage>,
    /// Incremental content on streamed chunks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<ChoiceMessage>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Token accounting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}
