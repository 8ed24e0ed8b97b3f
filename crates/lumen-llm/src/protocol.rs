//! `OpenAI` chat completion API wire format types

use serde::{Deserialize, Serialize};

use crate::types::{ChatMessage, ChatRequest, ContentBlock, Role};

/// `OpenAI` chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiRequest {
    /// Model identifier
    pub model: String,
    /// Conversation messages
    pub messages: Vec<OpenAiMessage>,
    /// Whether to stream the response
    pub stream: bool,
}

/// `OpenAI` message within a request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiMessage {
    /// Message role
    pub role: Role,
    /// Ordered content parts
    pub content: Vec<OpenAiContentPart>,
}

/// Content part within a multimodal message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OpenAiContentPart {
    /// Text part
    Text { text: String },
    /// Image part
    ImageUrl { image_url: OpenAiImageUrl },
}

/// Image reference within a content part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenAiImageUrl {
    pub url: String,
}

impl From<&ContentBlock> for OpenAiContentPart {
    fn from(block: &ContentBlock) -> Self {
        match block {
            ContentBlock::Text { text } => Self::Text { text: text.clone() },
            ContentBlock::Image { url } => Self::ImageUrl {
                image_url: OpenAiImageUrl { url: url.clone() },
            },
        }
    }
}

impl From<&ChatMessage> for OpenAiMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role,
            content: message.content.iter().map(Into::into).collect(),
        }
    }
}

impl From<&ChatRequest> for OpenAiRequest {
    fn from(request: &ChatRequest) -> Self {
        Self {
            model: request.model.clone(),
            messages: request.messages.iter().map(Into::into).collect(),
            stream: request.stream,
        }
    }
}
