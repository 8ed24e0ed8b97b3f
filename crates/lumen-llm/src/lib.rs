//! Client for OpenAI-compatible chat-completion endpoints
//!
//! Validates requests locally, retries transient failures with
//! exponential backoff, and accumulates server-sent-event streams.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod client;
pub mod error;
pub mod protocol;
pub mod retry;
mod stream;
pub mod types;

pub use client::UpstreamClient;
pub use error::LlmError;
pub use retry::RetryPolicy;
pub use stream::StreamAccumulator;
pub use types::{ChatMessage, ChatRequest, ChatResponse, Choice, ChoiceMessage, ContentBlock, Role, Usage};
