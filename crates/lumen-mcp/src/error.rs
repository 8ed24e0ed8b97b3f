use lumen_image::ImageError;
use lumen_llm::LlmError;
use thiserror::Error;

/// Errors surfaced by a tool invocation
///
/// Never escapes to the transport; the tool server renders it into an
/// error result.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Arguments are missing or malformed
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An image reference could not be normalized
    #[error(transparent)]
    Image(#[from] ImageError),

    /// The upstream chat completion failed
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// The upstream answered without any text
    #[error("upstream returned an empty response")]
    EmptyResponse,
}
