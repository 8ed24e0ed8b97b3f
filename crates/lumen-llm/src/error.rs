use http::StatusCode;
use thiserror::Error;

/// Errors that can occur while talking to the upstream endpoint
#[derive(Debug, Error)]
pub enum LlmError {
    /// Request failed local validation and was never sent
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Upstream call failed, either without a response or with an error status
    #[error("upstream error: {message}")]
    Upstream {
        /// Response status, or `None` when no response arrived
        status: Option<StatusCode>,
        /// Readable description of the failure
        message: String,
    },

    /// Event stream broke off after a successful connection
    #[error("streaming error: {0}")]
    Streaming(String),

    /// HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl LlmError {
    /// Whether another attempt may succeed
    ///
    /// Transport failures (no response), 5xx responses, and 429 are
    /// retryable; every other status is final.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Upstream { status: None, .. } => true,
            Self::Upstream {
                status: Some(status), ..
            } => status.as_u16() >= 500 || *status == StatusCode::TOO_MANY_REQUESTS,
            Self::InvalidRequest(_) | Self::Streaming(_) | Self::Client(_) => false,
        }
    }

    /// Status code of the failed response, if one arrived
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Upstream { status, .. } => *status,
            _ => None,
        }
    }
}

/// Reduce an upstream error body to a readable message
///
/// Prefers a structured `error.message`, then the raw body, then a
/// generic fallback.
pub(crate) fn upstream_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let structured = value
            .pointer("/error/message")
            .or_else(|| value.get("error"))
            .or_else(|| value.get("message"))
            .and_then(serde_json::Value::as_str)
            .filter(|message| !message.is_empty());

        if let Some(message) = structured {
            return message.to_owned();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Unknown error".to_owned()
    } else {
        trimmed.to_owned()
    }
}
