use lumen_config::UpstreamConfig;
use reqwest::{Client, Response, header};
use secrecy::{ExposeSecret, SecretString};

use crate::{
    ChatRequest, ChatResponse, LlmError, RetryPolicy, error::upstream_message, protocol::OpenAiRequest,
    stream::read_event_stream,
};

/// Retrying client for an OpenAI-compatible `/chat/completions` endpoint
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: Client,
    completions_url: String,
    api_key: Option<SecretString>,
    retry: RetryPolicy,
}

impl UpstreamClient {
    /// Create a client from upstream configuration
    ///
    /// The configured timeout bounds every individual attempt.
    pub fn new(config: &UpstreamConfig) -> Result<Self, LlmError> {
        let http = Client::builder().timeout(config.timeout).build()?;

        let base = config.base_url.as_str().trim_end_matches('/');

        Ok(Self {
            http,
            completions_url: format!("{base}/chat/completions"),
            api_key: config.api_key.clone(),
            retry: RetryPolicy::new(config.max_retries),
        })
    }

    /// Replace the backoff schedule
    #[must_use]
    pub const fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn completions_url(&self) -> &str {
        &self.completions_url
    }

    /// Execute a chat completion
    ///
    /// For streaming requests `on_chunk` sees every chunk in arrival order
    /// and the terminal chunk is returned; otherwise the response body is
    /// returned as parsed and `on_chunk` is never called.
    pub async fn chat_completion<F>(&self, request: &ChatRequest, on_chunk: F) -> Result<ChatResponse, LlmError>
    where
        F: FnMut(&ChatResponse) + Send,
    {
        request.validate()?;

        let wire = OpenAiRequest::from(request);
        let response = self.send_with_retry(&wire).await?;

        if request.stream {
            return read_event_stream(response.bytes_stream(), on_chunk).await;
        }

        let status = response.status();
        response.json::<ChatResponse>().await.map_err(|e| LlmError::Upstream {
            status: Some(status),
            message: format!("failed to parse response: {e}"),
        })
    }

    /// Execute a chat completion without observing chunks
    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        self.chat_completion(request, |_| {}).await
    }

    async fn send_with_retry(&self, wire: &OpenAiRequest) -> Result<Response, LlmError> {
        self.retry.run(move |_| self.send_once(wire)).await
    }

    async fn send_once(&self, wire: &OpenAiRequest) -> Result<Response, LlmError> {
        let mut builder = self.http.post(&self.completions_url).json(wire);

        if wire.stream {
            builder = builder.header(header::ACCEPT, "text/event-stream");
        }
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder.send().await.map_err(|e| LlmError::Upstream {
            status: None,
            message: e.to_string(),
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(status = %status, error = %e, "failed to read upstream error body");
                String::new()
            }
        };
        tracing::debug!(status = %status, body = %body, "upstream returned error");

        Err(LlmError::Upstream {
            status: Some(status),
            message: upstream_message(&body),
        })
    }
}
