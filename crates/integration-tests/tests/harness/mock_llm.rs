//! Mock vision model backend for integration tests
//!
//! Implements a minimal OpenAI-compatible chat completions endpoint that
//! returns canned responses and records every request body

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router, routing};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

const DEFAULT_RESPONSE: &str = "A single transparent pixel";

/// Mock upstream that returns predictable responses
pub struct MockLlm {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockLlmState>,
}

struct MockLlmState {
    completion_count: AtomicU32,
    /// Number of requests to fail before succeeding (0 = never fail)
    fail_count: AtomicU32,
    fail_status: StatusCode,
    response_content: String,
    requests: Mutex<Vec<serde_json::Value>>,
}

impl MockLlm {
    /// Start the mock server, returning immediately
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_inner(0, StatusCode::INTERNAL_SERVER_ERROR, DEFAULT_RESPONSE).await
    }

    /// Start a mock server that fails the first `n` requests with `status`
    pub async fn start_failing(n: u32, status: StatusCode) -> anyhow::Result<Self> {
        Self::start_inner(n, status, DEFAULT_RESPONSE).await
    }

    /// Start a mock server with a custom response content
    pub async fn start_with_response(content: &str) -> anyhow::Result<Self> {
        Self::start_inner(0, StatusCode::INTERNAL_SERVER_ERROR, content).await
    }

    async fn start_inner(fail_count: u32, fail_status: StatusCode, content: &str) -> anyhow::Result<Self> {
        let state = Arc::new(MockLlmState {
            completion_count: AtomicU32::new(0),
            fail_count: AtomicU32::new(fail_count),
            fail_status,
            response_content: content.to_owned(),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/chat/completions", routing::post(handle_chat_completions))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL including `/v1`; the client appends `/chat/completions`
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Number of completion requests received, failed ones included
    pub fn completion_count(&self) -> u32 {
        self.state.completion_count.load(Ordering::Relaxed)
    }

    /// Request bodies in arrival order
    pub fn requests(&self) -> Vec<serde_json::Value> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Content parts of the single user message in the most recent request
    pub fn last_content(&self) -> Vec<serde_json::Value> {
        self.requests()
            .last()
            .and_then(|body| body["messages"][0]["content"].as_array().cloned())
            .unwrap_or_default()
    }
}

impl Drop for MockLlm {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

// -- Wire types matching OpenAI format --

#[derive(Debug, Serialize)]
struct ChatCompletionResponse {
    id: String,
    object: String,
    created: u64,
    model: String,
    choices: Vec<Choice>,
    usage: Usage,
}

#[derive(Debug, Serialize)]
struct Choice {
    index: u32,
    message: ResponseMessage,
    finish_reason: String,
}

#[derive(Debug, Serialize)]
struct ResponseMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Serialize)]
struct StreamChunk {
    id: String,
    object: String,
    created: u64,
    model: String,
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Serialize)]
struct StreamChoice {
    index: u32,
    delta: StreamDelta,
    #[serde(skip_serializing_if = "Option::is_none")]
    finish_reason: Option<String>,
}

#[derive(Debug, Serialize)]
struct StreamDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

// -- Handlers --

async fn handle_chat_completions(
    State(state): State<Arc<MockLlmState>>,
    Json(req): Json<serde_json::Value>,
) -> impl IntoResponse {
    state.completion_count.fetch_add(1, Ordering::Relaxed);
    state.requests.lock().unwrap().push(req.clone());

    // If fail_count > 0, decrement and fail
    let remaining = state.fail_count.load(Ordering::Relaxed);
    if remaining > 0 {
        state.fail_count.fetch_sub(1, Ordering::Relaxed);
        return (
            state.fail_status,
            Json(serde_json::json!({
                "error": {
                    "message": "mock server intentional failure",
                    "type": "server_error"
                }
            })),
        )
            .into_response();
    }

    let model = req["model"].as_str().unwrap_or_default().to_owned();

    if req["stream"].as_bool().unwrap_or(false) {
        return build_streaming_response(&state.response_content, &model).into_response();
    }

    let response = ChatCompletionResponse {
        id: "chatcmpl-test-123".to_owned(),
        object: "chat.completion".to_owned(),
        created: 1_700_000_000,
        model,
        choices: vec![Choice {
            index: 0,
            message: ResponseMessage {
                role: "assistant".to_owned(),
                content: state.response_content.clone(),
            },
            finish_reason: "stop".to_owned(),
        }],
        usage: Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        },
    };

    Json(response).into_response()
}

/// Build an SSE body with one chunk per word, a stop chunk, and `[DONE]`
fn build_streaming_response(content: &str, model: &str) -> impl IntoResponse {
    let chunk = |content: Option<String>, finish_reason: Option<String>| StreamChunk {
        id: "chatcmpl-test-stream".to_owned(),
        object: "chat.completion.chunk".to_owned(),
        created: 1_700_000_000,
        model: model.to_owned(),
        choices: vec![StreamChoice {
            index: 0,
            delta: StreamDelta { content },
            finish_reason,
        }],
    };

    let mut body = String::new();

    for word in content.split_inclusive(' ') {
        let data = serde_json::to_string(&chunk(Some(word.to_owned()), None)).unwrap();
        body.push_str(&format!("data: {data}\n\n"));
    }

    // Malformed chunks are skipped by the client
    body.push_str("data: {\"choices\": [\n\n");

    let data = serde_json::to_string(&chunk(Some(String::new()), Some("stop".to_owned()))).unwrap();
    body.push_str(&format!("data: {data}\n\n"));
    body.push_str("data: [DONE]\n\n");

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/event-stream")],
        body,
    )
}
